pub mod auth;
pub mod controllers;
pub mod db;
pub mod export;
pub mod models;
pub mod utils;
