pub mod ketpub_controller;
pub mod tenaga_pembantu_controller;
