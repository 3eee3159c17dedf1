pub mod ketpub;
pub mod notification;
pub mod tenaga_pembantu;
pub mod user;
