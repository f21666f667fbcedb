pub mod catalog;
pub mod commands;
pub mod config;
pub mod error;
pub mod keyboard;
pub mod media;
pub mod router;
pub mod runner;
pub mod schema;
pub mod state;

pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;
pub type HandlerResult = Result<(), HandlerError>;
