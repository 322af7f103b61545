pub mod types;
pub mod error;
pub mod config;
pub mod database;
