// src/config/mod.rs
// DOCUMENTATION: Configuration module organization
// PURPOSE: Re-export configuration components

pub mod db;
pub mod env;
pub mod local;

pub use db::{connect_to_database, DbPool};
pub use env::{AppConfig, DbConfig};
pub use local::load_local_environment;
