//! Storage Layer
//!
//! Handles data persistence plumbing: the SQLite connection pool and the JSON config file.

pub mod config;
pub mod database;

pub use config::*;
pub use database::*;
