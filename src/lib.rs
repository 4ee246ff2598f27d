//! RFP Forge
//!
//! Backend for a guided service-planning interview. It includes:
//! - A 20-step interview engine with answer validation and phase checkpoints
//! - RFP synthesis from the recorded answers, with a deterministic fallback
//! - Storage layer (SQLite, config file)
//! - Command handlers and the CLI surface

pub mod cli;
pub mod commands;
pub mod models;
pub mod services;
pub mod state;
pub mod storage;
pub mod utils;

pub use models::response::*;
pub use models::settings::{AppConfig, SettingsUpdate};
pub use state::AppState;
pub use utils::error::{AppError, AppResult};
