//! Commands
//!
//! The operation surface of the application. Each command takes the shared
//! `AppState`, runs one service operation, and wraps the outcome in a
//! `CommandResponse` so callers get a uniform success/error shape.

pub mod health;
pub mod interview;
pub mod projects;
pub mod rfp;
pub mod settings;

pub use health::*;
pub use interview::*;
pub use projects::*;
pub use rfp::*;
pub use settings::*;
