//! Data Models
//!
//! Contains the data structures shared by services, storage and commands.

pub mod project;
pub mod response;
pub mod rfp;
pub mod settings;

pub use project::*;
pub use response::*;
pub use rfp::*;
pub use settings::*;
