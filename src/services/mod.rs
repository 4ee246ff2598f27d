//! Services
//!
//! Business logic services for the application.
//! Services handle the core functionality and are called by commands.

pub mod generation;
pub mod interview;
pub mod rfp;

pub use interview::{InterviewEngine, InterviewStore, MemoryInterviewStore, SqliteInterviewStore};
pub use rfp::RfpSynthesizer;
