//! Interview Orchestration
//!
//! The step/phase state machine and everything it leans on:
//!
//! - `cues` - keyword heuristics for the service definition
//! - `validator` - accept/reject decisions with follow-up questions
//! - `store` - persistence contract plus the in-memory implementation
//! - `state` - SQLite persistence
//! - `engine` - the state machine itself
//! - `questions` - per-step question phrasing

pub mod cues;
pub mod engine;
pub mod questions;
pub mod state;
pub mod store;
pub mod validator;

pub use engine::{InterviewEngine, InterviewProgress, PhaseCompletion, SubmissionOutcome};
pub use questions::{next_question, Question, QuestionOption};
pub use state::SqliteInterviewStore;
pub use store::{InterviewStore, MemoryInterviewStore, SubmissionCommit};
pub use validator::{AnswerValidator, Rejection, ValidationOutcome};
