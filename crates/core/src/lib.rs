//! RFP Forge Core
//!
//! Foundational data for the RFP Forge workspace: the interview step registry,
//! the RFP section taxonomy, completion scoring, and the shared error types.
//! This crate has no dependencies on application-level code (database, LLM
//! providers, CLI).
//!
//! ## Module Organization
//!
//! - `error` - Core error types (`CoreError`, `CoreResult`)
//! - `types` - Phases, question kinds, trust levels, answers and progress
//! - `registry` - The ordered step catalogue (`StepRegistry`, `StepDefinition`)
//! - `sections` - The fixed RFP section taxonomy and rendering groups
//! - `scoring` - Completion rate, completion level and gap priorities
//!
//! ## Design Principles
//!
//! 1. **Pure data and functions** - nothing in this crate performs I/O
//! 2. **Validated at first use** - the built-in registry is checked once and trusted afterwards
//! 3. **Unidirectional dependency** - this crate depends on nothing else in the workspace

pub mod error;
pub mod registry;
pub mod scoring;
pub mod sections;
pub mod types;

// ── Error Types ────────────────────────────────────────────────────────
pub use error::{CoreError, CoreResult};

// ── Registry ───────────────────────────────────────────────────────────
pub use registry::{PhaseSpan, StepDefinition, StepRegistry, ValidationRole, WILDCARD_SECTION};

// ── Scoring ────────────────────────────────────────────────────────────
pub use scoring::{
    completion_rate, gap_priorities, minimum_requirements_met, round_percent, CompletionLevel,
    Gap, GapPriority,
};

// ── Sections ───────────────────────────────────────────────────────────
pub use sections::{SectionGroup, SectionInfo, SECTIONS, SECTION_GROUPS};

// ── Domain Types ───────────────────────────────────────────────────────
pub use types::{
    Answer, Phase, ProgressStatus, ProjectProgress, QuestionKind, RecordedAnswer, TrustLevel,
};
