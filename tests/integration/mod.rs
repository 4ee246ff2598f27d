//! Integration Tests Module
//!
//! End-to-end coverage of the interview engine, RFP synthesis and SQLite
//! persistence through the public command surface. No network calls are
//! made; generation is driven by a scripted provider.

// Shared helpers
mod support;

// Full interview walks, checkpoints and rejections
mod interview_flow_test;

// Previews, generated and fallback documents, export
mod rfp_synthesis_test;

// File-backed SQLite persistence
mod storage_test;
