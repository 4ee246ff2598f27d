//! RFP Document Synthesis
//!
//! - `mapping` - answer placement, previews, completion figures, fallback body
//! - `synthesizer` - provider-drafted documents with deterministic fallback
//! - `renderer` - Markdown export

pub mod mapping;
pub mod renderer;
pub mod synthesizer;

pub use mapping::{map_answers_to_sections, overview, preview, RfpOverview};
pub use renderer::render_markdown;
pub use synthesizer::{generate_rfp, latest_rfp, RfpSynthesizer};
