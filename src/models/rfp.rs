//! RFP Document Models
//!
//! Sections, previews and stored documents produced by the synthesizer.

use rfp_forge_core::{Answer, CompletionLevel, TrustLevel};
use serde::{Deserialize, Serialize};

/// Format version written into every stored document
pub const RFP_VERSION: &str = "1.0";

/// One answer placed into a section by the step mapping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappedSection {
    pub answer: Option<Answer>,
    pub trust_level: TrustLevel,
    pub source_step: u32,
}

/// A section of a synthesized RFP
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RfpSection {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, alias = "state")]
    pub trust_level: TrustLevel,
    #[serde(default)]
    pub source_step: Option<u32>,
}

/// Body of a synthesized RFP
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RfpContent {
    pub sections: Vec<RfpSection>,
    pub summary: String,
}

/// How a document's content was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationMode {
    /// Drafted by the text-generation provider
    Generated,
    /// Assembled deterministically from recorded answers
    Fallback,
}

impl GenerationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Generated => "generated",
            Self::Fallback => "fallback",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "generated" => Some(Self::Generated),
            "fallback" => Some(Self::Fallback),
            _ => None,
        }
    }
}

/// A stored RFP document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RfpDocument {
    pub id: String,
    pub project_id: String,
    pub version: String,
    pub content: RfpContent,
    pub completion_rate: u8,
    pub completion_level: CompletionLevel,
    pub minimum_requirements_met: bool,
    pub mode: GenerationMode,
    /// ISO 8601
    pub created_at: String,
}

/// Preview state of one section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreviewStatus {
    Complete,
    Partial,
    Missing,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewSection {
    pub id: String,
    pub name: String,
    pub status: PreviewStatus,
    pub preview: String,
}

/// Non-authoritative view of how the RFP is shaping up
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RfpPreview {
    pub sections: Vec<PreviewSection>,
    pub overall_progress: u8,
}
