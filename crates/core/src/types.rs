//! Domain Types
//!
//! Phases, question kinds, trust levels, answers and per-project progress.
//! Every enum here has a stable snake_case string form used for both JSON
//! and database storage.

use serde::{Deserialize, Serialize};

/// Interview phase. Phases are visited strictly in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Product definition
    Seed,
    /// Market validation
    Sprout,
    /// Business operations
    Tree,
    /// Wrap-up and confirmation (terminal)
    Final,
}

impl Phase {
    /// All phases in interview order
    pub const ALL: [Phase; 4] = [Phase::Seed, Phase::Sprout, Phase::Tree, Phase::Final];

    /// Display label shown to the interviewee
    pub fn label(&self) -> &'static str {
        match self {
            Self::Seed => "씨앗",
            Self::Sprout => "새싹",
            Self::Tree => "나무",
            Self::Final => "마무리",
        }
    }

    /// Question asked at the phase checkpoint, if the phase has one
    pub fn transition_prompt(&self) -> Option<&'static str> {
        match self {
            Self::Seed => Some("이 제품을 실제 시장에서 검증하길 원하시나요?"),
            Self::Sprout => Some("이 서비스를 정식으로 출시하실 건가요?"),
            Self::Tree | Self::Final => None,
        }
    }

    /// Get the string form for database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Seed => "seed",
            Self::Sprout => "sprout",
            Self::Tree => "tree",
            Self::Final => "final",
        }
    }

    /// Parse from the storage form
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "seed" => Some(Self::Seed),
            "sprout" => Some(Self::Sprout),
            "tree" => Some(Self::Tree),
            "final" => Some(Self::Final),
            _ => None,
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a step expects to be answered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    FreeText,
    SingleChoice,
    MultiChoice,
    /// Multi-select where each option carries an include/exclude status
    MultiChoiceWithStatus,
}

/// Confidence tag on a recorded answer or a document section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TrustLevel {
    /// User-provided and accepted
    Confirmed,
    /// Derived rather than asked directly
    Inferred,
    /// Rejected, awaiting retry
    Pending,
    /// Never answered
    #[default]
    Missing,
}

impl TrustLevel {
    /// Completion weight in halves: confirmed counts 1.0, inferred 0.5.
    pub fn weight_halves(&self) -> u64 {
        match self {
            Self::Confirmed => 2,
            Self::Inferred => 1,
            Self::Pending | Self::Missing => 0,
        }
    }

    /// Whether a step or section with this trust level counts as done
    pub fn is_filled(&self) -> bool {
        matches!(self, Self::Confirmed | Self::Inferred)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Confirmed => "confirmed",
            Self::Inferred => "inferred",
            Self::Pending => "pending",
            Self::Missing => "missing",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "confirmed" => Some(Self::Confirmed),
            "inferred" => Some(Self::Inferred),
            "pending" => Some(Self::Pending),
            "missing" => Some(Self::Missing),
            _ => None,
        }
    }
}

/// A raw answer: free text or a list of selected options.
///
/// Serialized untagged, so `"text"` and `["a", "b"]` are both valid JSON forms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    Text(String),
    Choices(Vec<String>),
}

impl Answer {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn choices<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Choices(items.into_iter().map(Into::into).collect())
    }

    /// The free-text body, if this is a text answer
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Choices(_) => None,
        }
    }

    /// Non-blank selected entries (a text answer counts as one entry)
    pub fn selected(&self) -> Vec<&str> {
        match self {
            Self::Text(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    Vec::new()
                } else {
                    vec![trimmed]
                }
            }
            Self::Choices(items) => items
                .iter()
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.selected().is_empty()
    }

    /// Render for previews and documents: text as-is, lists in serialized JSON form
    pub fn render(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Choices(items) => serde_json::to_string(items).unwrap_or_default(),
        }
    }

    /// Render for prompts and context blocks: lists joined with ", "
    pub fn to_plain(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Choices(items) => items.join(", "),
        }
    }
}

/// One answer slot per step per project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedAnswer {
    pub project_id: String,
    pub step_number: u32,
    /// `None` while the step is pending a retry
    pub raw_answer: Option<Answer>,
    pub trust_level: TrustLevel,
    pub attempt_count: u32,
}

impl RecordedAnswer {
    /// A rejected attempt awaiting retry
    pub fn pending(project_id: impl Into<String>, step_number: u32, attempt_count: u32) -> Self {
        Self {
            project_id: project_id.into(),
            step_number,
            raw_answer: None,
            trust_level: TrustLevel::Pending,
            attempt_count,
        }
    }

    /// An accepted answer
    pub fn confirmed(
        project_id: impl Into<String>,
        step_number: u32,
        answer: Answer,
        attempt_count: u32,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            step_number,
            raw_answer: Some(answer),
            trust_level: TrustLevel::Confirmed,
            attempt_count,
        }
    }
}

/// Overall interview status of a project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

impl ProgressStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "not_started" => Some(Self::NotStarted),
            "in_progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }
}

/// Where a project stands in the interview
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectProgress {
    pub current_phase: Phase,
    pub current_step: u32,
    pub status: ProgressStatus,
    /// Set after a phase checkpoint is accepted, cleared by the transition decision
    #[serde(default)]
    pub awaiting_transition: bool,
}

impl Default for ProjectProgress {
    fn default() -> Self {
        Self {
            current_phase: Phase::Seed,
            current_step: 1,
            status: ProgressStatus::NotStarted,
            awaiting_transition: false,
        }
    }
}
