//! Project Models
//!
//! An interview project: its name, where it stands in the interview, and the
//! completion rate captured the last time an RFP was generated.

use rfp_forge_core::ProjectProgress;
use serde::{Deserialize, Serialize};

/// Maximum project name length, in characters
pub const MAX_PROJECT_NAME_CHARS: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub progress: ProjectProgress,
    /// Snapshot taken at the last RFP generation; not authoritative in between
    pub completion_rate: u8,
    /// ISO 8601
    pub created_at: String,
    /// ISO 8601
    pub updated_at: String,
}

impl Project {
    /// Create a fresh project at the start of the interview
    pub fn new(id: impl Into<String>, name: impl Into<String>, now: impl Into<String>) -> Self {
        let now = now.into();
        Self {
            id: id.into(),
            name: name.into(),
            progress: ProjectProgress::default(),
            completion_rate: 0,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

/// Trim and check a project name
pub fn normalize_project_name(name: &str) -> Result<String, String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err("Project name must not be empty".to_string());
    }
    if trimmed.chars().count() > MAX_PROJECT_NAME_CHARS {
        return Err(format!(
            "Project name must be at most {} characters",
            MAX_PROJECT_NAME_CHARS
        ));
    }
    Ok(trimmed.to_string())
}
