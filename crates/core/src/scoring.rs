//! Completion Scoring
//!
//! One weighted completion formula shared by progress reporting, previews and
//! generated documents: confirmed counts 1.0, inferred 0.5, anything else 0,
//! rounded half-up to a whole percentage. Arithmetic is done on integers in
//! half-units so the result never depends on float rounding.

use serde::{Deserialize, Serialize};

use crate::sections::{section_name, SECTIONS, MINIMUM_REQUIRED_SECTIONS, P0_PRIORITY_ORDER};
use crate::types::TrustLevel;

const MAX_P0_GAPS: usize = 5;
const MAX_P1_GAPS: usize = 3;

/// `round(100 * numerator / denominator)` with halves rounded up. Zero denominator yields 0.
pub fn round_percent(numerator: u64, denominator: u64) -> u8 {
    if denominator == 0 {
        return 0;
    }
    let rounded = (200 * numerator + denominator) / (2 * denominator);
    rounded.min(100) as u8
}

/// Weighted completion rate over a set of trust levels
pub fn completion_rate<I>(levels: I) -> u8
where
    I: IntoIterator<Item = TrustLevel>,
{
    let (halves, count) = levels
        .into_iter()
        .fold((0u64, 0u64), |(halves, count), level| {
            (halves + level.weight_halves(), count + 1)
        });
    round_percent(halves, 2 * count)
}

/// Coarse bucket for a completion rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionLevel {
    High,
    Medium,
    Low,
    Critical,
}

impl CompletionLevel {
    pub fn from_rate(rate: u8) -> Self {
        match rate {
            80.. => Self::High,
            50..=79 => Self::Medium,
            30..=49 => Self::Low,
            _ => Self::Critical,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
            Self::Critical => "critical",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "high" => Some(Self::High),
            "medium" => Some(Self::Medium),
            "low" => Some(Self::Low),
            "critical" => Some(Self::Critical),
            _ => None,
        }
    }
}

/// True when every required section is confirmed or inferred.
///
/// `trust_of` reports the trust level for a section id.
pub fn minimum_requirements_met<F>(trust_of: F) -> bool
where
    F: Fn(&str) -> TrustLevel,
{
    MINIMUM_REQUIRED_SECTIONS
        .iter()
        .all(|id| trust_of(id).is_filled())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GapPriority {
    /// Must be resolved before the RFP is usable
    P0,
    /// Recommended
    P1,
}

/// A section still lacking a usable answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Gap {
    pub section_id: &'static str,
    pub name: &'static str,
    pub priority: GapPriority,
}

/// Rank unfilled sections: P0 in priority order (max 5), then P1 in document order (max 3).
pub fn gap_priorities<F>(trust_of: F) -> Vec<Gap>
where
    F: Fn(&str) -> TrustLevel,
{
    let is_gap = |id: &str| !trust_of(id).is_filled();

    let p0 = P0_PRIORITY_ORDER
        .iter()
        .copied()
        .filter(|id| is_gap(id))
        .take(MAX_P0_GAPS)
        .map(|id| Gap {
            section_id: id,
            name: section_name(id).unwrap_or(id),
            priority: GapPriority::P0,
        });

    let p1 = SECTIONS
        .iter()
        .filter(|s| !P0_PRIORITY_ORDER.contains(&s.id) && is_gap(s.id))
        .take(MAX_P1_GAPS)
        .map(|s| Gap {
            section_id: s.id,
            name: s.name,
            priority: GapPriority::P1,
        });

    p0.chain(p1).collect()
}
