//! Answer → Section Mapping
//!
//! Places recorded answers into RFP sections through each step's section
//! mapping and derives everything computed from that placement: the preview,
//! the project-level completion figures, and the deterministic fallback body.

use std::collections::BTreeMap;

use serde::Serialize;

use rfp_forge_core::{
    completion_rate, gap_priorities, minimum_requirements_met, round_percent, CompletionLevel,
    Gap, RecordedAnswer, SectionInfo, StepRegistry, TrustLevel, SECTIONS,
};

use crate::models::rfp::{
    MappedSection, PreviewSection, PreviewStatus, RfpContent, RfpPreview, RfpSection,
};

/// Preview text for a section nothing has been mapped into
pub const PREVIEW_PLACEHOLDER: &str = "아직 정보가 없습니다.";

/// Preview text is cut to this many characters
pub const PREVIEW_MAX_CHARS: usize = 100;

const ELLIPSIS: &str = "...";

/// Section id → mapped answer
pub type SectionMap = BTreeMap<&'static str, MappedSection>;

/// Answers sorted by step, with steps unknown to the registry dropped
fn in_step_order<'a>(
    registry: &StepRegistry,
    answers: &'a [RecordedAnswer],
) -> Vec<&'a RecordedAnswer> {
    let mut ordered: Vec<&RecordedAnswer> = answers
        .iter()
        .filter(|a| registry.get(a.step_number).is_some())
        .collect();
    ordered.sort_by_key(|a| a.step_number);
    ordered
}

/// Write every answer under each section its step maps to; later steps win.
pub fn map_answers_to_sections(registry: &StepRegistry, answers: &[RecordedAnswer]) -> SectionMap {
    let mut map = SectionMap::new();
    for answer in in_step_order(registry, answers) {
        let Some(step) = registry.get(answer.step_number) else {
            continue;
        };
        for section_id in step.section_ids() {
            map.insert(
                section_id,
                MappedSection {
                    answer: answer.raw_answer.clone(),
                    trust_level: answer.trust_level,
                    source_step: answer.step_number,
                },
            );
        }
    }
    map
}

/// Trust level of a section in a mapping; unmapped sections are missing
pub fn trust_of(map: &SectionMap, section_id: &str) -> TrustLevel {
    map.get(section_id)
        .map(|m| m.trust_level)
        .unwrap_or_default()
}

/// Cut `text` to `PREVIEW_MAX_CHARS` characters, marking the cut
pub fn truncate_preview(text: &str) -> String {
    if text.chars().count() <= PREVIEW_MAX_CHARS {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(PREVIEW_MAX_CHARS).collect();
    cut.push_str(ELLIPSIS);
    cut
}

/// Preview over an explicit section list
pub fn preview_sections(
    sections: &[SectionInfo],
    registry: &StepRegistry,
    answers: &[RecordedAnswer],
) -> RfpPreview {
    let mut previews: Vec<PreviewSection> = sections
        .iter()
        .map(|s| PreviewSection {
            id: s.id.to_string(),
            name: s.name.to_string(),
            status: PreviewStatus::Missing,
            preview: PREVIEW_PLACEHOLDER.to_string(),
        })
        .collect();

    for answer in in_step_order(registry, answers) {
        let (Some(raw), Some(step)) = (&answer.raw_answer, registry.get(answer.step_number)) else {
            continue;
        };
        let status = if answer.trust_level == TrustLevel::Confirmed {
            PreviewStatus::Complete
        } else {
            PreviewStatus::Partial
        };
        let text = truncate_preview(&raw.render());

        for section in previews.iter_mut().filter(|p| step.maps_to(&p.id)) {
            section.status = status;
            section.preview = text.clone();
        }
    }

    let complete = previews
        .iter()
        .filter(|p| p.status == PreviewStatus::Complete)
        .count();
    let overall_progress = round_percent(complete as u64, previews.len() as u64);

    RfpPreview {
        sections: previews,
        overall_progress,
    }
}

/// Preview over the full section taxonomy
pub fn preview(registry: &StepRegistry, answers: &[RecordedAnswer]) -> RfpPreview {
    preview_sections(&SECTIONS, registry, answers)
}

/// Deterministic document body: each section takes the first answer mapped into it
pub fn fallback_content(
    registry: &StepRegistry,
    project_name: &str,
    answers: &[RecordedAnswer],
) -> RfpContent {
    let ordered = in_step_order(registry, answers);

    let sections = SECTIONS
        .iter()
        .map(|section| {
            let source = ordered.iter().find(|a| {
                registry
                    .get(a.step_number)
                    .is_some_and(|step| step.maps_to(section.id))
            });
            RfpSection {
                id: section.id.to_string(),
                name: section.name.to_string(),
                content: source.and_then(|a| a.raw_answer.as_ref()).map(|raw| raw.render()),
                trust_level: source.map(|a| a.trust_level).unwrap_or_default(),
                source_step: source.map(|a| a.step_number),
            }
        })
        .collect();

    RfpContent {
        sections,
        summary: fallback_summary(project_name),
    }
}

pub fn fallback_summary(project_name: &str) -> String {
    format!("{} 프로젝트의 RFP입니다.", project_name)
}

/// Project-level completion figures derived from the current answers
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RfpOverview {
    pub preview: RfpPreview,
    pub completion_rate: u8,
    pub completion_level: CompletionLevel,
    pub minimum_requirements_met: bool,
    pub gaps: Vec<Gap>,
}

pub fn overview(registry: &StepRegistry, answers: &[RecordedAnswer]) -> RfpOverview {
    let map = map_answers_to_sections(registry, answers);
    let rate = completion_rate(SECTIONS.iter().map(|s| trust_of(&map, s.id)));

    RfpOverview {
        preview: preview(registry, answers),
        completion_rate: rate,
        completion_level: CompletionLevel::from_rate(rate),
        minimum_requirements_met: minimum_requirements_met(|id| trust_of(&map, id)),
        gaps: gap_priorities(|id| trust_of(&map, id)),
    }
}
