//! Step Registry
//!
//! The ordered catalogue of interview steps. Each step belongs to exactly one
//! phase, maps its answer into zero or more RFP sections, and declares how it
//! is answered and validated.
//!
//! A registry is validated on construction: step numbers must run 1..N without
//! gaps, each phase must occupy one contiguous run of steps, phases must appear
//! in interview order, and every mapped section must exist in the taxonomy.

use std::sync::OnceLock;

use serde::Serialize;

use crate::error::{CoreError, CoreResult};
use crate::sections::is_known_section;
use crate::types::{Phase, QuestionKind};

/// Section mapping that marks a step as unstructured context
pub const WILDCARD_SECTION: &str = "*";

/// Retry ceiling for steps without a dedicated validation rule
pub const DEFAULT_MAX_VALIDATION_ATTEMPTS: u32 = 1;

/// Which validation rule applies to a step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationRole {
    /// Non-empty answers of the right shape are accepted
    General,
    /// The service definition, checked for who/what/why cues
    Definition,
    /// The value proposition, challenged when it leans on price
    ValueProposition,
}

/// Immutable description of one interview step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepDefinition {
    pub number: u32,
    pub phase: Phase,
    pub name: &'static str,
    /// Comma-separated section ids, or `*`
    pub section_mapping: &'static str,
    pub question_kind: QuestionKind,
    pub allows_freeform_supplement: bool,
    pub max_validation_attempts: u32,
    pub role: ValidationRole,
}

impl StepDefinition {
    const fn new(
        number: u32,
        phase: Phase,
        name: &'static str,
        section_mapping: &'static str,
        question_kind: QuestionKind,
    ) -> Self {
        Self {
            number,
            phase,
            name,
            section_mapping,
            question_kind,
            allows_freeform_supplement: false,
            max_validation_attempts: DEFAULT_MAX_VALIDATION_ATTEMPTS,
            role: ValidationRole::General,
        }
    }

    const fn supplemented(self) -> Self {
        Self {
            allows_freeform_supplement: true,
            ..self
        }
    }

    const fn validated(self, role: ValidationRole, max_validation_attempts: u32) -> Self {
        Self {
            role,
            max_validation_attempts,
            ..self
        }
    }

    /// Section ids this step writes into, wildcard excluded
    pub fn section_ids(&self) -> impl Iterator<Item = &'static str> {
        self.section_mapping
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty() && *id != WILDCARD_SECTION)
    }

    pub fn maps_to(&self, section_id: &str) -> bool {
        self.section_ids().any(|id| id == section_id)
    }
}

use Phase::{Final, Seed, Sprout, Tree};
use QuestionKind::{FreeText, MultiChoice, MultiChoiceWithStatus, SingleChoice};

const STANDARD_STEPS: [StepDefinition; 20] = [
    StepDefinition::new(1, Seed, "서비스 정의", "1.1.1", FreeText)
        .validated(ValidationRole::Definition, 2),
    StepDefinition::new(2, Seed, "타겟 정의", "1.2.1", SingleChoice).supplemented(),
    StepDefinition::new(3, Seed, "동작 도출", "1.3.1,1.3.2,1.3.3", MultiChoiceWithStatus)
        .supplemented(),
    StepDefinition::new(4, Seed, "핵심 동작 선정", "1.3.1", SingleChoice),
    StepDefinition::new(5, Seed, "가치 제안", "1.1.2", FreeText)
        .validated(ValidationRole::ValueProposition, 3),
    StepDefinition::new(6, Seed, "실행 환경", "1.5.1", SingleChoice),
    StepDefinition::new(7, Sprout, "경쟁 서비스", "1.1.3", SingleChoice).supplemented(),
    StepDefinition::new(8, Sprout, "차별점", "1.1.3", SingleChoice).supplemented(),
    StepDefinition::new(9, Sprout, "최종 목표", "1.2.2", FreeText),
    StepDefinition::new(10, Sprout, "수익 모델", "1.4.1", SingleChoice).supplemented(),
    StepDefinition::new(11, Tree, "유입 채널", "1.1.4", MultiChoice).supplemented(),
    StepDefinition::new(12, Tree, "성공 지표", "1.6.1", SingleChoice).supplemented(),
    StepDefinition::new(13, Tree, "MVP 가설", "1.6.2", SingleChoice).supplemented(),
    StepDefinition::new(14, Tree, "외부 연동", "1.5.2", MultiChoice).supplemented(),
    StepDefinition::new(15, Tree, "초기 데이터", "1.5.4", SingleChoice).supplemented(),
    StepDefinition::new(16, Tree, "운영 비용", "1.4.2", MultiChoice).supplemented(),
    StepDefinition::new(17, Tree, "규제 제약", "1.5.3", SingleChoice).supplemented(),
    StepDefinition::new(18, Final, "비정형 맥락", WILDCARD_SECTION, FreeText),
    StepDefinition::new(19, Final, "Gap Detection", WILDCARD_SECTION, MultiChoice),
    StepDefinition::new(20, Final, "최종 확정", WILDCARD_SECTION, SingleChoice),
];

/// The inclusive step range one phase occupies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseSpan {
    pub phase: Phase,
    pub first_step: u32,
    pub last_step: u32,
}

impl PhaseSpan {
    pub fn contains(&self, step: u32) -> bool {
        (self.first_step..=self.last_step).contains(&step)
    }

    pub fn step_count(&self) -> u32 {
        self.last_step - self.first_step + 1
    }
}

/// Validated, ordered step catalogue
#[derive(Debug, Clone)]
pub struct StepRegistry {
    steps: Vec<StepDefinition>,
    spans: Vec<PhaseSpan>,
}

impl StepRegistry {
    /// Build a registry, rejecting any table that breaks the ordering rules.
    pub fn new(steps: Vec<StepDefinition>) -> CoreResult<Self> {
        if steps.is_empty() {
            return Err(CoreError::config("step registry is empty"));
        }

        let mut spans: Vec<PhaseSpan> = Vec::new();
        for (index, step) in steps.iter().enumerate() {
            let expected = index as u32 + 1;
            if step.number != expected {
                return Err(CoreError::config(format!(
                    "step numbers must be contiguous from 1: expected {}, found {}",
                    expected, step.number
                )));
            }
            if step.max_validation_attempts == 0 {
                return Err(CoreError::config(format!(
                    "step {} allows zero validation attempts",
                    step.number
                )));
            }
            if let Some(id) = step.section_ids().find(|id| !is_known_section(id)) {
                return Err(CoreError::config(format!(
                    "step {} maps to unknown section {}",
                    step.number, id
                )));
            }

            if let Some(span) = spans.last_mut().filter(|s| s.phase == step.phase) {
                span.last_step = step.number;
                continue;
            }
            if spans.iter().any(|s| s.phase >= step.phase) {
                return Err(CoreError::config(format!(
                    "phase {} is not contiguous or out of order at step {}",
                    step.phase, step.number
                )));
            }
            spans.push(PhaseSpan {
                phase: step.phase,
                first_step: step.number,
                last_step: step.number,
            });
        }

        Ok(Self { steps, spans })
    }

    /// The built-in twenty-step registry, validated once on first use.
    ///
    /// A corrupt built-in table is a build defect, so this panics rather than
    /// letting a broken interview reach users.
    pub fn standard() -> &'static StepRegistry {
        static STANDARD: OnceLock<StepRegistry> = OnceLock::new();
        STANDARD.get_or_init(|| {
            StepRegistry::new(STANDARD_STEPS.to_vec())
                .unwrap_or_else(|e| panic!("built-in step registry is corrupt: {e}"))
        })
    }

    pub fn step_count(&self) -> u32 {
        self.steps.len() as u32
    }

    pub fn steps(&self) -> &[StepDefinition] {
        &self.steps
    }

    pub fn get(&self, step_number: u32) -> Option<&StepDefinition> {
        let index = step_number.checked_sub(1)? as usize;
        self.steps.get(index)
    }

    /// Look up a step, reporting unknown numbers as not found
    pub fn step_definition(&self, step_number: u32) -> CoreResult<&StepDefinition> {
        self.get(step_number)
            .ok_or_else(|| CoreError::not_found(format!("Step {}", step_number)))
    }

    /// Phases present in this registry, in order
    pub fn phases(&self) -> &[PhaseSpan] {
        &self.spans
    }

    pub fn phase_span(&self, phase: Phase) -> Option<PhaseSpan> {
        self.spans.iter().copied().find(|s| s.phase == phase)
    }

    pub fn steps_in_phase(&self, phase: Phase) -> Vec<u32> {
        self.phase_span(phase)
            .map(|span| (span.first_step..=span.last_step).collect())
            .unwrap_or_default()
    }

    pub fn phase_of(&self, step_number: u32) -> Option<Phase> {
        self.get(step_number).map(|s| s.phase)
    }

    /// The phase after `phase`, or `None` at the terminal phase
    pub fn next_phase(&self, phase: Phase) -> Option<Phase> {
        let position = self.spans.iter().position(|s| s.phase == phase)?;
        self.spans.get(position + 1).map(|s| s.phase)
    }

    pub fn terminal_phase(&self) -> Phase {
        // `new` guarantees at least one span
        self.spans[self.spans.len() - 1].phase
    }

    pub fn first_step_of(&self, phase: Phase) -> Option<u32> {
        self.phase_span(phase).map(|s| s.first_step)
    }

    /// True exactly for the last step of a non-terminal phase
    pub fn is_phase_checkpoint(&self, step_number: u32) -> bool {
        let terminal = self.terminal_phase();
        self.spans
            .iter()
            .any(|s| s.phase != terminal && s.last_step == step_number)
    }

    pub fn is_final_step(&self, step_number: u32) -> bool {
        step_number == self.step_count()
    }
}
