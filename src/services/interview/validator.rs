//! Answer Validator
//!
//! Pure accept/reject decisions for a single submission. Shape checks apply to
//! every step; the definition and value-proposition steps add their own rules
//! on top. Nothing here touches storage: the caller persists attempt counts.

use serde::Serialize;

use rfp_forge_core::{
    Answer, CoreError, CoreResult, QuestionKind, StepDefinition, StepRegistry, ValidationRole,
};

use super::cues::{self, Signal};

/// Definitions shorter than this (in characters, after trimming) are sent back
pub const MIN_DEFINITION_CHARS: usize = 5;

/// Prior rejections after which a step stops challenging the answer
pub const FORCE_ACCEPT_AFTER: u32 = 2;

const SHORT_REASON: &str = "너무 짧은 답변입니다.";
const SHORT_FOLLOWUP: &str = "조금 더 구체적으로 설명해주실 수 있나요?";
const PRICE_REASON: &str = "가격 기반 가치 제안은 모방이 쉽습니다.";
const PRICE_FOLLOWUPS: [&str; 2] = [
    "가격 외에 다른 이유가 있을까요?",
    "가격이 싼 이유가 있나요? (예: 중간 유통 제거)",
];

/// Why an answer was sent back, and what to ask next
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rejection {
    pub reason: String,
    pub followup_question: String,
    /// 1-based number of the attempt just rejected
    pub attempt: u32,
    pub max_attempts: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ValidationOutcome {
    Accepted,
    Rejected(Rejection),
}

impl ValidationOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

/// Decides whether a submitted answer is good enough to record
#[derive(Debug, Clone, Copy)]
pub struct AnswerValidator {
    registry: &'static StepRegistry,
}

impl AnswerValidator {
    pub fn new(registry: &'static StepRegistry) -> Self {
        Self { registry }
    }

    /// Validate `answer` for `step_number`, given how many times it was rejected before.
    ///
    /// Unknown steps and answers of the wrong shape are errors, not rejections.
    pub fn validate(
        &self,
        step_number: u32,
        answer: &Answer,
        attempt_count: u32,
    ) -> CoreResult<ValidationOutcome> {
        let step = self.registry.step_definition(step_number)?;
        check_shape(step, answer)?;

        let outcome = match step.role {
            ValidationRole::General => ValidationOutcome::Accepted,
            ValidationRole::Definition => validate_definition(step, &answer.to_plain(), attempt_count),
            ValidationRole::ValueProposition => {
                validate_value_proposition(step, &answer.to_plain(), attempt_count)
            }
        };

        if let ValidationOutcome::Rejected(rejection) = &outcome {
            tracing::debug!(
                step = step_number,
                attempt = rejection.attempt,
                max_attempts = rejection.max_attempts,
                "answer rejected"
            );
        }
        Ok(outcome)
    }
}

fn check_shape(step: &StepDefinition, answer: &Answer) -> CoreResult<()> {
    let selected = answer.selected();
    if selected.is_empty() {
        return Err(CoreError::validation(format!(
            "Answer for step {} must not be empty",
            step.number
        )));
    }

    match step.question_kind {
        QuestionKind::FreeText if answer.as_text().is_none() => Err(CoreError::validation(
            format!("Step {} expects a free-text answer", step.number),
        )),
        QuestionKind::SingleChoice if selected.len() > 1 => Err(CoreError::validation(format!(
            "Step {} accepts a single option, got {}",
            step.number,
            selected.len()
        ))),
        _ => Ok(()),
    }
}

fn reject(step: &StepDefinition, attempt_count: u32, reason: String, followup: String) -> ValidationOutcome {
    ValidationOutcome::Rejected(Rejection {
        reason,
        followup_question: followup,
        attempt: attempt_count + 1,
        max_attempts: step.max_validation_attempts,
    })
}

fn validate_definition(step: &StepDefinition, text: &str, attempt_count: u32) -> ValidationOutcome {
    if attempt_count >= FORCE_ACCEPT_AFTER {
        return ValidationOutcome::Accepted;
    }

    let text = text.trim();
    if text.chars().count() < MIN_DEFINITION_CHARS {
        return reject(step, attempt_count, SHORT_REASON.to_string(), SHORT_FOLLOWUP.to_string());
    }

    let report = cues::classify(text);
    if report.is_sufficient() {
        return ValidationOutcome::Accepted;
    }

    let missing = report
        .missing()
        .iter()
        .map(|signal| format!("[{}]", signal.label()))
        .collect::<Vec<_>>()
        .join(", ");

    let mut example = String::new();
    if !report.has(Signal::Target) {
        example.push_str("누가 사용하고, ");
    }
    if !report.has(Signal::Action) {
        example.push_str("무엇을 하는 ");
    }

    reject(
        step,
        attempt_count,
        format!("{}에 대한 정보가 부족합니다.", missing),
        format!(
            "{}에 대해 조금 더 알려주시겠어요? 예: \"{}서비스인가요?\"",
            missing, example
        ),
    )
}

fn validate_value_proposition(
    step: &StepDefinition,
    text: &str,
    attempt_count: u32,
) -> ValidationOutcome {
    if attempt_count >= FORCE_ACCEPT_AFTER || !cues::mentions_price(text) {
        return ValidationOutcome::Accepted;
    }

    let followup = PRICE_FOLLOWUPS
        .get(attempt_count as usize)
        .copied()
        .unwrap_or(PRICE_FOLLOWUPS[0]);
    reject(step, attempt_count, PRICE_REASON.to_string(), followup.to_string())
}
