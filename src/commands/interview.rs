//! Interview Commands
//!
//! Questions, answer submission, phase transitions and progress.

use serde::{Deserialize, Serialize};

use rfp_forge_core::{Answer, ProjectProgress, RecordedAnswer};

use crate::models::response::CommandResponse;
use crate::services::interview::{next_question, InterviewProgress, Question, SubmissionOutcome};
use crate::state::AppState;

/// Answer submission request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAnswerRequest {
    pub project_id: String,
    pub step_number: u32,
    pub answer: Answer,
    /// Free-form text added to a choice answer
    #[serde(default)]
    pub custom_input: Option<String>,
}

/// Get the question for the project's current step
pub async fn get_next_question(state: &AppState, project_id: String) -> CommandResponse<Question> {
    next_question(state.engine(), state.provider(), &project_id)
        .await
        .into()
}

/// Submit an answer for the current step
pub async fn submit_answer(
    state: &AppState,
    request: SubmitAnswerRequest,
) -> CommandResponse<SubmissionOutcome> {
    state
        .engine()
        .submit_answer(
            &request.project_id,
            request.step_number,
            request.answer,
            request.custom_input.as_deref(),
        )
        .into()
}

/// Decide a pending phase checkpoint
pub async fn resolve_phase_transition(
    state: &AppState,
    project_id: String,
    proceed: bool,
) -> CommandResponse<ProjectProgress> {
    state
        .engine()
        .resolve_phase_transition(&project_id, proceed)
        .into()
}

pub async fn get_progress(state: &AppState, project_id: String) -> CommandResponse<InterviewProgress> {
    state.engine().get_progress(&project_id).into()
}

pub async fn get_answers(state: &AppState, project_id: String) -> CommandResponse<Vec<RecordedAnswer>> {
    state.engine().recorded_answers(&project_id).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_submit_request_accepts_both_answer_forms() {
        let request: SubmitAnswerRequest = serde_json::from_str(
            r#"{"projectId":"p1","stepNumber":2,"answer":["농부"],"customInput":"도시 소비자"}"#,
        )
        .unwrap();
        assert_eq!(request.answer, Answer::choices(["농부"]));
        assert_eq!(request.custom_input.as_deref(), Some("도시 소비자"));

        let request: SubmitAnswerRequest =
            serde_json::from_str(r#"{"projectId":"p1","stepNumber":1,"answer":"직거래"}"#).unwrap();
        assert_eq!(request.answer, Answer::text("직거래"));
        assert!(request.custom_input.is_none());
    }

    #[tokio::test]
    async fn test_question_then_answer() {
        let state = AppState::in_memory().unwrap();
        let project = state.engine().create_project("demo").unwrap();

        let question = get_next_question(&state, project.id.clone()).await.data.unwrap();
        assert_eq!(question.step_number, 1);

        let outcome = submit_answer(
            &state,
            SubmitAnswerRequest {
                project_id: project.id.clone(),
                step_number: 1,
                answer: Answer::text("농부가 농산물을 직접 판매하는 서비스"),
                custom_input: None,
            },
        )
        .await;
        assert!(outcome.success);

        let progress = get_progress(&state, project.id.clone()).await.data.unwrap();
        assert_eq!(progress.completed_step_count, 1);
        assert_eq!(progress.progress.current_step, 2);

        let transition = resolve_phase_transition(&state, project.id, true).await;
        assert!(!transition.success);
    }
}
