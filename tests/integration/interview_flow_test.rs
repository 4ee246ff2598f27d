//! Interview Flow Integration Tests
//!
//! Walks projects through the twenty steps via the command layer:
//! - Phase checkpoints at 6, 10 and 17 and their proceed/stop decisions
//! - Definition and value-proposition rejections and force-acceptance
//! - Supplements, step ordering and terminal-state guards

use std::sync::Arc;

use rfp_forge::commands::{self, SubmitAnswerRequest};
use rfp_forge::services::interview::questions::QuestionSource;
use rfp_forge::services::interview::SubmissionOutcome;
use rfp_forge_core::{Answer, Phase, ProgressStatus, TrustLevel};

use crate::support::{answer_range, good_answer, state, state_with, submit, ScriptedProvider};

// ============================================================================
// Full walks
// ============================================================================

#[tokio::test]
async fn test_full_interview_reaches_completion() {
    let state = state();
    let project = commands::create_project(&state, "농산물 직거래".to_string())
        .await
        .data
        .unwrap();
    let id = project.id.as_str();

    let mut checkpoints = Vec::new();
    for step in 1..=20 {
        let question = commands::get_next_question(&state, id.to_string()).await.data.unwrap();
        assert_eq!(question.step_number, step);

        match submit(&state, id, step, good_answer(step)).await {
            SubmissionOutcome::AwaitingTransition {
                progress,
                prompt,
                next_phase,
            } => {
                assert!(progress.awaiting_transition);
                checkpoints.push((step, prompt.is_some(), next_phase));
                let resolved = commands::resolve_phase_transition(&state, id.to_string(), true)
                    .await
                    .data
                    .unwrap();
                assert_eq!(resolved.current_step, step + 1);
            }
            SubmissionOutcome::Completed { progress } => {
                assert_eq!(step, 20);
                assert_eq!(progress.status, ProgressStatus::Completed);
            }
            SubmissionOutcome::Advanced { progress } => {
                assert_eq!(progress.current_step, step + 1);
            }
            SubmissionOutcome::Rejected { rejection, .. } => {
                panic!("step {} rejected: {}", step, rejection.reason)
            }
        }
    }

    assert_eq!(
        checkpoints,
        vec![
            (6, true, Some(Phase::Sprout)),
            (10, true, Some(Phase::Tree)),
            (17, false, Some(Phase::Final)),
        ]
    );

    let progress = commands::get_progress(&state, id.to_string()).await.data.unwrap();
    assert_eq!(progress.progress.status, ProgressStatus::Completed);
    assert_eq!(progress.completed_step_count, 20);
    assert_eq!(progress.percentage, 100);
    assert!(progress.per_phase_completion.iter().all(|p| p.percentage == 100));

    let answers = commands::get_answers(&state, id.to_string()).await.data.unwrap();
    assert_eq!(answers.len(), 20);
    assert!(answers.iter().all(|a| a.trust_level == TrustLevel::Confirmed));

    // Completed interviews accept nothing further
    assert!(!commands::get_next_question(&state, id.to_string()).await.success);
    let late = commands::submit_answer(
        &state,
        SubmitAnswerRequest {
            project_id: id.to_string(),
            step_number: 20,
            answer: good_answer(20),
            custom_input: None,
        },
    )
    .await;
    assert!(!late.success);
}

#[tokio::test]
async fn test_stopping_after_seed_skips_to_wrap_up() {
    let state = state();
    let project = state.engine().create_project("빠른 정리").unwrap();

    answer_range(&state, &project.id, 1, 6, false).await;

    let progress = commands::get_progress(&state, project.id.clone()).await.data.unwrap();
    assert_eq!(progress.progress.current_phase, Phase::Final);
    assert_eq!(progress.progress.current_step, 18);
    assert_eq!(progress.completed_step_count, 6);

    answer_range(&state, &project.id, 18, 20, false).await;
    let progress = commands::get_progress(&state, project.id).await.data.unwrap();
    assert_eq!(progress.progress.status, ProgressStatus::Completed);
    assert_eq!(progress.completed_step_count, 9);
    assert!(progress.percentage < 100);
}

// ============================================================================
// Checkpoint guards
// ============================================================================

#[tokio::test]
async fn test_pending_checkpoint_blocks_questions_and_answers() {
    let state = state();
    let project = state.engine().create_project("체크포인트").unwrap();
    for step in 1..=6 {
        submit(&state, &project.id, step, good_answer(step)).await;
    }

    assert!(!commands::get_next_question(&state, project.id.clone()).await.success);
    let blocked = commands::submit_answer(
        &state,
        SubmitAnswerRequest {
            project_id: project.id.clone(),
            step_number: 6,
            answer: good_answer(6),
            custom_input: None,
        },
    )
    .await;
    assert!(!blocked.success);

    let resolved = commands::resolve_phase_transition(&state, project.id.clone(), true)
        .await
        .data
        .unwrap();
    assert_eq!(resolved.current_phase, Phase::Sprout);
    assert_eq!(resolved.current_step, 7);

    // Only one decision per checkpoint
    assert!(!commands::resolve_phase_transition(&state, project.id, true).await.success);
}

// ============================================================================
// Validation
// ============================================================================

#[tokio::test]
async fn test_definition_is_force_accepted_on_third_try() {
    let state = state();
    let project = state.engine().create_project("짧은 정의").unwrap();

    for attempt in 1..=2 {
        match submit(&state, &project.id, 1, Answer::text("앱")).await {
            SubmissionOutcome::Rejected { rejection, progress } => {
                assert_eq!(rejection.attempt, attempt);
                assert_eq!(rejection.max_attempts, 2);
                assert_eq!(progress.current_step, 1);
            }
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    let outcome = submit(&state, &project.id, 1, Answer::text("앱")).await;
    assert!(matches!(outcome, SubmissionOutcome::Advanced { .. }));

    let answers = state.engine().recorded_answers(&project.id).unwrap();
    assert_eq!(answers[0].attempt_count, 2);
    assert_eq!(answers[0].trust_level, TrustLevel::Confirmed);
}

#[tokio::test]
async fn test_price_only_value_proposition_is_pushed_back() {
    let state = state();
    let project = state.engine().create_project("가격 경쟁").unwrap();
    answer_range(&state, &project.id, 1, 4, true).await;

    let outcome = submit(&state, &project.id, 5, Answer::text("다른 곳보다 저렴해요")).await;
    let SubmissionOutcome::Rejected { rejection, .. } = outcome else {
        panic!("expected a price rejection");
    };
    assert!(!rejection.followup_question.is_empty());

    let outcome = submit(&state, &project.id, 5, good_answer(5)).await;
    assert!(matches!(outcome, SubmissionOutcome::Advanced { .. }));
}

#[tokio::test]
async fn test_out_of_order_and_malformed_answers() {
    let state = state();
    let project = state.engine().create_project("순서").unwrap();

    let skipped = commands::submit_answer(
        &state,
        SubmitAnswerRequest {
            project_id: project.id.clone(),
            step_number: 3,
            answer: good_answer(3),
            custom_input: None,
        },
    )
    .await;
    assert!(skipped.error.unwrap().starts_with("Invalid input"));

    submit(&state, &project.id, 1, good_answer(1)).await;
    let two_picks = commands::submit_answer(
        &state,
        SubmitAnswerRequest {
            project_id: project.id.clone(),
            step_number: 2,
            answer: Answer::choices(["농부", "소비자"]),
            custom_input: None,
        },
    )
    .await;
    assert!(!two_picks.success);

    let progress = state.engine().get_project(&project.id).unwrap().progress;
    assert_eq!(progress.current_step, 2);
}

#[tokio::test]
async fn test_supplement_is_recorded_with_the_choice() {
    let state = state();
    let project = state.engine().create_project("보충").unwrap();
    submit(&state, &project.id, 1, good_answer(1)).await;

    let response = commands::submit_answer(
        &state,
        SubmitAnswerRequest {
            project_id: project.id.clone(),
            step_number: 2,
            answer: Answer::choices(["농부"]),
            custom_input: Some("도시 식당".to_string()),
        },
    )
    .await;
    assert!(response.success);

    let answers = state.engine().recorded_answers(&project.id).unwrap();
    assert_eq!(answers[1].raw_answer, Some(Answer::choices(["농부", "도시 식당"])));

    // A blank supplement is ignored
    let blank = commands::submit_answer(
        &state,
        SubmitAnswerRequest {
            project_id: project.id,
            step_number: 3,
            answer: good_answer(3),
            custom_input: Some("  ".to_string()),
        },
    )
    .await;
    assert!(blank.success);
}

#[tokio::test]
async fn test_supplement_refused_on_free_text_step() {
    let state = state();
    let project = state.engine().create_project("보충 불가").unwrap();

    let refused = commands::submit_answer(
        &state,
        SubmitAnswerRequest {
            project_id: project.id.clone(),
            step_number: 1,
            answer: good_answer(1),
            custom_input: Some("추가 설명".to_string()),
        },
    )
    .await;
    assert!(!refused.success);
    assert!(state.engine().recorded_answers(&project.id).unwrap().is_empty());
}

// ============================================================================
// Generated questions
// ============================================================================

#[tokio::test]
async fn test_generated_question_falls_back_on_bad_reply() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        Ok(r#"{"text": "어떤 서비스를 만들고 싶으세요?", "hint": "한 문장이면 충분합니다"}"#.to_string()),
        Ok("질문을 만들 수 없습니다".to_string()),
    ]));
    let state = state_with(provider.clone());
    let project = state.engine().create_project("생성 질문").unwrap();

    let question = commands::get_next_question(&state, project.id.clone()).await.data.unwrap();
    assert_eq!(question.source, QuestionSource::Generated);
    assert_eq!(question.text, "어떤 서비스를 만들고 싶으세요?");

    let question = commands::get_next_question(&state, project.id).await.data.unwrap();
    assert_eq!(question.source, QuestionSource::Catalogue);
    assert_eq!(question.step_number, 1);
    assert_eq!(provider.prompt_count(), 2);
}
