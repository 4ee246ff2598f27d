//! Storage Integration Tests
//!
//! A file-backed SQLite database and config.json under a temp directory,
//! reopened between steps to prove state survives a restart.

use std::path::Path;

use rfp_forge::commands;
use rfp_forge::models::settings::SettingsUpdate;
use rfp_forge::storage::ConfigService;
use rfp_forge::AppState;
use rfp_forge_core::{Phase, ProgressStatus, TrustLevel};
use rfp_forge_llm::ProviderType;

use crate::support::{answer_range, submit};

fn open_state(dir: &Path) -> AppState {
    let mut config = ConfigService::at(dir.join("config.json")).unwrap();
    config
        .update_config(SettingsUpdate {
            llm_enabled: Some(false),
            database_path: Some(dir.join("rfp.db").display().to_string()),
            ..Default::default()
        })
        .unwrap();
    AppState::from_config(config).unwrap()
}

#[tokio::test]
async fn test_progress_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();

    let project_id = {
        let state = open_state(dir.path());
        let project = state.engine().create_project("재시작").unwrap();
        answer_range(&state, &project.id, 1, 6, true).await;
        submit(&state, &project.id, 7, rfp_forge_core::Answer::choices(["마켓컬리"])).await;
        project.id
    };

    let state = open_state(dir.path());
    let progress = commands::get_progress(&state, project_id.clone()).await.data.unwrap();
    assert_eq!(progress.progress.current_phase, Phase::Sprout);
    assert_eq!(progress.progress.current_step, 8);
    assert_eq!(progress.progress.status, ProgressStatus::InProgress);
    assert_eq!(progress.completed_steps, (1..=7).collect::<Vec<u32>>());

    let answers = commands::get_answers(&state, project_id.clone()).await.data.unwrap();
    assert!(answers.iter().all(|a| a.trust_level == TrustLevel::Confirmed));

    let question = commands::get_next_question(&state, project_id).await.data.unwrap();
    assert_eq!(question.step_number, 8);
}

#[tokio::test]
async fn test_rejection_counter_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();

    let project_id = {
        let state = open_state(dir.path());
        let project = state.engine().create_project("재시도").unwrap();
        submit(&state, &project.id, 1, rfp_forge_core::Answer::text("앱")).await;
        project.id
    };

    let state = open_state(dir.path());
    let answers = state.engine().recorded_answers(&project_id).unwrap();
    assert_eq!(answers.len(), 1);
    assert_eq!(answers[0].trust_level, TrustLevel::Pending);
    assert_eq!(answers[0].attempt_count, 1);
    assert!(answers[0].raw_answer.is_none());
}

#[tokio::test]
async fn test_documents_and_deletion_persist() {
    let dir = tempfile::tempdir().unwrap();

    let project_id = {
        let state = open_state(dir.path());
        let project = state.engine().create_project("문서 보관").unwrap();
        answer_range(&state, &project.id, 1, 3, true).await;
        assert!(commands::generate_rfp(&state, project.id.clone()).await.success);
        project.id
    };

    let state = open_state(dir.path());
    let latest = commands::get_latest_rfp(&state, project_id.clone()).await.data.unwrap();
    assert!(latest.is_some());
    assert_eq!(commands::list_projects(&state).await.data.unwrap().len(), 1);

    assert!(commands::delete_project(&state, project_id.clone()).await.success);
    drop(state);

    let state = open_state(dir.path());
    assert!(commands::list_projects(&state).await.data.unwrap().is_empty());
    assert!(!commands::get_latest_rfp(&state, project_id).await.success);
}

#[tokio::test]
async fn test_settings_commands_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let state = open_state(dir.path());

    let health = commands::get_health(&state).await.data.unwrap();
    assert!(health.database);
    assert!(!health.llm_configured);

    let updated = commands::update_settings(
        &state,
        SettingsUpdate {
            provider: Some(ProviderType::OpenAI),
            model: Some("gpt-4o-mini".to_string()),
            ..Default::default()
        },
    )
    .await
    .data
    .unwrap();
    assert_eq!(updated.llm.provider, ProviderType::OpenAI);

    let rejected = commands::update_settings(
        &state,
        SettingsUpdate {
            log_level: Some("noisy".to_string()),
            ..Default::default()
        },
    )
    .await;
    assert!(!rejected.success);
    let current = commands::get_settings(&state).await.data.unwrap();
    assert_eq!(current.llm.model, "gpt-4o-mini");

    let reset = commands::reset_settings(&state).await.data.unwrap();
    assert_eq!(reset.llm.provider, ProviderType::Anthropic);
    assert!(reset.database_path.is_none());

    let reloaded = ConfigService::at(dir.path().join("config.json")).unwrap();
    assert_eq!(reloaded.get_config().llm.provider, ProviderType::Anthropic);
}
