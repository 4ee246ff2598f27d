//! RFP Synthesis Integration Tests
//!
//! Previews, document generation with and without a provider, storage of
//! the newest document and Markdown export.

use std::sync::Arc;

use rfp_forge::commands;
use rfp_forge::models::rfp::{GenerationMode, PreviewStatus};
use rfp_forge_core::{CompletionLevel, GapPriority, SECTIONS};
use rfp_forge_llm::LlmError;

use crate::support::{answer_range, state, state_with, ScriptedProvider};

#[tokio::test]
async fn test_preview_without_answers() {
    let state = state();
    let project = state.engine().create_project("빈 프로젝트").unwrap();

    let overview = commands::get_rfp_preview(&state, project.id).await.data.unwrap();
    assert_eq!(overview.completion_rate, 0);
    assert_eq!(overview.completion_level, CompletionLevel::Critical);
    assert!(!overview.minimum_requirements_met);
    assert_eq!(overview.preview.overall_progress, 0);
    assert_eq!(overview.preview.sections.len(), SECTIONS.len());
    assert!(overview
        .preview
        .sections
        .iter()
        .all(|s| s.status == PreviewStatus::Missing && s.preview == "아직 정보가 없습니다."));

    // P0 gaps lead the list
    assert_eq!(overview.gaps[0].section_id, "1.3.1");
    assert_eq!(overview.gaps[0].priority, GapPriority::P0);
    assert_eq!(overview.gaps.len(), 8);
}

#[tokio::test]
async fn test_fallback_document_after_full_interview() {
    let state = state();
    let project = state.engine().create_project("직거래").unwrap();
    answer_range(&state, &project.id, 1, 20, true).await;

    let document = commands::generate_rfp(&state, project.id.clone()).await.data.unwrap();
    assert_eq!(document.mode, GenerationMode::Fallback);
    assert_eq!(document.content.sections.len(), SECTIONS.len());
    assert_eq!(document.content.summary, "직거래 프로젝트의 RFP입니다.");
    // 17 of 21 sections confirmed
    assert_eq!(document.completion_rate, 81);
    assert_eq!(document.completion_level, CompletionLevel::High);
    assert!(document.minimum_requirements_met);

    let stored = state.engine().get_project(&project.id).unwrap();
    assert_eq!(stored.completion_rate, 81);

    let latest = commands::get_latest_rfp(&state, project.id.clone()).await.data.unwrap();
    assert_eq!(latest, Some(document));

    let markdown = commands::export_rfp_markdown(&state, project.id).await.data.unwrap();
    assert!(markdown.starts_with("# 직거래 RFP"));
    assert!(markdown.contains("## 요약"));
    assert!(markdown.contains("농부가 농산물을 직접 판매하는 직거래 서비스"));
}

#[tokio::test]
async fn test_generated_document_replaces_latest() {
    let reply = r#"초안입니다:
{"sections": [
  {"id": "1.1.1", "name": "문제", "content": "농산물 유통 단계가 길다", "trustLevel": "confirmed", "sourceStep": 1},
  {"id": "1.2.1", "name": "사용자", "content": "산지 농부", "trustLevel": "confirmed", "sourceStep": 2},
  {"id": "1.3.1", "name": "핵심", "content": "상품 등록", "trustLevel": "inferred"}
], "summary": "농부와 소비자를 잇는 직거래 플랫폼"}"#;
    let provider = Arc::new(ScriptedProvider::new(vec![
        Err(LlmError::RateLimited {
            message: "slow down".to_string(),
            retry_after: None,
        }),
        Ok(reply.to_string()),
    ]));
    let state = state_with(provider.clone());
    let project = state.engine().create_project("직거래").unwrap();
    answer_range(&state, &project.id, 1, 4, true).await;

    let first = commands::generate_rfp(&state, project.id.clone()).await.data.unwrap();
    assert_eq!(first.mode, GenerationMode::Fallback);

    let second = commands::generate_rfp(&state, project.id.clone()).await.data.unwrap();
    assert_eq!(second.mode, GenerationMode::Generated);
    assert_eq!(second.content.sections[0].name, "해결하려는 문제");
    assert_eq!(second.content.summary, "농부와 소비자를 잇는 직거래 플랫폼");
    // (2 + 2 + 1) / 6
    assert_eq!(second.completion_rate, 83);
    assert!(second.minimum_requirements_met);

    let latest = commands::get_latest_rfp(&state, project.id).await.data.unwrap().unwrap();
    assert_eq!(latest.id, second.id);

    let prompts = provider.prompts.lock().unwrap();
    assert_eq!(prompts.len(), 2);
    assert!(prompts[1].contains("'직거래'"));
}

#[tokio::test]
async fn test_non_conforming_draft_falls_back() {
    let duplicate = r#"{"sections": [
  {"id": "1.1.1", "name": "a", "content": "x", "trustLevel": "confirmed"},
  {"id": "1.1.1", "name": "b", "content": "y", "trustLevel": "confirmed"}
], "summary": "중복"}"#;
    let provider = Arc::new(ScriptedProvider::new(vec![Ok(duplicate.to_string())]));
    let state = state_with(provider);
    let project = state.engine().create_project("중복 섹션").unwrap();

    let document = commands::generate_rfp(&state, project.id).await.data.unwrap();
    assert_eq!(document.mode, GenerationMode::Fallback);
    assert_eq!(document.content.sections.len(), SECTIONS.len());
}

#[tokio::test]
async fn test_documents_for_unknown_project() {
    let state = state();
    assert!(!commands::generate_rfp(&state, "missing".to_string()).await.success);
    assert!(!commands::get_latest_rfp(&state, "missing".to_string()).await.success);
}
