//! RFP Commands
//!
//! Previews, document generation and export.

use crate::models::response::CommandResponse;
use crate::models::rfp::RfpDocument;
use crate::services::rfp::{
    generate_rfp as synthesize_and_store, latest_rfp, overview, render_markdown, RfpOverview,
};
use crate::state::AppState;
use crate::utils::error::{AppError, AppResult};

/// Preview sections plus completion figures for the current answers
pub async fn get_rfp_preview(state: &AppState, project_id: String) -> CommandResponse<RfpOverview> {
    let engine = state.engine();
    engine
        .recorded_answers(&project_id)
        .map(|answers| overview(engine.registry(), &answers))
        .into()
}

/// Synthesize and store a new document
pub async fn generate_rfp(state: &AppState, project_id: String) -> CommandResponse<RfpDocument> {
    synthesize_and_store(state.engine(), state.provider(), &project_id)
        .await
        .into()
}

pub async fn get_latest_rfp(
    state: &AppState,
    project_id: String,
) -> CommandResponse<Option<RfpDocument>> {
    latest_rfp(state.engine(), &project_id).into()
}

/// Markdown for the newest document
pub async fn export_rfp_markdown(state: &AppState, project_id: String) -> CommandResponse<String> {
    export(state, &project_id).into()
}

fn export(state: &AppState, project_id: &str) -> AppResult<String> {
    let project = state.engine().get_project(project_id)?;
    let document = latest_rfp(state.engine(), project_id)?.ok_or_else(|| {
        AppError::not_found(format!("No RFP has been generated for project {}", project_id))
    })?;
    Ok(render_markdown(&project.name, &document))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::rfp::GenerationMode;

    #[tokio::test]
    async fn test_export_requires_a_document() {
        let state = AppState::in_memory().unwrap();
        let project = state.engine().create_project("직거래").unwrap();

        let response = export_rfp_markdown(&state, project.id.clone()).await;
        assert!(!response.success);

        let generated = generate_rfp(&state, project.id.clone()).await.data.unwrap();
        assert_eq!(generated.mode, GenerationMode::Fallback);

        let markdown = export_rfp_markdown(&state, project.id).await.data.unwrap();
        assert!(markdown.starts_with("# 직거래 RFP"));
    }

    #[tokio::test]
    async fn test_preview_of_unknown_project() {
        let state = AppState::in_memory().unwrap();
        let response = get_rfp_preview(&state, "missing".to_string()).await;
        assert!(!response.success);
    }
}
