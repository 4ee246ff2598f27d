//! Project Commands
//!
//! Create, inspect, rename and delete interview projects.

use tracing::debug;

use crate::models::project::Project;
use crate::models::response::CommandResponse;
use crate::state::AppState;

/// Create a new project at the start of the interview
pub async fn create_project(state: &AppState, name: String) -> CommandResponse<Project> {
    state.engine().create_project(&name).into()
}

/// List all projects, newest first
pub async fn list_projects(state: &AppState) -> CommandResponse<Vec<Project>> {
    let result = state.engine().list_projects();
    if let Ok(projects) = &result {
        debug!(count = projects.len(), "listed projects");
    }
    result.into()
}

/// Get a single project by ID
pub async fn get_project(state: &AppState, project_id: String) -> CommandResponse<Project> {
    state.engine().get_project(&project_id).into()
}

pub async fn rename_project(
    state: &AppState,
    project_id: String,
    name: String,
) -> CommandResponse<Project> {
    state.engine().rename_project(&project_id, &name).into()
}

/// Delete a project together with its answers and documents
pub async fn delete_project(state: &AppState, project_id: String) -> CommandResponse<bool> {
    state
        .engine()
        .delete_project(&project_id)
        .map(|_| true)
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_project_lifecycle() {
        let state = AppState::in_memory().unwrap();

        let created = create_project(&state, "농산물 직거래".to_string()).await;
        assert!(created.success);
        let id = created.data.unwrap().id;

        let renamed = rename_project(&state, id.clone(), "직거래 2".to_string()).await;
        assert_eq!(renamed.data.unwrap().name, "직거래 2");

        let listed = list_projects(&state).await;
        assert_eq!(listed.data.unwrap().len(), 1);

        assert!(delete_project(&state, id.clone()).await.success);
        let missing = get_project(&state, id).await;
        assert!(!missing.success);
        assert!(missing.error.unwrap().starts_with("Not found"));
    }

    #[tokio::test]
    async fn test_blank_name_is_rejected() {
        let state = AppState::in_memory().unwrap();
        let response = create_project(&state, "  ".to_string()).await;
        assert!(!response.success);
        assert!(response.error.unwrap().starts_with("Invalid input"));
    }
}
