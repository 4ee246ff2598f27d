//! Settings Commands
//!
//! Read and change config.json.

use crate::models::response::CommandResponse;
use crate::models::settings::{AppConfig, SettingsUpdate};
use crate::state::AppState;

pub async fn get_settings(state: &AppState) -> CommandResponse<AppConfig> {
    state.get_config().await.into()
}

/// Apply a partial update and persist it
pub async fn update_settings(state: &AppState, update: SettingsUpdate) -> CommandResponse<AppConfig> {
    state.update_config(update).await.into()
}

pub async fn reset_settings(state: &AppState) -> CommandResponse<AppConfig> {
    state.reset_config().await.into()
}
