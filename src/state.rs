//! Application State
//!
//! Holds the services every command needs: the interview engine over its
//! store, the optional text-generation provider, and the configuration.

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use rfp_forge_llm::{create_provider, LlmProvider};

use crate::models::settings::{AppConfig, LlmSettings, SettingsUpdate};
use crate::services::interview::{InterviewEngine, InterviewStore, SqliteInterviewStore};
use crate::storage::{ConfigService, Database};
use crate::utils::error::{AppError, AppResult};

/// Application state shared by all commands
pub struct AppState {
    /// SQLite database, absent when running over a non-SQLite store
    database: Option<Database>,
    /// Configuration service, absent for ephemeral states
    config: Option<Arc<RwLock<ConfigService>>>,
    engine: InterviewEngine,
    provider: Option<Arc<dyn LlmProvider>>,
}

impl AppState {
    /// Build the state described by a loaded configuration
    pub fn from_config(config_service: ConfigService) -> AppResult<Self> {
        let config = config_service.get_config().clone();

        let database = match &config.database_path {
            Some(path) => Database::open(path)?,
            None => Database::new()?,
        };
        let store = Arc::new(SqliteInterviewStore::new(database.pool().clone()));
        let provider = resolve_provider(&config.llm);

        Ok(Self {
            database: Some(database),
            config: Some(Arc::new(RwLock::new(config_service))),
            engine: InterviewEngine::standard(store),
            provider,
        })
    }

    /// Load the default config file and build the state from it
    pub fn initialize() -> AppResult<Self> {
        Self::from_config(ConfigService::new()?)
    }

    /// State over an in-memory SQLite database, with no provider and no config file
    pub fn in_memory() -> AppResult<Self> {
        let database = Database::new_in_memory()?;
        let store = Arc::new(SqliteInterviewStore::new(database.pool().clone()));
        Ok(Self {
            database: Some(database),
            config: None,
            engine: InterviewEngine::standard(store),
            provider: None,
        })
    }

    /// State over an arbitrary store
    pub fn with_store(store: Arc<dyn InterviewStore>) -> Self {
        Self {
            database: None,
            config: None,
            engine: InterviewEngine::standard(store),
            provider: None,
        }
    }

    /// Replace the text-generation provider
    pub fn with_provider(mut self, provider: Arc<dyn LlmProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn engine(&self) -> &InterviewEngine {
        &self.engine
    }

    pub fn provider(&self) -> Option<&dyn LlmProvider> {
        self.provider.as_deref()
    }

    /// Check if database is healthy
    pub fn is_database_healthy(&self) -> bool {
        self.database.as_ref().is_some_and(Database::is_healthy)
    }

    /// Get the current configuration
    pub async fn get_config(&self) -> AppResult<AppConfig> {
        match &self.config {
            Some(config) => Ok(config.read().await.get_config().clone()),
            None => Err(AppError::config("Config service not initialized")),
        }
    }

    /// Update the configuration. Provider changes take effect on the next start.
    pub async fn update_config(&self, update: SettingsUpdate) -> AppResult<AppConfig> {
        match &self.config {
            Some(config) => config.write().await.update_config(update),
            None => Err(AppError::config("Config service not initialized")),
        }
    }

    /// Reset the configuration file to defaults
    pub async fn reset_config(&self) -> AppResult<AppConfig> {
        match &self.config {
            Some(config) => {
                let mut guard = config.write().await;
                guard.reset()?;
                Ok(guard.get_config().clone())
            }
            None => Err(AppError::config("Config service not initialized")),
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("database", &self.database.is_some())
            .field("config", &self.config.is_some())
            .field("provider", &self.provider.as_ref().map(|p| p.name()))
            .finish()
    }
}

/// Build a provider from settings, or `None` when generation is disabled or unconfigured
fn resolve_provider(settings: &LlmSettings) -> Option<Arc<dyn LlmProvider>> {
    if !settings.enabled {
        info!("text generation disabled; questions and documents use fallbacks");
        return None;
    }

    let api_key = std::env::var(&settings.api_key_env)
        .ok()
        .filter(|key| !key.trim().is_empty());
    let Some(api_key) = api_key else {
        info!(
            env = %settings.api_key_env,
            "no API key in environment; questions and documents use fallbacks"
        );
        return None;
    };

    match create_provider(settings.to_provider_config(Some(api_key))) {
        Ok(provider) => {
            info!(provider = provider.name(), model = provider.model(), "text generation enabled");
            Some(provider)
        }
        Err(e) => {
            warn!(error = %e, "failed to create text-generation provider; using fallbacks");
            None
        }
    }
}
