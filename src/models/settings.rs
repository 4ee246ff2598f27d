//! Settings Models
//!
//! Application configuration stored in config.json.

use rfp_forge_llm::{ProviderConfig, ProviderType};
use serde::{Deserialize, Serialize};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Text-generation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    /// When false, every question and document uses the deterministic fallback
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub provider: ProviderType,
    pub model: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Upper bound on a single generation request
    pub timeout_secs: u64,
}

fn default_true() -> bool {
    true
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            provider: ProviderType::Anthropic,
            model: "claude-sonnet-4-20250514".to_string(),
            api_key_env: "ANTHROPIC_API_KEY".to_string(),
            base_url: None,
            max_tokens: 4096,
            temperature: 0.7,
            timeout_secs: 60,
        }
    }
}

impl LlmSettings {
    /// Build a provider config, attaching the resolved API key
    pub fn to_provider_config(&self, api_key: Option<String>) -> ProviderConfig {
        ProviderConfig {
            provider: self.provider,
            api_key,
            base_url: self.base_url.clone(),
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            timeout_secs: Some(self.timeout_secs),
        }
    }
}

/// Application configuration stored in config.json
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub llm: LlmSettings,
    /// Database file override; defaults to ~/.rfp-forge/data.db
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_path: Option<String>,
    /// Default tracing level when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            llm: LlmSettings::default(),
            database_path: None,
            log_level: default_log_level(),
        }
    }
}

/// Settings update request (partial update)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SettingsUpdate {
    pub llm_enabled: Option<bool>,
    pub provider: Option<ProviderType>,
    pub model: Option<String>,
    pub api_key_env: Option<String>,
    pub timeout_secs: Option<u64>,
    pub database_path: Option<String>,
    pub log_level: Option<String>,
}

impl AppConfig {
    /// Apply a partial update to the configuration
    pub fn apply_update(&mut self, update: SettingsUpdate) {
        if let Some(enabled) = update.llm_enabled {
            self.llm.enabled = enabled;
        }
        if let Some(provider) = update.provider {
            self.llm.provider = provider;
        }
        if let Some(model) = update.model {
            self.llm.model = model;
        }
        if let Some(api_key_env) = update.api_key_env {
            self.llm.api_key_env = api_key_env;
        }
        if let Some(timeout) = update.timeout_secs {
            self.llm.timeout_secs = timeout;
        }
        if let Some(path) = update.database_path {
            self.database_path = Some(path);
        }
        if let Some(level) = update.log_level {
            self.log_level = level;
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if !LOG_LEVELS.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level: {}. Must be one of {}",
                self.log_level,
                LOG_LEVELS.join(", ")
            ));
        }

        if self.llm.model.trim().is_empty() {
            return Err("llm.model must not be empty".to_string());
        }

        if self.llm.api_key_env.trim().is_empty() {
            return Err("llm.api_key_env must not be empty".to_string());
        }

        if self.llm.max_tokens == 0 {
            return Err("llm.max_tokens must be positive".to_string());
        }

        if !(0.0..=1.0).contains(&self.llm.temperature) {
            return Err(format!(
                "llm.temperature must be between 0.0 and 1.0, got {}",
                self.llm.temperature
            ));
        }

        if self.llm.timeout_secs == 0 || self.llm.timeout_secs > 600 {
            return Err("llm.timeout_secs must be between 1 and 600".to_string());
        }

        Ok(())
    }
}
