//! RFP Forge LLM
//!
//! Provides a unified text-generation interface over hosted LLM providers:
//! - Anthropic Claude (Messages API)
//! - OpenAI-compatible chat completions
//!
//! The interview engine only needs `LlmProvider::generate_text`; everything
//! else here exists to build that call and map provider failures onto `LlmError`.

pub mod anthropic;
pub mod http_client;
pub mod openai;
pub mod provider;
pub mod types;

use std::sync::Arc;

// Re-export main types
pub use anthropic::AnthropicProvider;
pub use http_client::build_http_client;
pub use openai::OpenAIProvider;
pub use provider::LlmProvider;
pub use types::*;

/// Build the provider selected by `config.provider`.
pub fn create_provider(config: ProviderConfig) -> LlmResult<Arc<dyn LlmProvider>> {
    let provider: Arc<dyn LlmProvider> = match config.provider {
        ProviderType::Anthropic => Arc::new(AnthropicProvider::new(config)?),
        ProviderType::OpenAI => Arc::new(OpenAIProvider::new(config)?),
    };
    Ok(provider)
}
