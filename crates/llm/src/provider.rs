//! LLM Provider Trait
//!
//! Defines the common interface for all LLM providers.

use async_trait::async_trait;

use super::types::{LlmError, LlmRequestOptions, LlmResponse, LlmResult, Message, ProviderConfig};

/// Trait that all LLM providers must implement.
///
/// Provides a unified interface for:
/// - Single message completions (send_message)
/// - One-shot prompt completion (generate_text)
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Returns the provider name for identification.
    fn name(&self) -> &'static str;

    /// Returns the current model being used.
    fn model(&self) -> &str;

    /// Get the configuration for this provider.
    fn config(&self) -> &ProviderConfig;

    /// Send a message and get a complete response.
    ///
    /// # Arguments
    /// * `messages` - Conversation history
    /// * `system` - Optional system prompt
    /// * `request_options` - Per-request overrides
    async fn send_message(
        &self,
        messages: Vec<Message>,
        system: Option<String>,
        request_options: LlmRequestOptions,
    ) -> LlmResult<LlmResponse>;

    /// Send a single user prompt and return the text of the reply.
    ///
    /// An empty or missing text body is reported as a parse error so callers
    /// can treat it the same as any other unusable output.
    async fn generate_text(&self, prompt: &str) -> LlmResult<String> {
        let response = self
            .send_message(vec![Message::user(prompt)], None, LlmRequestOptions::default())
            .await?;
        tracing::debug!(
            provider = self.name(),
            model = %response.model,
            output_tokens = response.usage.output_tokens,
            "text generation finished"
        );
        match response.content {
            Some(text) if !text.trim().is_empty() => Ok(text),
            _ => Err(LlmError::ParseError {
                message: format!("{} returned an empty response", self.name()),
            }),
        }
    }
}

/// Helper function to create an error for missing API key
pub fn missing_api_key_error(provider: &str) -> LlmError {
    LlmError::AuthenticationFailed {
        message: format!("API key not configured for {}", provider),
    }
}

/// Helper function to parse HTTP error status codes
pub fn parse_http_error(status: u16, body: &str, provider: &str) -> LlmError {
    match status {
        401 => LlmError::AuthenticationFailed {
            message: format!("{}: Invalid API key", provider),
        },
        403 => LlmError::AuthenticationFailed {
            message: format!("{}: Access denied", provider),
        },
        404 => LlmError::ModelNotFound {
            model: body.to_string(),
        },
        429 => LlmError::RateLimited {
            message: body.to_string(),
            retry_after: None,
        },
        400 => LlmError::InvalidRequest {
            message: body.to_string(),
        },
        500..=599 => LlmError::ServerError {
            message: body.to_string(),
            status: Some(status),
        },
        _ => LlmError::Other {
            message: format!("HTTP {}: {}", status, body),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{StopReason, UsageStats};

    struct FixedProvider {
        config: ProviderConfig,
        reply: Option<String>,
    }

    #[async_trait]
    impl LlmProvider for FixedProvider {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn model(&self) -> &str {
            &self.config.model
        }

        fn config(&self) -> &ProviderConfig {
            &self.config
        }

        async fn send_message(
            &self,
            messages: Vec<Message>,
            _system: Option<String>,
            _request_options: LlmRequestOptions,
        ) -> LlmResult<LlmResponse> {
            assert_eq!(messages.len(), 1);
            Ok(LlmResponse {
                content: self.reply.clone(),
                stop_reason: StopReason::EndTurn,
                usage: UsageStats::default(),
                model: self.config.model.clone(),
            })
        }
    }

    #[tokio::test]
    async fn test_generate_text_returns_content() {
        let provider = FixedProvider {
            config: ProviderConfig::default(),
            reply: Some("{\"ok\":true}".to_string()),
        };
        assert_eq!(provider.generate_text("hi").await.unwrap(), "{\"ok\":true}");
    }

    #[tokio::test]
    async fn test_generate_text_rejects_blank_content() {
        let provider = FixedProvider {
            config: ProviderConfig::default(),
            reply: Some("   ".to_string()),
        };
        let err = provider.generate_text("hi").await.unwrap_err();
        assert!(matches!(err, LlmError::ParseError { .. }));
    }

    #[test]
    fn test_missing_api_key_error() {
        let err = missing_api_key_error("anthropic");
        match err {
            LlmError::AuthenticationFailed { message } => {
                assert!(message.contains("anthropic"));
            }
            _ => panic!("Expected AuthenticationFailed"),
        }
    }

    #[test]
    fn test_parse_http_error() {
        let err = parse_http_error(401, "unauthorized", "openai");
        assert!(matches!(err, LlmError::AuthenticationFailed { .. }));

        let err = parse_http_error(429, "rate limited", "openai");
        assert!(matches!(err, LlmError::RateLimited { .. }));

        let err = parse_http_error(500, "internal error", "openai");
        assert!(matches!(err, LlmError::ServerError { .. }));

        let err = parse_http_error(418, "teapot", "openai");
        assert!(matches!(err, LlmError::Other { .. }));
    }
}
