/*!
 * Provider implementations for the AI rewrite capability.
 *
 * This module contains client implementations for various LLM providers:
 * - Gemini: Google Generative Language API
 * - Ollama: Local LLM server
 * - Anthropic: Anthropic API integration
 * - Mock: scripted responses for tests
 */

use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;

use crate::app_config::{ProviderKind, ProvidersConfig};
use crate::errors::{ConfigError, ProviderError};

/// Common trait for all LLM providers
///
/// A provider turns one text prompt into one text response. Providers do not
/// retry; throttling is reported as `ProviderError::RateLimitExceeded` so the
/// caller's retry policy can decide.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Complete a prompt and return the generated text
    async fn complete(&self, prompt: &str) -> Result<String, ProviderError>;

    /// Test the connection to the provider
    async fn test_connection(&self) -> Result<(), ProviderError>;

    /// Display name used in logs
    fn name(&self) -> &str;
}

/// Build the configured provider
pub fn from_config(config: &ProvidersConfig, temperature: f32) -> Result<Arc<dyn Provider>, ConfigError> {
    let settings = config.active();
    let timeout = std::time::Duration::from_secs(settings.timeout_secs.max(1));

    let provider: Arc<dyn Provider> = match config.provider {
        ProviderKind::Gemini => Arc::new(gemini::Gemini::new(
            config.api_key(),
            config.endpoint(),
            config.model(),
            temperature,
            timeout,
        )),
        ProviderKind::Ollama => Arc::new(ollama::Ollama::from_endpoint(
            &config.endpoint(),
            config.model(),
            temperature,
            timeout,
        )?),
        ProviderKind::Anthropic => Arc::new(anthropic::Anthropic::new(
            config.api_key(),
            config.endpoint(),
            config.model(),
            temperature,
            timeout,
        )),
    };

    Ok(provider)
}

/// Map a reqwest transport failure onto a provider error.
///
/// The request URL is dropped from the message.
pub(crate) fn transport_error(provider: &str, error: reqwest::Error) -> ProviderError {
    let error = error.without_url();
    if error.is_timeout() {
        ProviderError::ConnectionError(format!("{} request timed out: {}", provider, error))
    } else if error.is_connect() {
        ProviderError::ConnectionError(format!("Failed to connect to {}: {}", provider, error))
    } else {
        ProviderError::RequestFailed(format!("{} request failed: {}", provider, error))
    }
}

/// Turn a non-success HTTP response into a provider error
pub(crate) async fn status_error(provider: &str, response: reqwest::Response) -> ProviderError {
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Failed to get error response text".to_string());
    log::error!("{} API error ({}): {}", provider, status, body);
    ProviderError::from_status(status.as_u16(), body)
}

pub mod anthropic;
pub mod gemini;
pub mod mock;
pub mod ollama;
