/*!
 * Mock provider implementations for testing.
 *
 * This module provides mock providers that simulate different behaviors:
 * - `MockProvider::echo()` - Returns every target line unchanged
 * - `MockProvider::scripted(..)` - Plays back queued responses in order
 * - `MockProvider::failing()` - Always fails with a non-retryable error
 * - `MockProvider::rate_limited()` - Always reports throttling
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::correction::protocol::TARGET_MARKER;
use crate::errors::ProviderError;
use crate::providers::Provider;

/// Behavior mode for the mock provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Echoes target lines back as `index: text`
    Echo,
    /// Pops queued responses, echoing once the queue is drained
    Scripted,
    /// Fails intermittently (every Nth request) with a server error
    Intermittent { fail_every: usize },
    /// Always fails with a non-retryable error
    Failing,
    /// Always fails with a rate-limit error
    RateLimited,
    /// Returns an empty response
    Empty,
    /// Simulates slow response (for cancellation and timeout testing)
    Slow { delay_ms: u64 },
}

/// Mock provider for testing correction behavior
#[derive(Debug)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Request counter, shared between clones
    request_count: Arc<AtomicUsize>,
    /// Prompts received, in call order
    prompts: Arc<Mutex<Vec<String>>>,
    /// Queued responses for `Scripted`
    script: Arc<Mutex<VecDeque<Result<String, ProviderError>>>>,
    /// Custom response generator (optional)
    custom_response: Option<fn(&str) -> String>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            prompts: Arc::new(Mutex::new(Vec::new())),
            script: Arc::new(Mutex::new(VecDeque::new())),
            custom_response: None,
        }
    }

    /// Create a mock that returns target lines unchanged
    pub fn echo() -> Self {
        Self::new(MockBehavior::Echo)
    }

    /// Create a mock that plays back `responses` in order
    pub fn scripted(responses: impl IntoIterator<Item = Result<String, ProviderError>>) -> Self {
        let provider = Self::new(MockBehavior::Scripted);
        provider.script.lock().extend(responses);
        provider
    }

    /// Create an intermittently failing mock provider
    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent { fail_every: fail_every.max(1) })
    }

    /// Create a failing mock provider that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock that is always throttled
    pub fn rate_limited() -> Self {
        Self::new(MockBehavior::RateLimited)
    }

    /// Create a mock that returns empty responses
    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    /// Create a mock that waits before echoing
    pub fn slow(delay_ms: u64) -> Self {
        Self::new(MockBehavior::Slow { delay_ms })
    }

    /// Set a custom response generator, used instead of echoing
    pub fn with_custom_response(mut self, generator: fn(&str) -> String) -> Self {
        self.custom_response = Some(generator);
        self
    }

    /// Number of `complete` calls so far, across clones
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Prompts received so far, across clones
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }

    /// Rewrite every `[CORRECT] N: text` line of a prompt as `N: text`
    pub fn echo_targets(prompt: &str) -> String {
        prompt
            .lines()
            .filter_map(|line| line.trim_start().strip_prefix(TARGET_MARKER))
            .map(str::trim_start)
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn success_text(&self, prompt: &str) -> String {
        match self.custom_response {
            Some(generator) => generator(prompt),
            None => Self::echo_targets(prompt),
        }
    }
}

impl Clone for MockProvider {
    fn clone(&self) -> Self {
        Self {
            behavior: self.behavior,
            request_count: Arc::clone(&self.request_count),
            prompts: Arc::clone(&self.prompts),
            script: Arc::clone(&self.script),
            custom_response: self.custom_response,
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().push(prompt.to_string());

        match self.behavior {
            MockBehavior::Echo => Ok(self.success_text(prompt)),

            MockBehavior::Scripted => {
                let next = self.script.lock().pop_front();
                next.unwrap_or_else(|| Ok(self.success_text(prompt)))
            }

            MockBehavior::Intermittent { fail_every } => {
                if count % fail_every == fail_every - 1 {
                    Err(ProviderError::ApiError {
                        message: format!("Simulated intermittent failure (request #{})", count + 1),
                        status_code: 503,
                    })
                } else {
                    Ok(self.success_text(prompt))
                }
            }

            MockBehavior::Failing => Err(ProviderError::ApiError {
                message: "Simulated provider failure".to_string(),
                status_code: 500,
            }),

            MockBehavior::RateLimited => Err(ProviderError::RateLimitExceeded(
                "Simulated quota exhaustion".to_string(),
            )),

            MockBehavior::Empty => Ok(String::new()),

            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(tokio::time::Duration::from_millis(delay_ms)).await;
                Ok(self.success_text(prompt))
            }
        }
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        match self.behavior {
            MockBehavior::Failing => Err(ProviderError::ConnectionError("Simulated outage".to_string())),
            _ => Ok(()),
        }
    }

    fn name(&self) -> &str {
        "Mock"
    }
}
