/*!
 * Retry policy, sleep abstraction and cancellation for AI calls.
 *
 * The engine never calls `tokio::time::sleep` directly; it goes through a
 * `Sleeper` so tests can observe delays without waiting for them.
 */

use std::fmt::Debug;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use log::warn;
use parking_lot::Mutex;

use crate::errors::ProviderError;
use crate::providers::Provider;

/// How rate-limited calls are retried
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts including the first call
    pub max_attempts: u32,
    /// Delay before the first retry
    pub initial_backoff: Duration,
    /// Factor applied to the delay after each retry
    pub multiplier: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_secs(5),
            multiplier: 2,
        }
    }
}

impl RetryPolicy {
    /// Delay to wait before retry number `retry` (1-based)
    pub fn backoff_for(&self, retry: u32) -> Duration {
        let factor = self.multiplier.saturating_pow(retry.saturating_sub(1));
        self.initial_backoff.saturating_mul(factor)
    }
}

/// Source of delays
#[async_trait]
pub trait Sleeper: Send + Sync + Debug {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Returns immediately and remembers every requested delay
#[derive(Debug, Default, Clone)]
pub struct RecordingSleeper {
    slept: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delays requested so far, in order
    pub fn recorded(&self) -> Vec<Duration> {
        self.slept.lock().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.slept.lock().push(duration);
    }
}

/// Shared flag checked between batches
#[derive(Debug, Default, Clone)]
pub struct CancellationFlag {
    cancelled: Arc<AtomicBool>,
}

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Failure of a retried call, with the number of attempts made
#[derive(Debug, Clone, PartialEq)]
pub struct RetryFailure {
    pub attempts: u32,
    pub error: ProviderError,
}

/// Call the provider, retrying only rate-limit failures with exponential backoff.
///
/// Returns the response text and the number of attempts it took.
pub async fn complete_with_retry(
    provider: &dyn Provider,
    prompt: &str,
    policy: &RetryPolicy,
    sleeper: &dyn Sleeper,
) -> Result<(String, u32), RetryFailure> {
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;
        match provider.complete(prompt).await {
            Ok(text) => return Ok((text, attempt)),
            Err(error) if error.is_rate_limit() && attempt < max_attempts => {
                let delay = policy.backoff_for(attempt);
                warn!(
                    "{} rate limited (attempt {}/{}), retrying in {:?}",
                    provider.name(),
                    attempt,
                    max_attempts,
                    delay
                );
                sleeper.sleep(delay).await;
            }
            Err(error) => return Err(RetryFailure { attempts: attempt, error }),
        }
    }
}
