//! Merge retry policy

use std::time::Duration;

use graft_config::LoaderConfig;
use graft_core::StoreError;

/// Retries transient store failures with linear backoff
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Delay before retry `n` is `backoff * n`
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, backoff: Duration) -> Self {
        Self {
            max_retries,
            backoff,
        }
    }

    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    pub fn from_config(config: &LoaderConfig) -> Self {
        Self::new(
            config.merge_retries,
            Duration::from_millis(config.retry_backoff_ms),
        )
    }

    /// Whether `error` after `retries_done` retries warrants another attempt
    pub fn should_retry(&self, error: &StoreError, retries_done: u32) -> bool {
        error.is_transient() && retries_done < self.max_retries
    }

    /// Delay before the `retry`-th retry (1-based)
    pub fn delay(&self, retry: u32) -> Duration {
        self.backoff.saturating_mul(retry)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&LoaderConfig::default())
    }
}
