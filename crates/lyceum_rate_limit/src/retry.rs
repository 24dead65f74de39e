//! Deterministic exponential backoff for transient failures.

use lyceum_core::RetrySettings;
use std::future::Future;
use std::time::Duration;
use tokio_retry2::{Retry, RetryError};
use tracing::warn;

/// Exponential-backoff executor wrapping any asynchronous operation.
///
/// The delay before retry `n` (1-based) is
/// `min(initial_delay * factor^(n-1), max_delay)`. Backoff is deterministic,
/// with no jitter, so tests can assert exact timing; callers needing jitter
/// add it in their own delay computation.
///
/// # Examples
///
/// ```
/// use lyceum_rate_limit::RetryPolicy;
/// use std::time::Duration;
///
/// let policy = RetryPolicy {
///     max_retries: 3,
///     initial_delay: Duration::from_millis(100),
///     max_delay: Duration::from_secs(10),
///     factor: 2,
/// };
///
/// let delays: Vec<_> = policy.schedule().collect();
/// assert_eq!(delays, vec![
///     Duration::from_millis(100),
///     Duration::from_millis(200),
///     Duration::from_millis(400),
/// ]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries attempted after the initial call
    pub max_retries: usize,
    /// Delay before the first retry
    pub initial_delay: Duration,
    /// Upper bound on any single delay
    pub max_delay: Duration,
    /// Multiplier applied to the delay after each attempt
    pub factor: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(1_000),
            max_delay: Duration::from_millis(10_000),
            factor: 2,
        }
    }
}

impl RetryPolicy {
    /// Build a policy from loaded configuration.
    pub fn from_settings(settings: &RetrySettings) -> Self {
        Self {
            max_retries: settings.max_retries,
            initial_delay: Duration::from_millis(settings.initial_delay_ms),
            max_delay: Duration::from_millis(settings.max_delay_ms),
            factor: settings.factor,
        }
    }

    /// The inter-attempt delays this policy will use, in order.
    pub fn schedule(&self) -> BackoffSchedule {
        BackoffSchedule {
            next_delay: self.initial_delay,
            max_delay: self.max_delay,
            factor: self.factor,
            remaining: self.max_retries,
        }
    }

    /// Execute `operation`, retrying every error until the schedule is
    /// exhausted.
    ///
    /// The final error is returned unchanged once `max_retries` retries have
    /// failed.
    pub async fn run<F, Fut, T, E>(&self, operation: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        self.run_if(operation, |_| true).await
    }

    /// Execute `operation`, retrying only errors for which `should_retry`
    /// returns true.
    ///
    /// Errors rejected by the predicate are rethrown immediately without
    /// waiting out a delay.
    pub async fn run_if<F, Fut, T, E, P>(&self, mut operation: F, should_retry: P) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: Fn(&E) -> bool,
        E: std::fmt::Display,
    {
        let should_retry = &should_retry;
        Retry::spawn(self.schedule(), move || {
            let attempt = operation();
            async move {
                match attempt.await {
                    Ok(value) => Ok(value),
                    Err(e) => {
                        if should_retry(&e) {
                            warn!("Transient error, will retry: {}", e);
                            Err(RetryError::Transient {
                                err: e,
                                retry_after: None,
                            })
                        } else {
                            warn!("Permanent error, failing immediately: {}", e);
                            Err(RetryError::Permanent(e))
                        }
                    }
                }
            }
        })
        .await
    }
}

/// Iterator over a [`RetryPolicy`]'s inter-attempt delays.
#[derive(Debug, Clone)]
pub struct BackoffSchedule {
    next_delay: Duration,
    max_delay: Duration,
    factor: u32,
    remaining: usize,
}

impl Iterator for BackoffSchedule {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let delay = self.next_delay.min(self.max_delay);
        self.next_delay = self
            .next_delay
            .saturating_mul(self.factor)
            .min(self.max_delay);
        Some(delay)
    }
}
