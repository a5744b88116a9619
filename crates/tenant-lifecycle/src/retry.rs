//! Retry with exponential backoff for idempotent saga steps.
//!
//! Only steps that are safe to repeat go through here: metadata updates
//! keyed by an immutable id, and deletes where `NotFound` counts as done.
//!
//! # Example
//!
//! ```rust,no_run
//! use tenant_lifecycle::retry::{retry_step, RetryConfig};
//! use tenant_org::StoreError;
//!
//! async fn example() -> Result<(), StoreError> {
//!     let config = RetryConfig::default();
//!
//!     retry_step("registry.rename", &config, StoreError::is_transient, || async {
//!         // An idempotent store call
//!         Ok(())
//!     })
//!     .await
//! }
//! ```

use std::time::Duration;
use tokio::time::sleep;

/// Configuration for retry behavior.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Total attempts, including the first
    pub max_attempts: u32,

    /// Delay before the second attempt
    pub initial_delay: Duration,

    /// Upper bound on any single delay
    pub max_delay: Duration,

    /// Multiplier applied to the delay after each failure
    pub exponential_base: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(5),
            exponential_base: 2.0,
        }
    }
}

impl RetryConfig {
    /// Default backoff with a custom attempt budget.
    pub fn with_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }

    /// Retry without waiting between attempts.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            exponential_base: 1.0,
        }
    }

    /// A single attempt.
    pub fn no_retry() -> Self {
        Self::immediate(1)
    }

    /// Delay to wait after the given failed attempt (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = self.exponential_base.powi(attempt.saturating_sub(1) as i32);
        let secs = (self.initial_delay.as_secs_f64() * factor).min(self.max_delay.as_secs_f64());
        Duration::from_secs_f64(secs.max(0.0))
    }
}

/// Run a saga step, retrying while `is_retryable` holds.
///
/// # Arguments
///
/// * `step` - Step name for logs
/// * `config` - Retry budget and backoff
/// * `is_retryable` - Which errors may clear up on another attempt
/// * `f` - Produces one attempt; must be idempotent
///
/// # Returns
///
/// The first success, the first non-retryable error, or the last error
/// once the budget is spent
pub async fn retry_step<F, Fut, T, E, P>(
    step: &'static str,
    config: &RetryConfig,
    is_retryable: P,
    mut f: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    P: Fn(&E) -> bool,
{
    let mut attempt = 0;

    loop {
        attempt += 1;

        match f().await {
            Ok(result) => {
                if attempt > 1 {
                    tracing::info!(step, attempts = attempt, "Step succeeded after retry");
                }
                return Ok(result);
            }
            Err(e) if !is_retryable(&e) => return Err(e),
            Err(e) if attempt >= config.max_attempts => {
                tracing::warn!(
                    step,
                    attempts = attempt,
                    error = %e,
                    "Step retries exhausted"
                );
                return Err(e);
            }
            Err(e) => {
                let delay = config.delay_after(attempt);
                tracing::warn!(
                    step,
                    attempt,
                    max_attempts = config.max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Step failed, retrying"
                );
                sleep(delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use tenant_org::StoreError;

    #[test]
    fn test_retry_config_default() {
        let config = RetryConfig::default();
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.initial_delay, Duration::from_millis(100));
        assert_eq!(config.exponential_base, 2.0);
    }

    #[test]
    fn test_attempts_never_zero() {
        assert_eq!(RetryConfig::with_attempts(0).max_attempts, 1);
        assert_eq!(RetryConfig::immediate(0).max_attempts, 1);
        assert_eq!(RetryConfig::no_retry().max_attempts, 1);
    }

    #[test]
    fn test_backoff_is_capped() {
        let config = RetryConfig {
            max_attempts: 10,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(350),
            exponential_base: 2.0,
        };

        assert_eq!(config.delay_after(1), Duration::from_millis(100));
        assert_eq!(config.delay_after(2), Duration::from_millis(200));
        assert_eq!(config.delay_after(3), Duration::from_millis(350));
        assert_eq!(config.delay_after(8), Duration::from_millis(350));
        assert_eq!(RetryConfig::immediate(3).delay_after(2), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_transient_errors_are_retried() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = retry_step(
            "registry.rename",
            &RetryConfig::immediate(3),
            StoreError::is_transient,
            || {
                let counter = counter_clone.clone();
                async move {
                    if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                        Err(StoreError::Timeout("registry.rename".into()))
                    } else {
                        Ok(7)
                    }
                }
            },
        )
        .await;

        assert_eq!(result, Ok(7));
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_budget_exhausted() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result: Result<(), StoreError> = retry_step(
            "registry.rename",
            &RetryConfig::immediate(2),
            StoreError::is_transient,
            || {
                let counter = counter_clone.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(StoreError::Unavailable("down".into()))
                }
            },
        )
        .await;

        assert_eq!(result, Err(StoreError::Unavailable("down".into())));
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_permanent_error_returns_immediately() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result: Result<(), StoreError> = retry_step(
            "registry.rename",
            &RetryConfig::immediate(5),
            StoreError::is_transient,
            || {
                let counter = counter_clone.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(StoreError::duplicate("organization", "organization_name", "Acme"))
                }
            },
        )
        .await;

        assert!(result.unwrap_err().is_duplicate());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
