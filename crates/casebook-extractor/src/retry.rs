//! Bounded retry with exponential backoff

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

/// Retry budget shared by model calls and mail delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: usize,
    initial_backoff: Duration,
    max_backoff: Duration,
}

/// An operation that failed on its last permitted attempt
#[derive(Debug, Clone, PartialEq)]
pub struct RetryFailure<E> {
    /// Error from the final attempt
    pub error: E,

    /// Attempts made, including the first
    pub attempts: usize,
}

impl RetryPolicy {
    /// Create a policy allowing `max_retries` retries after the first attempt
    pub fn new(max_retries: usize, initial_backoff_ms: u64, max_backoff_ms: u64) -> Self {
        Self {
            max_retries,
            initial_backoff: Duration::from_millis(initial_backoff_ms),
            max_backoff: Duration::from_millis(max_backoff_ms.max(initial_backoff_ms)),
        }
    }

    /// Retries allowed after the first attempt
    pub fn max_retries(&self) -> usize {
        self.max_retries
    }

    /// Delay before retry number `retry` (1-based), doubling up to the cap
    pub fn backoff_for(&self, retry: usize) -> Duration {
        let mut backoff = self.initial_backoff;
        for _ in 1..retry {
            backoff = std::cmp::min(backoff.saturating_mul(2), self.max_backoff);
        }
        backoff
    }

    /// Retry a future with exponential backoff
    pub async fn retry<F, Fut, T, E>(
        &self,
        operation_name: &str,
        f: F,
    ) -> Result<T, RetryFailure<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        self.retry_if(operation_name, |_| true, f).await
    }

    /// Retry while `should_retry` accepts the error
    ///
    /// An error the predicate rejects is returned at once.
    pub async fn retry_if<F, Fut, T, E, P>(
        &self,
        operation_name: &str,
        should_retry: P,
        mut f: F,
    ) -> Result<T, RetryFailure<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
        P: Fn(&E) -> bool,
    {
        let mut attempt = 0;

        loop {
            match f().await {
                Ok(result) => {
                    if attempt > 0 {
                        info!(
                            operation = operation_name,
                            attempts = attempt + 1,
                            "Operation succeeded after retries"
                        );
                    }
                    return Ok(result);
                }
                Err(e) => {
                    attempt += 1;
                    if !should_retry(&e) {
                        warn!(
                            operation = operation_name,
                            attempts = attempt,
                            error = %e,
                            "Operation failed with a permanent error"
                        );
                        return Err(RetryFailure { error: e, attempts: attempt });
                    }
                    if attempt > self.max_retries {
                        warn!(
                            operation = operation_name,
                            attempts = attempt,
                            error = %e,
                            "Operation failed after max retries"
                        );
                        return Err(RetryFailure { error: e, attempts: attempt });
                    }

                    let backoff = self.backoff_for(attempt);
                    warn!(
                        operation = operation_name,
                        attempt = attempt,
                        max_retries = self.max_retries,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %e,
                        "Operation failed, retrying"
                    );

                    sleep(backoff).await;
                }
            }
        }
    }
}
