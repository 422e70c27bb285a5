//! Bounded retry for transactional operations.
//!
//! An operation is re-run from scratch (read-modify-write included) while the
//! predicate classifies its error as retryable, up to `max_attempts` runs in
//! total. There is no delay between attempts.

use crate::utils::error::AppError;
use std::fmt::Display;
use std::future::Future;

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total number of runs, the first one included
    pub max_attempts: usize,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: 3 }
    }
}

impl RetryPolicy {
    pub const fn new(max_attempts: usize) -> Self {
        Self { max_attempts }
    }
}

#[derive(Debug)]
pub enum RetryError<E> {
    /// Every attempt failed with a retryable error
    Exhausted { attempts: usize, last: E },
    /// A non-retryable error ended the loop early
    Aborted(E),
}

impl RetryError<AppError> {
    /// Exhausted retries become a Conflict naming the action; an aborting
    /// error is passed through unchanged.
    pub fn into_app_error(self, action: &str) -> AppError {
        match self {
            RetryError::Exhausted { attempts, .. } => {
                AppError::Conflict(format!("{} failed after {} attempts.", action, attempts))
            }
            RetryError::Aborted(err) => err,
        }
    }
}

pub async fn retry_when<F, Fut, T, E, P>(
    policy: RetryPolicy,
    should_retry: P,
    mut operation: F,
) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
    E: Display,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;
        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    tracing::info!(attempt, "operation succeeded after retry");
                }
                return Ok(value);
            }
            Err(err) if should_retry(&err) => {
                if attempt >= max_attempts {
                    tracing::warn!(attempt, error = %err, "retries exhausted");
                    return Err(RetryError::Exhausted {
                        attempts: attempt,
                        last: err,
                    });
                }
                tracing::warn!(attempt, max_attempts, error = %err, "retryable failure, retrying");
            }
            Err(err) => return Err(RetryError::Aborted(err)),
        }
    }
}
