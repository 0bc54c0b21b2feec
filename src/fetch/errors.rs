//! Error types for the fetch stage

use thiserror::Error;

use crate::client::FetchError;

/// Errors returned by [`RateLimiter::wait`](super::RateLimiter::wait)
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RateLimitError {
    /// The shared cancellation token fired before a token was granted
    #[error("rate limiter wait cancelled")]
    Cancelled,
}

/// Why a single comic could not be fetched
#[derive(Debug, Error)]
pub enum FailureReason {
    #[error(transparent)]
    RateLimit(#[from] RateLimitError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Cancelled while the request was in flight
    #[error("fetch cancelled")]
    Cancelled,

    #[error("fetch task panicked: {0}")]
    TaskPanicked(String),
}

/// Per-item failure recorded by the fetch pool. Never aborts the batch.
#[derive(Debug, Error)]
#[error("failed to get metadata for xkcd.com/{num}: {reason}")]
pub struct FetchFailure {
    pub num: u32,
    #[source]
    pub reason: FailureReason,
}

impl FetchFailure {
    /// True when the item was skipped because the update was cancelled
    #[must_use]
    pub fn is_cancellation(&self) -> bool {
        matches!(
            self.reason,
            FailureReason::Cancelled | FailureReason::RateLimit(RateLimitError::Cancelled)
        )
    }
}
