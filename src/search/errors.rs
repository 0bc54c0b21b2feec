//! Error types for index operations
//!
//! This module defines tantivy-specific error types with retry metadata
//! for the index store and the query resolver.

use std::time::Duration;
use tantivy::TantivyError;
use thiserror::Error;

use super::schema::SchemaError;

/// Result type alias for index operations
pub type SearchResult<T> = Result<T, SearchError>;

/// Error types for index operations
#[derive(Debug, Error)]
pub enum SearchError {
    /// Index could not be opened or created at the configured location
    #[error("Failed to open or create search index: {0}")]
    IndexOpen(String),

    /// Existing index does not carry the expected comic schema
    #[error("Incompatible index schema: {0}")]
    Schema(#[from] SchemaError),

    /// Search execution failed
    #[error("Search execution failed: {0}")]
    SearchExecution(String),

    /// Building a single document failed
    #[error("Indexing failed for comic {num}: {message}")]
    IndexingFailed { num: u32, message: String },

    /// Index writer acquisition failed (transient)
    #[error("Failed to acquire index writer (retry recommended): {0}")]
    WriterAcquisition(String),

    /// Index commit failed
    #[error("Failed to commit index changes: {0}")]
    CommitFailed(String),

    /// Top hit lacks a stored field every comic document must carry
    #[error("No {field} stored for comic {num}")]
    MissingField { field: &'static str, num: u64 },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Tantivy error wrapper
    #[error("Tantivy error: {0}")]
    Tantivy(#[from] TantivyError),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl SearchError {
    /// Check if error is transient and should be retried
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            SearchError::WriterAcquisition(_) | SearchError::Io(_)
        )
    }
}

/// Retry configuration for index writer acquisition
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts
    pub max_attempts: u32,
    /// Initial retry delay
    pub initial_delay: Duration,
    /// Backoff multiplier for exponential backoff
    pub backoff_multiplier: f64,
    /// Maximum retry delay
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(100),
            backoff_multiplier: 2.0,
            max_delay: Duration::from_secs(5),
        }
    }
}

impl RetryConfig {
    /// Calculate delay for given attempt number (0-based)
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let multiplier = self.backoff_multiplier.powi(attempt as i32);
        let delay_ms = (self.initial_delay.as_millis() as f64 * multiplier) as u64;
        Duration::from_millis(delay_ms).min(self.max_delay)
    }
}
