//! Core configuration types for the xkcd index
//!
//! This module contains the `XkcdConfig` struct and the error raised when a
//! builder is given values the rest of the crate cannot work with.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::utils::{
    DEFAULT_BASE_URL, DEFAULT_RATE_INTERVAL, DEFAULT_REQUEST_TIMEOUT,
    DEFAULT_WRITER_MEMORY_BYTES, INDEX_DIR_NAME,
};

/// Main configuration struct for index updates and searches
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct XkcdConfig {
    /// Directory holding the on-disk index
    pub(crate) index_dir: PathBuf,
    /// Minimum spacing between two outbound metadata requests
    pub(crate) rate_interval: Duration,
    /// Optional cap on concurrently running fetches; `None` means unbounded
    pub(crate) max_in_flight: Option<usize>,
    /// Root of the xkcd JSON API, without trailing slash
    pub(crate) base_url: String,
    pub(crate) request_timeout: Duration,
    /// Heap budget handed to the tantivy index writer
    pub(crate) writer_memory_bytes: usize,
}

impl Default for XkcdConfig {
    fn default() -> Self {
        Self {
            index_dir: default_index_dir(),
            rate_interval: DEFAULT_RATE_INTERVAL,
            max_in_flight: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            writer_memory_bytes: DEFAULT_WRITER_MEMORY_BYTES,
        }
    }
}

/// Per-user configuration directory joined with the index directory name.
///
/// Falls back to a directory relative to the working directory when the
/// platform has no notion of a config directory.
#[must_use]
pub fn default_index_dir() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join(INDEX_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(INDEX_DIR_NAME))
}

/// Rejected configuration values
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("Index writer memory must be at least {min} bytes, got {actual}")]
    WriterMemoryTooSmall { min: usize, actual: usize },

    #[error("max_in_flight must be greater than zero")]
    ZeroMaxInFlight,

    #[error("Index directory must not be empty")]
    EmptyIndexDir,
}
