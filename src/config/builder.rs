//! Fluent builder for `XkcdConfig`
//!
//! Every field has a default, so the builder carries no type state: setters
//! can be called in any order and `build()` performs all validation at once.

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use super::types::{ConfigError, XkcdConfig};
use crate::utils::MIN_WRITER_MEMORY_BYTES;

#[derive(Debug, Clone, Default)]
pub struct XkcdConfigBuilder {
    pub(crate) index_dir: Option<PathBuf>,
    pub(crate) rate_interval: Option<Duration>,
    pub(crate) max_in_flight: Option<usize>,
    pub(crate) base_url: Option<String>,
    pub(crate) request_timeout: Option<Duration>,
    pub(crate) writer_memory_bytes: Option<usize>,
}

impl XkcdConfig {
    /// Create a builder for configuring an `XkcdConfig` with a fluent interface
    #[must_use]
    pub fn builder() -> XkcdConfigBuilder {
        XkcdConfigBuilder::default()
    }
}

impl XkcdConfigBuilder {
    /// Directory holding the on-disk index (created on first update)
    #[must_use]
    pub fn index_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.index_dir = Some(dir.into());
        self
    }

    /// Minimum spacing between two outbound requests.
    ///
    /// `Duration::ZERO` disables throttling.
    #[must_use]
    pub fn rate_interval(mut self, interval: Duration) -> Self {
        self.rate_interval = Some(interval);
        self
    }

    #[must_use]
    pub fn max_in_flight(mut self, max: Option<usize>) -> Self {
        self.max_in_flight = max;
        self
    }

    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn writer_memory_bytes(mut self, bytes: usize) -> Self {
        self.writer_memory_bytes = Some(bytes);
        self
    }

    /// Build the configuration, filling unset fields with defaults.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the base URL is not an absolute
    /// http(s) URL, the writer memory is below tantivy's floor, the index
    /// directory is empty or `max_in_flight` is zero.
    pub fn build(self) -> Result<XkcdConfig, ConfigError> {
        let defaults = XkcdConfig::default();

        let index_dir = self.index_dir.unwrap_or(defaults.index_dir);
        if index_dir.as_os_str().is_empty() {
            return Err(ConfigError::EmptyIndexDir);
        }

        let base_url = normalize_base_url(self.base_url.unwrap_or(defaults.base_url))?;

        let writer_memory_bytes = self
            .writer_memory_bytes
            .unwrap_or(defaults.writer_memory_bytes);
        if writer_memory_bytes < MIN_WRITER_MEMORY_BYTES {
            return Err(ConfigError::WriterMemoryTooSmall {
                min: MIN_WRITER_MEMORY_BYTES,
                actual: writer_memory_bytes,
            });
        }

        if self.max_in_flight == Some(0) {
            return Err(ConfigError::ZeroMaxInFlight);
        }

        Ok(XkcdConfig {
            index_dir,
            rate_interval: self.rate_interval.unwrap_or(defaults.rate_interval),
            max_in_flight: self.max_in_flight,
            base_url,
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            writer_memory_bytes,
        })
    }
}

fn normalize_base_url(raw: String) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/').to_string();
    let parsed = Url::parse(&trimmed).map_err(|e| ConfigError::InvalidBaseUrl {
        url: raw.clone(),
        reason: e.to_string(),
    })?;

    match parsed.scheme() {
        "http" | "https" => Ok(trimmed),
        other => Err(ConfigError::InvalidBaseUrl {
            url: raw,
            reason: format!("unsupported scheme '{other}'"),
        }),
    }
}
