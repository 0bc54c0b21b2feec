//! Getter methods for `XkcdConfig`

use std::path::Path;
use std::time::Duration;

use super::types::XkcdConfig;

impl XkcdConfig {
    #[must_use]
    pub fn index_dir(&self) -> &Path {
        &self.index_dir
    }

    #[must_use]
    pub fn rate_interval(&self) -> Duration {
        self.rate_interval
    }

    #[must_use]
    pub fn max_in_flight(&self) -> Option<usize> {
        self.max_in_flight
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    #[must_use]
    pub fn writer_memory_bytes(&self) -> usize {
        self.writer_memory_bytes
    }
}
