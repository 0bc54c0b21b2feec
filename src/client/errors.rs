//! Error types for the xkcd API client

use thiserror::Error;

/// Result type alias for remote comic lookups
pub type FetchResult<T> = Result<T, FetchError>;

/// Errors raised while talking to the comic metadata API
#[derive(Debug, Error)]
pub enum FetchError {
    /// The comic does not exist upstream (HTTP 404)
    #[error("comic {0} not found")]
    NotFound(u32),

    /// Any other non-success HTTP status
    #[error("unexpected HTTP status {status} from {url}")]
    Status { status: u16, url: String },

    /// Transport-level failure (DNS, TLS, timeout, connection reset)
    #[error("HTTP request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The body was not valid comic JSON
    #[error("invalid comic metadata from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// Client could not be constructed from the given configuration
    #[error("invalid client configuration: {0}")]
    Config(String),

    /// Failure raised by a non-HTTP comic source
    #[error("{0}")]
    Other(String),
}

impl FetchError {
    /// Check if retrying the same request later may succeed
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Http { source, .. } => source.is_timeout() || source.is_connect(),
            FetchError::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}
