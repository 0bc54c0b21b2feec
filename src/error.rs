//! Top-level error type for update and search operations

use thiserror::Error;

use crate::client::FetchError;
use crate::config::ConfigError;
use crate::search::SearchError;

/// Result type alias for orchestrator operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The latest-comic lookup failed, so no update could be planned
    #[error("failed to get latest comic: {0}")]
    RemoteUnavailable(#[source] FetchError),

    /// The HTTP client could not be constructed
    #[error("failed to set up HTTP client: {0}")]
    Client(#[source] FetchError),

    /// Opening, reading or writing the index failed
    #[error(transparent)]
    Store(#[from] SearchError),

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}
