//! Full-text comic index backed by Tantivy
//!
//! The index store (`SearchEngine`) persists one document per comic and
//! answers match queries; `resolve` turns search terms into a single comic.

pub mod engine;
pub mod errors;
pub mod indexer;
pub mod query;
pub mod runtime_helpers;
pub mod schema;
pub mod types;

pub use engine::SearchEngine;
pub use errors::{RetryConfig, SearchError, SearchResult};
pub use indexer::comic_document;
pub use query::{DEFAULT_HIT_LIMIT, resolve};
pub use runtime_helpers::retry_task;
pub use schema::{ComicSchema, SchemaError};
pub use types::{BatchSummary, ComicHit, OpenState, Resolution};
