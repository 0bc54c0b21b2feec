//! Remote comic metadata source
//!
//! [`ComicSource`] is the seam between the update workflow and the network:
//! the orchestrator and the fetch pool only ever see the trait, and
//! [`XkcdClient`] is the production implementation backed by `reqwest`.

pub mod errors;
pub mod http;
pub mod types;

use std::future::Future;

pub use errors::{FetchError, FetchResult};
pub use http::XkcdClient;
pub use types::Comic;

/// Something that can hand out comic metadata by number
pub trait ComicSource: Send + Sync + 'static {
    /// Metadata of the most recent comic; its `num` is the latest known ID
    fn latest(&self) -> impl Future<Output = FetchResult<Comic>> + Send;

    /// Metadata of comic `num`, `FetchError::NotFound` when it does not exist
    fn get(&self, num: u32) -> impl Future<Output = FetchResult<Comic>> + Send;
}
