//! Keyword search over xkcd comics
//!
//! Comic metadata is fetched from the xkcd JSON API under a shared rate
//! limit, stored in a local Tantivy index and queried by free-text terms.
//!
//! ```no_run
//! use xkcd_search::{XkcdConfig, XkcdSearch};
//!
//! # async fn run() -> xkcd_search::Result<()> {
//! let config = XkcdConfig::builder().index_dir("/tmp/xkcd-index").build()?;
//! let mut xkcd = XkcdSearch::new(config)?;
//! println!("{}", xkcd.search("woodpecker").await?);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod fetch;
pub mod orchestrator;
pub mod search;
pub mod sync;
pub mod utils;

pub use client::{Comic, ComicSource, FetchError, FetchResult, XkcdClient};
pub use config::{ConfigError, XkcdConfig, XkcdConfigBuilder};
pub use error::{Error, Result};
pub use fetch::{FetchFailure, FetchPool, FetchReport, RateLimitError, RateLimiter};
pub use orchestrator::{UpdateReport, XkcdSearch};
pub use search::{BatchSummary, ComicHit, OpenState, Resolution, SearchEngine, SearchError, resolve};
pub use sync::plan;
