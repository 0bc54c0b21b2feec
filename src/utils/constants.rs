//! Shared configuration constants for xkcd_search
//!
//! This module contains default values and configuration constants used
//! throughout the codebase to ensure consistency and avoid magic numbers.

use std::time::Duration;

/// Default interval between two outbound comic fetches: 100 milliseconds
///
/// Users can adjust via `--rate-limit` or `XkcdConfig::builder().rate_interval()`.
pub const DEFAULT_RATE_INTERVAL: Duration = Duration::from_millis(100);

/// Comic number that has never existed upstream.
///
/// `https://xkcd.com/404/` intentionally answers with a 404, so it is
/// excluded from every worklist.
pub const MISSING_COMIC_ID: u32 = 404;

/// Default base URL of the xkcd JSON API
pub const DEFAULT_BASE_URL: &str = "https://xkcd.com";

/// Name of the directory created under the platform config dir
pub const INDEX_DIR_NAME: &str = "xkcdsearch";

/// Default per-request timeout for the HTTP client
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Index writer memory budget: 50MB
///
/// Enough to hold the whole xkcd corpus in a single segment before commit.
pub const DEFAULT_WRITER_MEMORY_BYTES: usize = 50_000_000;

/// Smallest memory budget tantivy accepts for an index writer (15MB)
pub const MIN_WRITER_MEMORY_BYTES: usize = 15_000_000;

/// How often the fetch aggregator reports progress
pub const PROGRESS_LOG_EVERY: usize = 100;

/// User agent sent with every API request
pub const USER_AGENT: &str = concat!("xkcd_search/", env!("CARGO_PKG_VERSION"));
