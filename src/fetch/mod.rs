//! Rate-limited, concurrent retrieval of comic metadata

pub mod errors;
pub mod pool;
pub mod rate_limiter;

pub use errors::{FailureReason, FetchFailure, RateLimitError};
pub use pool::{FetchPool, FetchReport};
pub use rate_limiter::{RateLimitDecision, RateLimiter};
