//! Shared rate limiter for outbound comic fetches
//!
//! Token bucket with a burst capacity of one token that regenerates once per
//! configured interval. Token accounting is lock-free: every fetch task holds
//! an `Arc<RateLimiter>` and competes for tokens with compare-and-swap, so the
//! limiter itself is the only thing throttling the fetch fan-out.
//!
//! Key properties:
//! - First caller is granted immediately (burst of 1)
//! - `N` grants always span at least `(N - 1) * interval`
//! - Fixed-point arithmetic for sub-token precision
//! - `wait` is cancellable and never consumes a token when cancelled

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

use super::errors::RateLimitError;
use crate::utils::DEFAULT_RATE_INTERVAL;

/// Scaling factor for fixed-point token arithmetic (1000x precision)
const TOKEN_SCALE: u64 = 1000;

/// Number of tokens the bucket can hold
const BURST: u64 = 1;

/// Lower bound on a computed back-off, avoids spinning on rounding leftovers
const MIN_RETRY: Duration = Duration::from_micros(50);

/// Rate limit decision for a single acquisition attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    /// A token was consumed, the caller may proceed
    Allow,
    /// No token available; retry after the contained duration
    Deny { retry_after: Duration },
}

/// Token bucket limiter shared by all fetch tasks
#[derive(Debug)]
pub struct RateLimiter {
    /// Current available tokens scaled by `TOKEN_SCALE`
    tokens: AtomicU64,
    /// Last refill timestamp, nanoseconds since `epoch`
    last_refill_nanos: AtomicU64,
    /// Nanoseconds needed to regenerate one whole token (0 = unlimited)
    interval_nanos: u64,
    /// Maximum tokens scaled by `TOKEN_SCALE`
    max_tokens: u64,
    epoch: Instant,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_RATE_INTERVAL)
    }
}

impl RateLimiter {
    /// Create a limiter granting one token per `interval`.
    ///
    /// A zero interval disables throttling entirely.
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        let interval_nanos = u64::try_from(interval.as_nanos()).unwrap_or(u64::MAX);
        let max_tokens = BURST * TOKEN_SCALE;

        Self {
            tokens: AtomicU64::new(max_tokens),
            last_refill_nanos: AtomicU64::new(0),
            interval_nanos,
            max_tokens,
            epoch: Instant::now(),
        }
    }

    /// Configured minimum interval between two grants
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_nanos(self.interval_nanos)
    }

    #[inline]
    fn now_nanos(&self) -> u64 {
        u64::try_from(self.epoch.elapsed().as_nanos()).unwrap_or(u64::MAX)
    }

    /// Attempt to consume one token without blocking
    pub fn try_acquire(&self) -> RateLimitDecision {
        if self.interval_nanos == 0 {
            return RateLimitDecision::Allow;
        }

        let now_nanos = self.now_nanos();
        self.refill_tokens(now_nanos);

        loop {
            let current_tokens = self.tokens.load(Ordering::Acquire);
            if current_tokens < TOKEN_SCALE {
                return RateLimitDecision::Deny {
                    retry_after: self.time_until_token(current_tokens, now_nanos),
                };
            }

            match self.tokens.compare_exchange_weak(
                current_tokens,
                current_tokens - TOKEN_SCALE,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return RateLimitDecision::Allow,
                Err(_) => continue,
            }
        }
    }

    /// Block until a token is granted or `cancel` fires.
    ///
    /// Cancellation is checked before every attempt, so a cancelled caller
    /// never takes a token away from the others.
    pub async fn wait(&self, cancel: &CancellationToken) -> Result<(), RateLimitError> {
        loop {
            if cancel.is_cancelled() {
                return Err(RateLimitError::Cancelled);
            }

            match self.try_acquire() {
                RateLimitDecision::Allow => return Ok(()),
                RateLimitDecision::Deny { retry_after } => {
                    tokio::select! {
                        biased;
                        () = cancel.cancelled() => return Err(RateLimitError::Cancelled),
                        () = tokio::time::sleep(retry_after) => {}
                    }
                }
            }
        }
    }

    /// Time until the bucket holds a whole token again
    fn time_until_token(&self, current_tokens: u64, now_nanos: u64) -> Duration {
        let deficit = u128::from(TOKEN_SCALE.saturating_sub(current_tokens));
        let needed = (deficit * u128::from(self.interval_nanos)).div_ceil(u128::from(TOKEN_SCALE));

        // Time since the last refill already counts towards the next token.
        let uncredited =
            u128::from(now_nanos.saturating_sub(self.last_refill_nanos.load(Ordering::Acquire)));
        let remaining = u64::try_from(needed.saturating_sub(uncredited)).unwrap_or(u64::MAX);

        Duration::from_nanos(remaining).max(MIN_RETRY)
    }

    /// Refill tokens based on time elapsed since the last refill.
    ///
    /// `last_refill_nanos` only advances by the time that actually produced
    /// tokens, so fractional progress towards the next token is kept across
    /// concurrent callers. Once the bucket is full it is pinned to `now`:
    /// idle time beyond one token is never banked for the next grant.
    fn refill_tokens(&self, now_nanos: u64) {
        loop {
            let last_refill = self.last_refill_nanos.load(Ordering::Acquire);
            if now_nanos <= last_refill {
                break;
            }

            let current_tokens = self.tokens.load(Ordering::Acquire);
            if current_tokens >= self.max_tokens {
                match self.last_refill_nanos.compare_exchange_weak(
                    last_refill,
                    now_nanos,
                    Ordering::AcqRel,
                    Ordering::Acquire,
                ) {
                    Ok(_) => break,
                    Err(_) => continue,
                }
            }

            let elapsed = u128::from(now_nanos - last_refill);
            let interval = u128::from(self.interval_nanos);
            let tokens_to_add = elapsed * u128::from(TOKEN_SCALE) / interval;
            if tokens_to_add == 0 {
                break;
            }
            let add = u64::try_from(tokens_to_add).unwrap_or(u64::MAX);

            let new_last_refill = if current_tokens.saturating_add(add) >= self.max_tokens {
                now_nanos
            } else {
                // Never below the real time spent on the credited tokens.
                let time_credited = (tokens_to_add * interval).div_ceil(u128::from(TOKEN_SCALE));
                last_refill.saturating_add(u64::try_from(time_credited).unwrap_or(u64::MAX))
            };

            match self.last_refill_nanos.compare_exchange_weak(
                last_refill,
                new_last_refill,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => {
                    let _ = self
                        .tokens
                        .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                            Some(current.saturating_add(add).min(self.max_tokens))
                        });
                    break;
                }
                Err(_) => continue,
            }
        }
    }
}
