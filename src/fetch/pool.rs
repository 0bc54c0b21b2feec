//! Concurrent comic fetching under a shared rate limit
//!
//! Every worklist entry gets its own tokio task. Tasks do not coordinate with
//! each other: the shared [`RateLimiter`] is what paces them. Finished fetches
//! are handed to a single aggregator task over a capacity-1 channel; the
//! aggregator is the only owner of the result vectors, so no lock guards them.
//!
//! Completion order:
//! 1. every producer `JoinHandle` is driven to completion (barrier)
//! 2. the last sender is dropped, closing the channel
//! 3. the aggregator drains and returns its [`FetchReport`]

use std::sync::Arc;

use futures::StreamExt;
use futures::stream::FuturesUnordered;
use tokio::sync::{Semaphore, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::errors::{FailureReason, FetchFailure};
use super::rate_limiter::RateLimiter;
use crate::client::{Comic, ComicSource};
use crate::utils::PROGRESS_LOG_EVERY;

/// Result of one producer task, sent to the aggregator
#[derive(Debug)]
enum FetchOutcome {
    Fetched(Box<Comic>),
    Failed(FetchFailure),
}

/// Everything the aggregator collected during one `fetch_all` call
#[derive(Debug, Default)]
pub struct FetchReport {
    /// Successfully fetched comics, in completion order
    pub comics: Vec<Comic>,
    /// Per-item failures, in completion order
    pub failures: Vec<FetchFailure>,
}

impl FetchReport {
    /// Numbers of the comics that could not be fetched, ascending
    #[must_use]
    pub fn failed_ids(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self.failures.iter().map(|f| f.num).collect();
        ids.sort_unstable();
        ids
    }

    /// True when at least one item was skipped because of cancellation
    #[must_use]
    pub fn was_cancelled(&self) -> bool {
        self.failures.iter().any(FetchFailure::is_cancellation)
    }
}

/// Fetches a worklist of comic numbers concurrently
pub struct FetchPool<S: ComicSource> {
    source: Arc<S>,
    limiter: Arc<RateLimiter>,
    max_in_flight: Option<usize>,
}

impl<S: ComicSource> Clone for FetchPool<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            limiter: Arc::clone(&self.limiter),
            max_in_flight: self.max_in_flight,
        }
    }
}

impl<S: ComicSource> FetchPool<S> {
    #[must_use]
    pub fn new(source: Arc<S>, limiter: Arc<RateLimiter>) -> Self {
        Self {
            source,
            limiter,
            max_in_flight: None,
        }
    }

    /// Cap the number of requests in flight at once.
    ///
    /// Without a cap every worklist entry runs concurrently and only the
    /// rate limiter bounds throughput.
    #[must_use]
    pub fn with_max_in_flight(mut self, max_in_flight: Option<usize>) -> Self {
        self.max_in_flight = max_in_flight.filter(|n| *n > 0);
        self
    }

    /// Fetch every comic in `worklist`.
    ///
    /// Never fails: individual errors are logged and reported in
    /// [`FetchReport::failures`]. Returns only after every spawned task has
    /// finished.
    pub async fn fetch_all(&self, worklist: Vec<u32>, cancel: &CancellationToken) -> FetchReport {
        let total = worklist.len();
        if total == 0 {
            return FetchReport::default();
        }

        let (tx, rx) = mpsc::channel::<FetchOutcome>(1);
        let aggregator = tokio::spawn(aggregate(rx, total));

        let semaphore = self.max_in_flight.map(|n| Arc::new(Semaphore::new(n)));
        let mut producers = FuturesUnordered::new();

        for num in worklist {
            let source = Arc::clone(&self.source);
            let limiter = Arc::clone(&self.limiter);
            let semaphore = semaphore.clone();
            let cancel = cancel.clone();
            let tx = tx.clone();

            let handle = tokio::spawn(async move {
                let _permit = match semaphore {
                    Some(semaphore) => semaphore.acquire_owned().await.ok(),
                    None => None,
                };
                let outcome = match fetch_one(source.as_ref(), &limiter, num, &cancel).await {
                    Ok(comic) => FetchOutcome::Fetched(Box::new(comic)),
                    Err(reason) => FetchOutcome::Failed(FetchFailure { num, reason }),
                };
                // Only fails if the aggregator is gone, in which case nobody
                // is left to read the outcome.
                let _ = tx.send(outcome).await;
            });
            producers.push(async move { (num, handle.await) });
        }

        // Barrier: wait for every producer, successful or not.
        let mut panicked = Vec::new();
        while let Some((num, joined)) = producers.next().await {
            if let Err(e) = joined {
                panicked.push(FetchFailure {
                    num,
                    reason: FailureReason::TaskPanicked(e.to_string()),
                });
            }
        }

        // All producer clones are gone; dropping ours closes the channel.
        drop(tx);

        let mut report = match aggregator.await {
            Ok(report) => report,
            Err(e) => {
                warn!(error = %e, "fetch aggregator task failed");
                FetchReport::default()
            }
        };

        for failure in panicked {
            warn!(num = failure.num, error = %failure, "fetch task panicked");
            report.failures.push(failure);
        }

        info!(
            fetched = report.comics.len(),
            failed = report.failures.len(),
            total,
            "fetch pool finished"
        );
        report
    }
}

/// Rate-limited fetch of a single comic, racing cancellation
async fn fetch_one<S: ComicSource>(
    source: &S,
    limiter: &RateLimiter,
    num: u32,
    cancel: &CancellationToken,
) -> Result<Comic, FailureReason> {
    limiter.wait(cancel).await?;

    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(FailureReason::Cancelled),
        result = source.get(num) => result.map_err(FailureReason::from),
    }
}

/// Sole consumer of fetch outcomes
async fn aggregate(mut rx: mpsc::Receiver<FetchOutcome>, total: usize) -> FetchReport {
    let mut report = FetchReport::default();

    while let Some(outcome) = rx.recv().await {
        match outcome {
            FetchOutcome::Fetched(comic) => {
                debug!(num = comic.num, title = %comic.title, "fetched comic");
                report.comics.push(*comic);
                if report.comics.len() % PROGRESS_LOG_EVERY == 0 {
                    info!(fetched = report.comics.len(), total, "fetching comics");
                }
            }
            FetchOutcome::Failed(failure) => {
                if failure.is_cancellation() {
                    debug!(num = failure.num, "fetch skipped after cancellation");
                } else {
                    let transient =
                        matches!(&failure.reason, FailureReason::Fetch(e) if e.is_transient());
                    warn!(num = failure.num, transient, error = %failure.reason, "failed to fetch comic, skipping");
                }
                report.failures.push(failure);
            }
        }
    }

    report
}
