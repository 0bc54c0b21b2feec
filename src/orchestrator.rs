//! Update and search entry points
//!
//! `XkcdSearch` ties the pieces together: it asks the source for the latest
//! comic, plans the missing numbers against the index, fetches them through
//! the rate-limited pool and writes them in one commit. The index handle is
//! opened lazily on the first update and reused afterwards.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::client::{ComicSource, XkcdClient};
use crate::config::XkcdConfig;
use crate::error::{Error, Result};
use crate::fetch::{FetchPool, RateLimiter};
use crate::search::{OpenState, Resolution, SearchEngine, resolve};
use crate::sync::{expected_count, plan};

/// Counts describing one update run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpdateReport {
    /// Number of the newest comic upstream
    pub latest: u32,
    /// Comics already in the index before this run
    pub already_indexed: usize,
    /// Size of the worklist computed by the planner
    pub planned: usize,
    /// Comics whose metadata was obtained (including the latest one)
    pub fetched: usize,
    /// Comic numbers that could not be fetched, ascending
    pub failed: Vec<u32>,
    /// Documents written in the final commit
    pub indexed: usize,
    /// Live documents after the commit
    pub total_documents: u64,
    /// True when the run was cut short by cancellation
    pub cancelled: bool,
}

/// Keeps a local full-text index of xkcd comics in sync and searches it
pub struct XkcdSearch<S: ComicSource = XkcdClient> {
    config: XkcdConfig,
    source: Arc<S>,
    pool: FetchPool<S>,
    engine: Option<SearchEngine>,
}

impl XkcdSearch<XkcdClient> {
    /// Search against the xkcd HTTP API described by `config`
    pub fn new(config: XkcdConfig) -> Result<Self> {
        let client = XkcdClient::from_config(&config).map_err(Error::Client)?;
        Ok(Self::with_source(config, client))
    }
}

impl<S: ComicSource> XkcdSearch<S> {
    /// Search against an arbitrary comic source
    pub fn with_source(config: XkcdConfig, source: S) -> Self {
        let source = Arc::new(source);
        let limiter = Arc::new(RateLimiter::new(config.rate_interval()));
        let pool = FetchPool::new(Arc::clone(&source), limiter)
            .with_max_in_flight(config.max_in_flight());

        Self {
            config,
            source,
            pool,
            engine: None,
        }
    }

    /// True once an update has committed and the index handle is held
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.engine.is_some()
    }

    #[must_use]
    pub fn index_dir(&self) -> &Path {
        self.config.index_dir()
    }

    /// Bring the index up to date with the latest comic
    pub async fn update(&mut self) -> Result<UpdateReport> {
        self.update_with_cancel(&CancellationToken::new()).await
    }

    /// Like [`update`](Self::update), but stops fetching once `cancel` fires.
    ///
    /// Comics fetched before cancellation are still committed.
    pub async fn update_with_cancel(&mut self, cancel: &CancellationToken) -> Result<UpdateReport> {
        let (report, _) = self.sync_index(cancel).await?;
        Ok(report)
    }

    /// Resolve `terms` to the best-matching comic.
    ///
    /// Runs an update first when no index handle is held yet.
    pub async fn search(&mut self, terms: &str) -> Result<Resolution> {
        let engine = match self.engine.clone() {
            Some(engine) => engine,
            None => {
                info!("Index not loaded, updating before search");
                self.sync_index(&CancellationToken::new()).await?.1
            }
        };

        Ok(resolve(&engine, terms)?)
    }

    async fn sync_index(&mut self, cancel: &CancellationToken) -> Result<(UpdateReport, SearchEngine)> {
        let latest = self.source.latest().await.map_err(Error::RemoteUnavailable)?;
        info!(latest = latest.num, "Latest comic");

        let (engine, existing) = match &self.engine {
            Some(engine) => (engine.clone(), engine.indexed_ids()?),
            None => {
                let (engine, state) = SearchEngine::open_or_create(
                    self.config.index_dir(),
                    self.config.writer_memory_bytes(),
                )
                .await?;
                let existing = match state {
                    OpenState::Created => BTreeSet::new(),
                    OpenState::Opened => engine.indexed_ids()?,
                };
                (engine, existing)
            }
        };

        let mut worklist = plan(latest.num, &existing);
        let planned = worklist.len();
        info!(
            latest = latest.num,
            already_indexed = existing.len(),
            planned,
            "Planned index update"
        );

        let mut batch = Vec::with_capacity(planned);
        if let Ok(position) = worklist.binary_search(&latest.num) {
            worklist.remove(position);
            batch.push(latest.clone());
        }

        let fetched = self.pool.fetch_all(worklist, cancel).await;
        let cancelled = fetched.was_cancelled();
        let failed = fetched.failed_ids();
        batch.extend(fetched.comics);

        let summary = engine.commit_batch(&batch).await?;

        let report = UpdateReport {
            latest: latest.num,
            already_indexed: existing.len(),
            planned,
            fetched: batch.len(),
            failed,
            indexed: summary.indexed,
            total_documents: engine.num_docs(),
            cancelled,
        };

        let missing = (expected_count(report.latest) as u64).saturating_sub(report.total_documents);
        if missing > 0 {
            warn!(missing, "Index is incomplete, missing comics are retried on the next update");
        }

        info!(
            indexed = report.indexed,
            failed = report.failed.len(),
            total_documents = report.total_documents,
            cancelled,
            "Index update finished"
        );

        self.engine = Some(engine.clone());
        Ok((report, engine))
    }
}
