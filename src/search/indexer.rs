//! Batch writes of comic documents
//!
//! A batch is written with a single commit. Each comic replaces any earlier
//! document with the same key, so re-indexing never produces duplicates.

use std::time::Instant;

use tantivy::{TantivyDocument, Term};

use super::engine::SearchEngine;
use super::errors::{SearchError, SearchResult};
use super::schema::ComicSchema;
use super::types::BatchSummary;
use crate::client::Comic;

/// Convert a comic into a tantivy document.
///
/// Empty `img` values are not stored, so a later lookup can tell a missing
/// image URL apart from an empty one.
pub fn comic_document(schema: &ComicSchema, comic: &Comic) -> SearchResult<TantivyDocument> {
    if comic.num == 0 {
        return Err(SearchError::IndexingFailed {
            num: comic.num,
            message: "comic number must be positive".to_string(),
        });
    }

    let mut doc = TantivyDocument::default();
    doc.add_text(schema.key, comic.num.to_string());
    doc.add_u64(schema.num, u64::from(comic.num));
    doc.add_text(schema.title, &comic.title);
    doc.add_text(schema.safe_title, &comic.safe_title);
    doc.add_text(schema.alt, &comic.alt);
    doc.add_text(schema.transcript, &comic.transcript);
    if !comic.img.is_empty() {
        doc.add_text(schema.img, &comic.img);
    }
    if let Some(date) = comic.published() {
        doc.add_text(schema.published, date.to_string());
    }
    Ok(doc)
}

impl SearchEngine {
    /// Index `comics` in one commit, overwriting documents with equal keys.
    ///
    /// Comics whose document cannot be built or added are logged and counted
    /// in [`BatchSummary::skipped`]; they do not fail the batch. An empty
    /// batch touches nothing.
    ///
    /// # Errors
    ///
    /// [`SearchError::WriterAcquisition`] when no writer can be obtained and
    /// [`SearchError::CommitFailed`] when the commit itself fails. Nothing
    /// from the batch is visible in either case.
    pub async fn commit_batch(&self, comics: &[Comic]) -> SearchResult<BatchSummary> {
        let mut summary = BatchSummary {
            submitted: comics.len(),
            ..BatchSummary::default()
        };
        if comics.is_empty() {
            return Ok(summary);
        }

        let schema = self.schema().clone();
        let mut documents = Vec::with_capacity(comics.len());
        for comic in comics {
            match comic_document(&schema, comic) {
                Ok(doc) => documents.push((comic.num, doc)),
                Err(e) => {
                    tracing::warn!(num = comic.num, error = %e, "Skipping comic that cannot be indexed");
                    summary.skipped += 1;
                }
            }
        }

        let mut writer = self.writer_with_retry().await?;
        let engine = self.clone();
        let start = Instant::now();

        let (indexed, skipped) = tokio::task::spawn_blocking(move || -> SearchResult<(usize, usize)> {
            let mut indexed = 0usize;
            let mut skipped = 0usize;

            for (num, doc) in documents {
                writer.delete_term(Term::from_field_text(schema.key, &num.to_string()));
                match writer.add_document(doc) {
                    Ok(_) => indexed += 1,
                    Err(e) => {
                        tracing::warn!(num, error = %e, "Failed to add document, skipping");
                        skipped += 1;
                    }
                }
            }

            writer
                .commit()
                .map_err(|e| SearchError::CommitFailed(format!("Index commit failed: {e}")))?;

            let commit_duration = start.elapsed();
            tracing::debug!(
                duration_ms = commit_duration.as_millis(),
                documents = indexed,
                "Index commit completed"
            );

            if let Err(e) = writer.wait_merging_threads() {
                tracing::warn!(error = %e, "Segment merge did not finish cleanly");
            }

            engine.reload()?;

            tracing::debug!(
                total_duration_ms = start.elapsed().as_millis(),
                commit_duration_ms = commit_duration.as_millis(),
                "Index commit and reload completed"
            );

            Ok((indexed, skipped))
        })
        .await
        .map_err(|e| SearchError::CommitFailed(format!("Commit task panicked: {e}")))??;

        summary.indexed = indexed;
        summary.skipped += skipped;

        tracing::info!(
            submitted = summary.submitted,
            indexed = summary.indexed,
            skipped = summary.skipped,
            "Indexed comic batch"
        );
        Ok(summary)
    }
}
