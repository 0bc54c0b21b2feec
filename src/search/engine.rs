//! Tantivy index lifecycle for comic documents
//!
//! `SearchEngine` owns the index handle, the resolved schema and a reader.
//! It is cheap to clone; every clone shares the same underlying index.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tantivy::collector::DocSetCollector;
use tantivy::directory::MmapDirectory;
use tantivy::query::AllQuery;
use tantivy::schema::{Field, FieldType, Value};
use tantivy::tokenizer::TextAnalyzer;
use tantivy::{Index, IndexReader, IndexSettings, IndexWriter, TantivyDocument};

use super::errors::{RetryConfig, SearchError, SearchResult};
use super::runtime_helpers::retry_task;
use super::schema::ComicSchema;
use super::types::OpenState;

/// Handle to an open comic index
#[derive(Clone)]
pub struct SearchEngine {
    index: Index,
    schema: ComicSchema,
    reader: IndexReader,
    index_path: PathBuf,
    writer_memory: usize,
}

impl std::fmt::Debug for SearchEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchEngine")
            .field("index_path", &self.index_path)
            .field("writer_memory", &self.writer_memory)
            .finish_non_exhaustive()
    }
}

impl SearchEngine {
    /// Open the index at `index_dir`, creating it when absent.
    ///
    /// # Errors
    ///
    /// [`SearchError::IndexOpen`] when the location cannot be created, read
    /// or written, and [`SearchError::Schema`] when it holds an index whose
    /// schema does not match [`ComicSchema`]. The directory is left as is.
    pub async fn open_or_create(
        index_dir: &Path,
        writer_memory: usize,
    ) -> SearchResult<(Self, OpenState)> {
        std::fs::create_dir_all(index_dir).map_err(|e| {
            SearchError::IndexOpen(format!(
                "Failed to create index directory {}: {e}",
                index_dir.display()
            ))
        })?;

        let (index, schema, state) = if index_dir.join("meta.json").exists() {
            let existing = Index::open_in_dir(index_dir).map_err(|e| {
                SearchError::IndexOpen(format!(
                    "Failed to open existing index at {}: {e}",
                    index_dir.display()
                ))
            })?;

            let schema = ComicSchema::from_schema(&existing.schema()).map_err(|mismatch| {
                tracing::error!(
                    index_dir = %index_dir.display(),
                    reason = %mismatch,
                    "Existing index has an incompatible schema"
                );
                SearchError::Schema(mismatch)
            })?;
            (existing, schema, OpenState::Opened)
        } else {
            let schema = ComicSchema::build();
            let index = create_index(index_dir, &schema)?;
            (index, schema, OpenState::Created)
        };

        ComicSchema::register_tokenizers(index.tokenizers());

        let reader = index
            .reader()
            .map_err(|e| SearchError::IndexOpen(format!("Failed to create index reader: {e}")))?;

        tracing::info!(
            index_dir = %index_dir.display(),
            state = ?state,
            documents = reader.searcher().num_docs(),
            "Search index ready"
        );

        Ok((
            SearchEngine {
                index,
                schema,
                reader,
                index_path: index_dir.to_path_buf(),
                writer_memory,
            },
            state,
        ))
    }

    /// Get a reference to the comic schema
    #[must_use]
    pub fn schema(&self) -> &ComicSchema {
        &self.schema
    }

    /// Get the index reader
    #[must_use]
    pub fn reader(&self) -> &IndexReader {
        &self.reader
    }

    /// Acquire an index writer, retrying transient failures.
    ///
    /// Uses default retry config: 3 retries, 100ms initial delay, 2x backoff,
    /// 5s max delay. A writer held by another process surfaces here.
    pub async fn writer_with_retry(&self) -> SearchResult<IndexWriter> {
        let limit = self.writer_memory;
        let engine = self.clone();

        retry_task(RetryConfig::default(), move || {
            let eng = engine.clone();
            async move {
                eng.index.writer(limit).map_err(|e| {
                    SearchError::WriterAcquisition(format!(
                        "Failed to acquire index writer with {}MB limit: {e}",
                        limit / 1_000_000
                    ))
                })
            }
        })
        .await
    }

    /// Get the text analyzer (tokenizer) for a specific field
    ///
    /// Returns None if the field is not a text field or has no tokenizer configured.
    pub fn get_text_analyzer(&self, field: Field) -> Option<TextAnalyzer> {
        let field_entry = self.schema.schema.get_field_entry(field);

        if let FieldType::Str(text_options) = field_entry.field_type()
            && let Some(indexing_options) = text_options.get_indexing_options()
        {
            return self.index.tokenizers().get(indexing_options.tokenizer());
        }
        None
    }

    /// Number of live documents visible to the current reader
    #[must_use]
    pub fn num_docs(&self) -> u64 {
        self.reader.searcher().num_docs()
    }

    /// Numbers of every comic in the index.
    ///
    /// Collects all live documents without a result-size cap.
    pub fn indexed_ids(&self) -> SearchResult<BTreeSet<u32>> {
        let searcher = self.reader.searcher();
        let addresses = searcher
            .search(&AllQuery, &DocSetCollector)
            .map_err(|e| SearchError::SearchExecution(format!("Failed to list documents: {e}")))?;

        let mut ids = BTreeSet::new();
        for address in addresses {
            let doc: TantivyDocument = searcher.doc(address)?;
            match doc
                .get_first(self.schema.num)
                .and_then(|v| v.as_u64())
                .and_then(|n| u32::try_from(n).ok())
            {
                Some(num) => {
                    ids.insert(num);
                }
                None => tracing::warn!(?address, "Stored document has no comic number, ignoring"),
            }
        }
        Ok(ids)
    }

    /// Reload the reader so the last commit becomes visible
    pub fn reload(&self) -> SearchResult<()> {
        self.reader
            .reload()
            .map_err(|e| SearchError::Other(format!("Failed to reload reader: {e}")))
    }
}

fn create_index(index_dir: &Path, schema: &ComicSchema) -> SearchResult<Index> {
    let directory = MmapDirectory::open(index_dir).map_err(|e| {
        SearchError::IndexOpen(format!(
            "Failed to open index directory {}: {e}",
            index_dir.display()
        ))
    })?;
    Index::create(directory, schema.schema.clone(), IndexSettings::default())
        .map_err(|e| SearchError::IndexOpen(format!("Failed to create new Tantivy index: {e}")))
}
