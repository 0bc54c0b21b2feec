//! Match queries over comic text and resolution to a single comic
//!
//! Search terms are run through each field's own analyzer, so the query side
//! lowercases and stems exactly like the indexing side. Every resulting token
//! becomes an optional clause: a comic matches if any token hits any field.

use std::collections::HashSet;

use tantivy::collector::TopDocs;
use tantivy::query::{BooleanQuery, BoostQuery, Occur, Query, TermQuery};
use tantivy::schema::{IndexRecordOption, Value};
use tantivy::tokenizer::TokenStream;
use tantivy::{DocAddress, Score, Searcher, TantivyDocument, Term};

use super::engine::SearchEngine;
use super::errors::{SearchError, SearchResult};
use super::types::{ComicHit, Resolution};

/// Hits fetched by [`SearchEngine::query`] callers that only want a shortlist
pub const DEFAULT_HIT_LIMIT: usize = 10;

impl SearchEngine {
    /// Ranked comics matching any of the terms, best first.
    ///
    /// Terms that analyze to no tokens (punctuation, empty input) yield no
    /// hits rather than an error.
    pub fn query(&self, terms: &str, limit: usize) -> SearchResult<Vec<ComicHit>> {
        let Some(query) = build_match_query(self, terms) else {
            tracing::debug!(terms, "Search terms produced no tokens");
            return Ok(Vec::new());
        };

        let searcher = self.reader().searcher();
        let top_docs = searcher
            .search(&*query, &TopDocs::with_limit(limit.max(1)))
            .map_err(|e| SearchError::SearchExecution(format!("Search failed: {e}")))?;

        top_docs
            .into_iter()
            .map(|(score, address)| self.load_hit(&searcher, score, address))
            .collect()
    }

    fn load_hit(&self, searcher: &Searcher, score: Score, address: DocAddress) -> SearchResult<ComicHit> {
        let schema = self.schema();
        let doc: TantivyDocument = searcher.doc(address)?;

        let num = doc
            .get_first(schema.num)
            .and_then(|v| v.as_u64())
            .ok_or(SearchError::MissingField { field: "num", num: 0 })?;
        let text = |field: tantivy::schema::Field| {
            doc.get_first(field)
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string()
        };

        Ok(ComicHit {
            num: u32::try_from(num).map_err(|_| SearchError::MissingField { field: "num", num })?,
            title: text(schema.title),
            alt: text(schema.alt),
            img: doc
                .get_first(schema.img)
                .and_then(|v| v.as_str())
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            score,
        })
    }
}

/// Build an OR of per-token term queries across every searchable field
fn build_match_query(engine: &SearchEngine, terms: &str) -> Option<Box<dyn Query>> {
    let mut clauses: Vec<(Occur, Box<dyn Query>)> = Vec::new();

    for (field, boost) in engine.schema().searchable_fields() {
        let Some(mut analyzer) = engine.get_text_analyzer(field) else {
            continue;
        };

        let mut seen = HashSet::new();
        let mut stream = analyzer.token_stream(terms);
        while stream.advance() {
            let token = stream.token().text.clone();
            if !seen.insert(token.clone()) {
                continue;
            }

            let term_query: Box<dyn Query> = Box::new(TermQuery::new(
                Term::from_field_text(field, &token),
                IndexRecordOption::WithFreqs,
            ));
            let clause: Box<dyn Query> = if (boost - 1.0).abs() > f32::EPSILON {
                Box::new(BoostQuery::new(term_query, boost))
            } else {
                term_query
            };
            clauses.push((Occur::Should, clause));
        }
    }

    if clauses.is_empty() {
        None
    } else {
        Some(Box::new(BooleanQuery::new(clauses)))
    }
}

/// Resolve search terms to the best-matching comic.
///
/// # Errors
///
/// [`SearchError::MissingField`] when the top hit has no stored image URL,
/// which means the index holds a malformed document. Finding nothing is not
/// an error.
pub fn resolve(engine: &SearchEngine, terms: &str) -> SearchResult<Resolution> {
    let Some(top) = engine.query(terms, 1)?.into_iter().next() else {
        return Ok(Resolution::NotFound);
    };

    if top.img.is_none() {
        return Err(SearchError::MissingField {
            field: "img",
            num: u64::from(top.num),
        });
    }

    tracing::debug!(num = top.num, score = top.score, terms, "Resolved search terms");
    Ok(Resolution::Found(top))
}
