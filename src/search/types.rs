//! Common types used across the search module

use std::fmt;

use serde::{Deserialize, Serialize};

/// How [`SearchEngine::open_or_create`](super::SearchEngine::open_or_create)
/// obtained its index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenState {
    /// Fresh, empty index at a new location
    Created,
    /// Pre-existing index with a compatible schema
    Opened,
}

/// One ranked comic from a query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComicHit {
    pub num: u32,
    pub title: String,
    pub alt: String,
    /// `None` when the stored document lacks an image URL
    pub img: Option<String>,
    pub score: f32,
}

impl ComicHit {
    /// Human-facing page of the comic
    #[must_use]
    pub fn page_url(&self) -> String {
        format!("https://xkcd.com/{}", self.num)
    }
}

/// Outcome of resolving search terms to a single comic
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Best-ranked comic for the terms
    Found(ComicHit),
    /// No comic matched
    NotFound,
}

impl Resolution {
    /// Image URL of the resolved comic
    #[must_use]
    pub fn image_url(&self) -> Option<&str> {
        match self {
            Resolution::Found(hit) => hit.img.as_deref(),
            Resolution::NotFound => None,
        }
    }

    #[must_use]
    pub fn hit(&self) -> Option<&ComicHit> {
        match self {
            Resolution::Found(hit) => Some(hit),
            Resolution::NotFound => None,
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolution::Found(hit) => write!(f, "{}", hit.img.as_deref().unwrap_or_default()),
            Resolution::NotFound => f.write_str("not found"),
        }
    }
}

/// Per-batch indexing counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Comics handed to `commit_batch`
    pub submitted: usize,
    /// Documents written in the commit
    pub indexed: usize,
    /// Comics omitted because their document could not be built or added
    pub skipped: usize,
}
