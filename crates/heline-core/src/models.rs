//! Core data models used throughout heline.
//!
//! Documents are written to the engine as-is: struct field names are the
//! engine's stored field names, so renaming a field here changes the wire
//! contract with the engine schema.

use serde::{Deserialize, Serialize};

/// Structured filters attached to a search.
///
/// Values are OR-combined within a field and AND-combined across fields.
/// An empty list means "no constraint" and is never sent to the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryFilters {
    pub repo: Vec<String>,
    pub language: Vec<String>,
    pub path: Vec<String>,
}

impl QueryFilters {
    pub fn is_empty(&self) -> bool {
        self.repo.is_empty() && self.language.is_empty() && self.path.is_empty()
    }
}

/// A user search request. `raw_text` is untrusted and may contain engine
/// operator characters; escaping happens in [`crate::query`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    pub raw_text: String,
    pub filters: QueryFilters,
}

impl SearchQuery {
    pub fn new(raw_text: impl Into<String>) -> Self {
        Self {
            raw_text: raw_text.into(),
            filters: QueryFilters::default(),
        }
    }

    pub fn with_filters(mut self, filters: QueryFilters) -> Self {
        self.filters = filters;
        self
    }
}

/// A source file scraped from a code-hosting page.
///
/// `id` identifies one file at one branch of one repository; re-indexing
/// the same `id` overwrites the previous document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeDocument {
    pub id: String,
    pub file_id: String,
    pub owner_id: String,
    pub path: String,
    pub repo: String,
    pub branch: String,
    pub lang: String,
    /// Renderable HTML fragments, each covering a bounded run of lines.
    pub content: Vec<String>,
}

/// A documentation-set entry as returned by a lookup by ID.
///
/// Every field is optional on the way in because the engine omits unset
/// stored fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocsetDetail {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub document: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub content: Vec<String>,
}
