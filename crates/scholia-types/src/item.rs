//! Resolved reference items.
//!
//! [`ReferencedItem`] is the paper record the reference store hands back for a
//! citation id. The document model never holds one; it carries [`RefId`]s
//! only, and the panel joins the two at projection time.

use serde::{Deserialize, Serialize};

use crate::ids::RefId;

/// A paper record resolved from a citation id.
///
/// Only `id` and `title` are always present. Metadata fields are `Option`
/// (or empty collections) because upstream stores differ in coverage, and a
/// partially resolved item is still useful in the panel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferencedItem {
    /// Normalized citation id this item resolves.
    pub id: RefId,
    /// Paper title.
    pub title: String,
    /// Author names, in publication order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<String>,
    /// Publication year.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<u16>,
    /// Venue (conference or journal).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue: Option<String>,
    /// Canonical URL (abstract page, not PDF).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// One-paragraph abstract or store-provided summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl ReferencedItem {
    /// Create an item with just id and title; metadata via `with_*`.
    pub fn new(id: impl Into<RefId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            authors: Vec::new(),
            year: None,
            venue: None,
            url: None,
            summary: None,
        }
    }

    /// Set the author list.
    pub fn with_authors(mut self, authors: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.authors = authors.into_iter().map(Into::into).collect();
        self
    }

    /// Set the publication year.
    pub fn with_year(mut self, year: u16) -> Self {
        self.year = Some(year);
        self
    }

    /// Set the venue.
    pub fn with_venue(mut self, venue: impl Into<String>) -> Self {
        self.venue = Some(venue.into());
        self
    }

    /// Set the canonical URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Set the summary.
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Title for display; falls back to the id when the title is empty.
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            self.id.as_str()
        } else {
            &self.title
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
