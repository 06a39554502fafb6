//! Reference sources.
//!
//! A [`ReferenceSource`] resolves citation ids to full paper records. The
//! trait is the seam between the reader core and whatever actually holds
//! the bibliography: an in-process map, a local database, a remote index.
//!
//! Sources return items in their own storage order, not request order.
//! Callers that care about ordering (panel projection does) rely on that
//! order being stable across calls, which [`InMemorySource`] guarantees
//! by keeping insertion order.

use async_trait::async_trait;
use indexmap::IndexMap;
use parking_lot::RwLock;
use thiserror::Error;

use scholia_types::{RefId, ReferencedItem};

/// Error from a reference source.
///
/// Payloads are plain strings so the error stays cloneable when a single
/// fetch result is fanned out to several waiters.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// The backing store failed the lookup itself.
    #[error("reference lookup failed: {0}")]
    Lookup(String),

    /// The backing store could not be reached at all.
    #[error("reference source unavailable: {0}")]
    Unavailable(String),
}

/// Resolves citation ids to paper records.
///
/// A partial result is not an error: ids the source does not know are
/// simply absent from the returned batch. Implementations must be safe
/// to call concurrently.
#[async_trait]
pub trait ReferenceSource: Send + Sync {
    /// Fetch every item the source knows for `ids`, in storage order.
    async fn fetch_batch(&self, ids: &[RefId]) -> Result<Vec<ReferencedItem>, SourceError>;
}

#[async_trait]
impl<S: ReferenceSource + ?Sized> ReferenceSource for std::sync::Arc<S> {
    async fn fetch_batch(&self, ids: &[RefId]) -> Result<Vec<ReferencedItem>, SourceError> {
        (**self).fetch_batch(ids).await
    }
}

/// In-memory reference source.
///
/// Backs tests and embedded use. Storage order is insertion order, so
/// batches resolved through this source project deterministically.
#[derive(Debug, Default)]
pub struct InMemorySource {
    items: RwLock<IndexMap<RefId, ReferencedItem>>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert one item, replacing any previous entry with the same id.
    ///
    /// A replaced item keeps its original position in storage order.
    pub fn insert(&self, item: ReferencedItem) {
        self.items.write().insert(item.id.clone(), item);
    }

    /// Insert many items in iteration order.
    pub fn extend(&self, items: impl IntoIterator<Item = ReferencedItem>) {
        let mut map = self.items.write();
        for item in items {
            map.insert(item.id.clone(), item);
        }
    }

    /// Remove an item by id, returning it if it was present.
    pub fn remove(&self, id: &RefId) -> Option<ReferencedItem> {
        self.items.write().shift_remove(id)
    }

    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }
}

#[async_trait]
impl ReferenceSource for InMemorySource {
    async fn fetch_batch(&self, ids: &[RefId]) -> Result<Vec<ReferencedItem>, SourceError> {
        let items = self.items.read();
        Ok(items
            .values()
            .filter(|item| ids.contains(&item.id))
            .cloned()
            .collect())
    }
}

// ============================================================================
// Tests
// ============================================================================
