//! Fetch batches and their keys.
//!
//! Every fetch round is identified by a [`BatchKey`] derived from the set
//! of requested ids. Two requests for the same set of ids, in any order
//! and with any duplication, produce the same key. The key is what lets a
//! response be matched against the request that is still current: a
//! response carrying a key the caller no longer expects is stale and gets
//! dropped on the floor.
//!
//! A [`RefBatch`] is the resolved result: the items a source returned for
//! one key, in the source's storage order, with an id index for O(1)
//! lookups.

use std::collections::HashMap;
use std::hash::{DefaultHasher, Hash, Hasher};

use scholia_types::{RefId, ReferencedItem};

// ============================================================================
// BatchKey
// ============================================================================

/// Stable identity of a reference fetch request.
///
/// Derived from the requested ids as a set: order and duplicates do not
/// matter. Stable only within one process; never persist it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BatchKey(u64);

impl BatchKey {
    /// Compute the key for a set of requested ids.
    pub fn of<'a>(ids: impl IntoIterator<Item = &'a RefId>) -> Self {
        let mut sorted: Vec<&RefId> = ids.into_iter().collect();
        sorted.sort_unstable();
        sorted.dedup();

        let mut hasher = DefaultHasher::new();
        for id in sorted {
            id.hash(&mut hasher);
        }
        Self(hasher.finish())
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for BatchKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl std::fmt::Debug for BatchKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BatchKey({:016x})", self.0)
    }
}

// ============================================================================
// RefBatch
// ============================================================================

/// The resolved items for one fetch key.
///
/// Items keep the order the source returned them in. Ids the source did
/// not know are simply not here; use [`RefBatch::missing`] to find out
/// which ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefBatch {
    key: BatchKey,
    items: Vec<ReferencedItem>,
    index: HashMap<RefId, usize>,
}

impl RefBatch {
    /// Build a batch from a source response.
    ///
    /// If the response carries two items with the same id, the first
    /// occurrence wins the index slot.
    pub fn new(key: BatchKey, items: Vec<ReferencedItem>) -> Self {
        let mut index = HashMap::with_capacity(items.len());
        for (pos, item) in items.iter().enumerate() {
            index.entry(item.id.clone()).or_insert(pos);
        }
        Self { key, items, index }
    }

    /// An empty batch for a key, used when a report cites nothing.
    pub fn empty(key: BatchKey) -> Self {
        Self::new(key, Vec::new())
    }

    pub fn key(&self) -> BatchKey {
        self.key
    }

    /// Items in source order.
    pub fn items(&self) -> &[ReferencedItem] {
        &self.items
    }

    /// Consume into the item list, in source order.
    pub fn into_items(self) -> Vec<ReferencedItem> {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &RefId) -> Option<&ReferencedItem> {
        self.index.get(id).map(|&pos| &self.items[pos])
    }

    pub fn contains(&self, id: &RefId) -> bool {
        self.index.contains_key(id)
    }

    /// Ids present in this batch, in item order.
    pub fn ids(&self) -> impl Iterator<Item = &RefId> {
        self.items.iter().map(|item| &item.id)
    }

    /// Which of `requested` this batch does not cover.
    pub fn missing<'a>(&self, requested: &'a [RefId]) -> Vec<&'a RefId> {
        requested.iter().filter(|id| !self.contains(id)).collect()
    }
}

// ============================================================================
// Tests
// ============================================================================
