//! Keyed, deduplicating reference fetch cache.
//!
//! One report view needs one batch of papers, identified by the
//! [`BatchKey`] of its citation id set. The cache guarantees at most one
//! in-flight source request per key: the first caller becomes the
//! fetcher, later callers for the same key await its outcome instead of
//! refetching. Completed batches are served until they age past the
//! stale window, then the next caller refreshes them. Errors are never
//! cached; a failed key is retried by whoever asks next.
//!
//! ```text
//!  fetch(ids)             entries: HashMap<BatchKey, Entry>
//!     |                        |
//!     |-- absent / stale ----->| install InFlight, call source,
//!     |                        | publish the result to waiters
//!     |-- in flight ---------->| await the fetcher's watch channel
//!     |-- ready + fresh ------>| clone the batch, no source call
//! ```
//!
//! The fetcher publishes through a `tokio::sync::watch` channel stored in
//! its entry. If the fetcher's future is dropped mid-request, the channel
//! closes without a value and a waiting caller takes the fetch over.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, trace, warn};

use scholia_types::RefId;

use crate::batch::{BatchKey, RefBatch};
use crate::source::{ReferenceSource, SourceError};

/// How long a completed batch is served before a fetch refreshes it.
/// Paper metadata is close to immutable, so the window is generous.
const DEFAULT_STALE_AFTER: Duration = Duration::from_secs(5 * 60);

/// Error from a cached batch fetch.
///
/// Cloneable so one failure can fan out to every caller that was awaiting
/// the same in-flight request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The reference source failed the lookup.
    #[error(transparent)]
    Source(#[from] SourceError),
}

/// What a fetcher publishes: `None` until the source call resolves.
type Published = Option<Result<RefBatch, FetchError>>;

/// One slot in the cache map.
enum Entry {
    /// A fetch for this key is running; subscribe for its outcome.
    InFlight(watch::Receiver<Published>),
    /// A completed batch, served until it ages out.
    Ready { batch: RefBatch, fetched_at: Instant },
}

/// What a caller must do after inspecting the map.
enum Role {
    Fetch(watch::Sender<Published>),
    Wait(watch::Receiver<Published>),
}

/// Batch cache in front of a [`ReferenceSource`].
///
/// Safe to share across tasks; the entry map lock is never held across an
/// await.
pub struct ReferenceCache<S> {
    source: S,
    entries: Mutex<HashMap<BatchKey, Entry>>,
    stale_after: Duration,
}

impl<S: ReferenceSource> ReferenceCache<S> {
    /// Wrap a source with the default stale window.
    pub fn new(source: S) -> Self {
        Self::with_stale_after(source, DEFAULT_STALE_AFTER)
    }

    /// Wrap a source with an explicit stale window. `Duration::ZERO`
    /// disables reuse entirely: every fetch hits the source.
    pub fn with_stale_after(source: S, stale_after: Duration) -> Self {
        Self {
            source,
            entries: Mutex::new(HashMap::new()),
            stale_after,
        }
    }

    /// Resolve the batch for `ids`, deduplicating concurrent requests.
    ///
    /// The returned batch may be partial: ids the source does not know are
    /// absent from it, not errors.
    pub async fn fetch(&self, ids: &[RefId]) -> Result<RefBatch, FetchError> {
        let key = BatchKey::of(ids);
        loop {
            let role = {
                let mut entries = self.entries.lock();
                match entries.get(&key) {
                    Some(Entry::Ready { batch, fetched_at })
                        if fetched_at.elapsed() < self.stale_after =>
                    {
                        trace!(%key, "cache hit");
                        return Ok(batch.clone());
                    }
                    Some(Entry::InFlight(rx)) => Role::Wait(rx.clone()),
                    // Absent or stale: this caller becomes the fetcher.
                    Some(Entry::Ready { .. }) | None => {
                        let (tx, rx) = watch::channel(None);
                        entries.insert(key, Entry::InFlight(rx));
                        Role::Fetch(tx)
                    }
                }
            };

            match role {
                Role::Fetch(tx) => return self.run_fetch(key, ids, tx).await,
                Role::Wait(rx) => {
                    if let Some(result) = self.await_fetcher(key, rx).await {
                        return result;
                    }
                    // Fetcher vanished without publishing; take over.
                }
            }
        }
    }

    /// Drive the source call for a key and publish the outcome.
    async fn run_fetch(
        &self,
        key: BatchKey,
        ids: &[RefId],
        tx: watch::Sender<Published>,
    ) -> Result<RefBatch, FetchError> {
        debug!(%key, ids = ids.len(), "fetching reference batch");
        let result = match self.source.fetch_batch(ids).await {
            Ok(items) => {
                let batch = RefBatch::new(key, items);
                debug!(%key, items = batch.len(), "reference batch resolved");
                Ok(batch)
            }
            Err(e) => {
                warn!(%key, "reference batch fetch failed: {e}");
                Err(FetchError::from(e))
            }
        };

        {
            let mut entries = self.entries.lock();
            match &result {
                Ok(batch) => {
                    entries.insert(
                        key,
                        Entry::Ready {
                            batch: batch.clone(),
                            fetched_at: Instant::now(),
                        },
                    );
                }
                // Errors are not cached; the next caller retries.
                Err(_) => {
                    entries.remove(&key);
                }
            }
        }

        // Send fails only when no waiter is subscribed.
        let _ = tx.send(Some(result.clone()));
        result
    }

    /// Await the in-flight fetcher's published result.
    ///
    /// `None` means the fetcher was dropped before publishing; the caller
    /// restarts the fetch itself. The dead entry is cleared here unless a
    /// new fetch round already replaced it.
    async fn await_fetcher(
        &self,
        key: BatchKey,
        mut rx: watch::Receiver<Published>,
    ) -> Option<Result<RefBatch, FetchError>> {
        loop {
            if let Some(result) = rx.borrow_and_update().clone() {
                trace!(%key, "joined in-flight fetch");
                return Some(result);
            }
            if rx.changed().await.is_err() {
                debug!(%key, "in-flight fetch dropped, taking over");
                let mut entries = self.entries.lock();
                if let Some(Entry::InFlight(stored)) = entries.get(&key) {
                    // has_changed errors iff the sender died without a
                    // value, i.e. this is still the dead entry.
                    if stored.has_changed().is_err() {
                        entries.remove(&key);
                    }
                }
                return None;
            }
        }
    }

    /// Drop the entry for one key; the next fetch hits the source.
    pub fn invalidate(&self, key: BatchKey) {
        self.entries.lock().remove(&key);
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Number of keys currently tracked, ready or in flight.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// The wrapped source.
    pub fn source(&self) -> &S {
        &self.source
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use async_trait::async_trait;
    use tokio::sync::Semaphore;

    use scholia_types::ReferencedItem;

    use super::*;
    use crate::source::InMemorySource;

    fn ids(raw: &[&str]) -> Vec<RefId> {
        raw.iter().map(|s| RefId::new(*s)).collect()
    }

    /// Source that counts calls and blocks each one on a semaphore gate,
    /// so tests control exactly when a fetch resolves.
    struct GatedSource {
        inner: InMemorySource,
        gate: Semaphore,
        started: AtomicUsize,
        fail: AtomicBool,
    }

    impl GatedSource {
        fn seeded(papers: &[(&str, &str)]) -> Self {
            let inner = InMemorySource::new();
            inner.extend(
                papers
                    .iter()
                    .map(|(id, title)| ReferencedItem::new(*id, *title)),
            );
            Self {
                inner,
                gate: Semaphore::new(0),
                started: AtomicUsize::new(0),
                fail: AtomicBool::new(false),
            }
        }

        fn started(&self) -> usize {
            self.started.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ReferenceSource for GatedSource {
        async fn fetch_batch(&self, ids: &[RefId]) -> Result<Vec<ReferencedItem>, SourceError> {
            self.started.fetch_add(1, Ordering::SeqCst);
            let permit = self
                .gate
                .acquire()
                .await
                .map_err(|_| SourceError::Unavailable("gate closed".to_string()))?;
            permit.forget();
            if self.fail.load(Ordering::SeqCst) {
                return Err(SourceError::Lookup("index offline".to_string()));
            }
            self.inner.fetch_batch(ids).await
        }
    }

    /// Source that always succeeds immediately, counting calls.
    #[derive(Default)]
    struct CountingSource {
        inner: InMemorySource,
        calls: AtomicUsize,
    }

    impl CountingSource {
        fn seeded(papers: &[(&str, &str)]) -> Self {
            let inner = InMemorySource::new();
            inner.extend(
                papers
                    .iter()
                    .map(|(id, title)| ReferencedItem::new(*id, *title)),
            );
            Self {
                inner,
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ReferenceSource for CountingSource {
        async fn fetch_batch(&self, ids: &[RefId]) -> Result<Vec<ReferencedItem>, SourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.fetch_batch(ids).await
        }
    }

    /// Spin until the gated source has seen `n` fetch starts.
    async fn wait_for_started(cache: &ReferenceCache<GatedSource>, n: usize) {
        while cache.source().started() < n {
            tokio::task::yield_now().await;
        }
    }

    // ── Hit / refresh behavior ──────────────────────────────────────────

    #[tokio::test]
    async fn test_fresh_entry_is_served_without_refetch() {
        let cache = ReferenceCache::new(CountingSource::seeded(&[("1", "One")]));
        let wanted = ids(&["1"]);

        let first = cache.fetch(&wanted).await.unwrap();
        let second = cache.fetch(&wanted).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.len(), 1);
        assert_eq!(cache.source().calls(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_stale_entry_is_refetched() {
        let cache = ReferenceCache::with_stale_after(
            CountingSource::seeded(&[("1", "One")]),
            Duration::ZERO,
        );
        let wanted = ids(&["1"]);

        cache.fetch(&wanted).await.unwrap();
        cache.fetch(&wanted).await.unwrap();

        assert_eq!(cache.source().calls(), 2);
    }

    #[tokio::test]
    async fn test_distinct_key_sets_fetch_independently() {
        let cache = ReferenceCache::new(CountingSource::seeded(&[("1", "One"), ("2", "Two")]));

        let a = cache.fetch(&ids(&["1"])).await.unwrap();
        let b = cache.fetch(&ids(&["2"])).await.unwrap();

        assert_ne!(a.key(), b.key());
        assert_eq!(cache.source().calls(), 2);
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test]
    async fn test_key_order_does_not_refetch() {
        let cache = ReferenceCache::new(CountingSource::seeded(&[("1", "One"), ("2", "Two")]));

        cache.fetch(&ids(&["1", "2"])).await.unwrap();
        cache.fetch(&ids(&["2", "1"])).await.unwrap();

        assert_eq!(cache.source().calls(), 1);
    }

    #[tokio::test]
    async fn test_partial_batch_is_cached_as_is() {
        let cache = ReferenceCache::new(CountingSource::seeded(&[("1", "One")]));
        let wanted = ids(&["1", "unknown"]);

        let batch = cache.fetch(&wanted).await.unwrap();

        assert_eq!(batch.len(), 1);
        assert_eq!(batch.missing(&wanted), [&RefId::new("unknown")]);
    }

    #[tokio::test]
    async fn test_invalidate_forces_refetch() {
        let cache = ReferenceCache::new(CountingSource::seeded(&[("1", "One")]));
        let wanted = ids(&["1"]);

        let batch = cache.fetch(&wanted).await.unwrap();
        cache.invalidate(batch.key());
        cache.fetch(&wanted).await.unwrap();

        assert_eq!(cache.source().calls(), 2);
    }

    #[tokio::test]
    async fn test_clear_empties_the_cache() {
        let cache = ReferenceCache::new(CountingSource::seeded(&[("1", "One"), ("2", "Two")]));
        cache.fetch(&ids(&["1"])).await.unwrap();
        cache.fetch(&ids(&["2"])).await.unwrap();

        cache.clear();

        assert!(cache.is_empty());
        cache.fetch(&ids(&["1"])).await.unwrap();
        assert_eq!(cache.source().calls(), 3);
    }

    // ── In-flight dedup ─────────────────────────────────────────────────

    #[tokio::test]
    async fn test_concurrent_fetches_share_one_source_call() {
        let cache = Arc::new(ReferenceCache::new(GatedSource::seeded(&[
            ("1", "One"),
            ("2", "Two"),
        ])));
        let wanted = ids(&["1", "2"]);

        let first = tokio::spawn({
            let cache = cache.clone();
            let wanted = wanted.clone();
            async move { cache.fetch(&wanted).await }
        });
        wait_for_started(&cache, 1).await;

        let second = tokio::spawn({
            let cache = cache.clone();
            let wanted = wanted.clone();
            async move { cache.fetch(&wanted).await }
        });
        // Let the second caller park on the in-flight channel.
        tokio::task::yield_now().await;
        cache.source().gate.add_permits(1);

        let a = first.await.unwrap().unwrap();
        let b = second.await.unwrap().unwrap();

        assert_eq!(a, b);
        assert_eq!(a.len(), 2);
        assert_eq!(cache.source().started(), 1);
    }

    #[tokio::test]
    async fn test_waiter_takes_over_dropped_fetch() {
        let cache = Arc::new(ReferenceCache::new(GatedSource::seeded(&[("1", "One")])));
        let wanted = ids(&["1"]);

        let first = tokio::spawn({
            let cache = cache.clone();
            let wanted = wanted.clone();
            async move { cache.fetch(&wanted).await }
        });
        wait_for_started(&cache, 1).await;

        // Drop the fetcher mid-request; its watch channel closes empty.
        first.abort();
        let _ = first.await;

        let second = tokio::spawn({
            let cache = cache.clone();
            let wanted = wanted.clone();
            async move { cache.fetch(&wanted).await }
        });
        wait_for_started(&cache, 2).await;
        cache.source().gate.add_permits(1);

        let batch = second.await.unwrap().unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(cache.source().started(), 2);
    }

    // ── Errors ──────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_error_fans_out_to_waiters_and_is_not_cached() {
        let cache = Arc::new(ReferenceCache::new(GatedSource::seeded(&[("1", "One")])));
        cache.source().fail.store(true, Ordering::SeqCst);
        let wanted = ids(&["1"]);

        let first = tokio::spawn({
            let cache = cache.clone();
            let wanted = wanted.clone();
            async move { cache.fetch(&wanted).await }
        });
        wait_for_started(&cache, 1).await;

        let second = tokio::spawn({
            let cache = cache.clone();
            let wanted = wanted.clone();
            async move { cache.fetch(&wanted).await }
        });
        tokio::task::yield_now().await;
        cache.source().gate.add_permits(1);

        // Both callers of the shared round get the same error.
        let a = first.await.unwrap().unwrap_err();
        let b = second.await.unwrap().unwrap_err();
        assert_eq!(a, b);
        assert!(matches!(a, FetchError::Source(SourceError::Lookup(_))));
        assert_eq!(cache.source().started(), 1);

        // The failure was not cached: a later fetch retries and succeeds.
        cache.source().fail.store(false, Ordering::SeqCst);
        cache.source().gate.add_permits(1);
        let batch = cache.fetch(&wanted).await.unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(cache.source().started(), 2);
    }

    #[test]
    fn test_fetch_error_displays_source_message() {
        let err = FetchError::from(SourceError::Unavailable("index offline".to_string()));
        assert_eq!(err.to_string(), "reference source unavailable: index offline");
    }

    #[tokio::test]
    async fn test_empty_id_set_resolves_to_empty_batch() {
        let cache = ReferenceCache::new(CountingSource::seeded(&[("1", "One")]));
        let batch = cache.fetch(&[]).await.unwrap();
        assert!(batch.is_empty());
        assert_eq!(batch.key(), BatchKey::of(&[]));
    }
}
