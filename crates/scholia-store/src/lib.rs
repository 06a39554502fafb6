//! Reference store for Scholia
//!
//! Resolves a report's citation ids to full paper records and keeps the
//! result bound to the report that asked for it. The moving parts:
//!
//! - [`ReferenceSource`]: the async seam to whatever holds the bibliography
//! - [`ReferenceCache`]: batch cache with in-flight request deduplication
//! - [`ReaderSession`]: one displayed report's document, interaction state,
//!   and loaded items, with stale fetch results keyed out
//!
//! ```text
//! session.load_report(text)
//!     |
//!     v
//! PendingFetch { key, ids } --> cache.fetch(&ids) --> source.fetch_batch
//!                                     |
//!     +-------------------------------+
//!     v
//! session.apply_batch(batch)    key matches  -> items installed
//!                               key differs  -> dropped (old report)
//! ```

pub mod batch;
pub mod cache;
pub mod session;
pub mod source;

pub use batch::{BatchKey, RefBatch};
pub use cache::{FetchError, ReferenceCache};
pub use session::{PendingFetch, ReaderSession, SessionEffect};
pub use source::{InMemorySource, ReferenceSource, SourceError};

#[cfg(test)]
mod tests {
    use scholia_types::{RefId, ReferencedItem};
    use scholia_view::{ViewEffect, ViewerEvent};

    use super::*;

    fn seeded_cache() -> ReferenceCache<InMemorySource> {
        let source = InMemorySource::new();
        source.extend([
            ReferencedItem::new("2501.00001", "Temporal Consistency in Video Diffusion")
                .with_year(2025),
            ReferencedItem::new("2501.00002", "Minute-Long Generation").with_year(2025),
            ReferencedItem::new("2501.00003", "Physics Benchmarks").with_year(2024),
        ]);
        ReferenceCache::new(source)
    }

    // ── Load, fetch, render ─────────────────────────────────────────────

    #[tokio::test]
    async fn test_report_load_fetch_and_render_flow() {
        let cache = seeded_cache();
        let mut session = ReaderSession::new();

        let pending = session
            .load_report(Some(
                "# 视频生成月报\n\
                 时序一致性显著改善<ref id=\"p2501.00003\"><ref id=\"p2501.00001\">。\n\
                 - 长视频突破一分钟<ref id=\"p2501.00002\">！ 多团队复现。",
            ))
            .unwrap();
        assert_eq!(pending.ids.len(), 3);

        let batch = cache.fetch(&pending.ids).await.unwrap();
        assert_eq!(
            session.apply_batch(batch),
            SessionEffect::Updated { item_count: 3 }
        );

        // Panel follows source storage order, not citation order.
        let panel = session.panel();
        let titles: Vec<&str> = panel.iter().map(|e| e.item.title.as_str()).collect();
        assert_eq!(
            titles,
            [
                "Temporal Consistency in Video Diffusion",
                "Minute-Long Generation",
                "Physics Benchmarks",
            ]
        );

        // Hovering the first paragraph's citation narrows the panel.
        session.handle(&ViewerEvent::SentenceHoverEnter {
            ref_ids: vec![RefId::new("2501.00003"), RefId::new("2501.00001")],
        });
        assert_eq!(session.panel().len(), 2);

        // Clicking navigates to the first clicked id that is loaded.
        let effect = session.handle(&ViewerEvent::SentenceClick {
            ref_ids: vec![RefId::new("2501.00003"), RefId::new("2501.00001")],
        });
        match effect {
            ViewEffect::Navigate(req) => {
                assert_eq!(req.selected, RefId::new("2501.00003"));
                assert_eq!(req.ordered.len(), 3);
            }
            other => panic!("expected navigation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unknown_ids_are_absent_from_the_panel() {
        let cache = seeded_cache();
        let mut session = ReaderSession::new();

        let pending = session
            .load_report(Some(
                "已知<ref id=\"p2501.00001\">与未知<ref id=\"p9999.00000\">并存。",
            ))
            .unwrap();
        assert_eq!(pending.ids.len(), 2);

        let batch = cache.fetch(&pending.ids).await.unwrap();
        assert_eq!(batch.missing(&pending.ids), [&RefId::new("9999.00000")]);

        session.apply_batch(batch);
        let panel = session.panel();
        assert_eq!(panel.len(), 1);
        assert_eq!(panel[0].item.id, RefId::new("2501.00001"));
    }

    // ── Report switching ────────────────────────────────────────────────

    #[tokio::test]
    async fn test_late_fetch_for_previous_report_is_dropped() {
        let cache = seeded_cache();
        let mut session = ReaderSession::new();

        let first = session
            .load_report(Some("旧报告<ref id=\"p2501.00001\">。"))
            .unwrap();
        let second = session
            .load_report(Some("新报告<ref id=\"p2501.00002\">。"))
            .unwrap();

        // The old report's fetch completes only after the switch.
        let stale = cache.fetch(&first.ids).await.unwrap();
        assert_eq!(session.apply_batch(stale), SessionEffect::Ignored);
        assert!(session.loaded().is_empty());

        let current = cache.fetch(&second.ids).await.unwrap();
        assert_eq!(
            session.apply_batch(current),
            SessionEffect::Updated { item_count: 1 }
        );
        assert_eq!(session.loaded()[0].id, RefId::new("2501.00002"));
    }

    #[tokio::test]
    async fn test_revisited_report_hits_the_cache() {
        let cache = seeded_cache();
        let mut session = ReaderSession::new();
        let text = "反复打开的报告<ref id=\"p2501.00001\">。";

        let first = session.load_report(Some(text)).unwrap();
        cache.fetch(&first.ids).await.unwrap();

        // Same citation set, same key: the second visit is a cache hit.
        let second = session.load_report(Some(text)).unwrap();
        assert_eq!(first.key, second.key);
        assert_eq!(cache.len(), 1);

        let batch = cache.fetch(&second.ids).await.unwrap();
        assert_eq!(
            session.apply_batch(batch),
            SessionEffect::Updated { item_count: 1 }
        );
    }
}
