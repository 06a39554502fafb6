//! Reader sessions: one displayed report, end to end.
//!
//! A [`ReaderSession`] owns everything the viewer needs for the report on
//! screen: the parsed document, the interaction state, and the reference
//! items loaded for its citations. Loading a new report replaces all of it
//! wholesale and hands back a [`PendingFetch`] describing the batch the
//! caller should resolve (normally through
//! [`ReferenceCache`](crate::ReferenceCache)).
//!
//! Fetch results are keyed: a result for a batch key other than the
//! session's current one belongs to a report that is no longer displayed
//! and is discarded as [`SessionEffect::Ignored`]. This is what keeps a
//! slow fetch for the previous report from clobbering the current one.

use tracing::{debug, info};

use scholia_model::Document;
use scholia_types::{RefId, ReferencedItem, ReportId};
use scholia_view::{
    InteractionState, PanelEntry, ViewEffect, ViewerEvent, fragment_highlighted, project_panel,
};

use crate::batch::{BatchKey, RefBatch};

/// A reference batch the session needs resolved.
///
/// `ids` are the document's citation ids in first-appearance order; `key`
/// is their batch identity, which [`ReaderSession::apply_fetched`] checks
/// results against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingFetch {
    pub key: BatchKey,
    pub ids: Vec<RefId>,
}

/// What installing a fetch result did to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEffect {
    /// The result matched the current report; items are installed.
    Updated { item_count: usize },
    /// The result was for a superseded report and was dropped.
    Ignored,
}

/// All viewer-side state for one displayed report.
pub struct ReaderSession {
    report_id: ReportId,
    document: Document,
    state: InteractionState,
    batch_key: BatchKey,
    loaded: Vec<ReferencedItem>,
}

impl ReaderSession {
    /// An empty session showing no report.
    pub fn new() -> Self {
        Self {
            report_id: ReportId::new(),
            document: Document::default(),
            state: InteractionState::new(),
            batch_key: BatchKey::of(&[]),
            loaded: Vec::new(),
        }
    }

    /// Replace the displayed report with `raw`.
    ///
    /// Parses the text, resets interaction state, and drops the previous
    /// report's items. Returns the fetch the caller should run, or `None`
    /// when the report cites nothing.
    pub fn load_report(&mut self, raw: Option<&str>) -> Option<PendingFetch> {
        self.report_id = ReportId::new();
        self.document = Document::parse_opt(raw);
        self.state.reset();
        self.loaded.clear();

        let ids: Vec<RefId> = self.document.global_ref_ids().into_iter().collect();
        self.batch_key = BatchKey::of(&ids);
        info!(
            report = %self.report_id.short(),
            blocks = self.document.block_count(),
            refs = ids.len(),
            "report loaded"
        );

        if ids.is_empty() {
            None
        } else {
            Some(PendingFetch {
                key: self.batch_key,
                ids,
            })
        }
    }

    /// Install a resolved reference batch, if it is still the one wanted.
    pub fn apply_fetched(&mut self, key: BatchKey, items: Vec<ReferencedItem>) -> SessionEffect {
        if key != self.batch_key {
            debug!(%key, current = %self.batch_key, "stale fetch result discarded");
            return SessionEffect::Ignored;
        }
        let item_count = items.len();
        self.loaded = items;
        debug!(items = item_count, "reference items installed");
        SessionEffect::Updated { item_count }
    }

    /// [`apply_fetched`](Self::apply_fetched) for a whole [`RefBatch`].
    pub fn apply_batch(&mut self, batch: RefBatch) -> SessionEffect {
        self.apply_fetched(batch.key(), batch.into_items())
    }

    /// Feed one viewer event through the interaction reducer.
    pub fn handle(&mut self, event: &ViewerEvent) -> ViewEffect {
        self.state.apply(event, &self.loaded)
    }

    /// Project the reference panel for the current state.
    pub fn panel(&self) -> Vec<PanelEntry<'_>> {
        project_panel(&self.loaded, &self.state)
    }

    /// Whether a citation sentence carrying `ref_ids` should highlight.
    pub fn fragment_highlighted(&self, ref_ids: &[RefId]) -> bool {
        fragment_highlighted(ref_ids, &self.state)
    }

    /// Identity of the displayed report; changes on every load.
    pub fn report_id(&self) -> ReportId {
        self.report_id
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    /// Reference items as currently loaded, in store order.
    pub fn loaded(&self) -> &[ReferencedItem] {
        &self.loaded
    }

    /// Batch identity of the current report's citation set.
    pub fn batch_key(&self) -> BatchKey {
        self.batch_key
    }
}

impl Default for ReaderSession {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
