//! Pure projections from interaction state to view data.
//!
//! [`project_panel`] computes the reference panel's item list and per-item
//! highlight flags; [`fragment_highlighted`] is the reverse direction, the
//! text side asking whether a citation fragment should light up. Both are
//! pure functions of `(loaded items, state)`: identical inputs give
//! identical ordered output, and they tolerate an empty or partial loaded
//! set at any time (fetch still pending, or partially failed).

use scholia_types::{RefId, ReferencedItem};

use crate::state::{InteractionState, ViewMode};

/// One row of the projected reference panel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PanelEntry<'a> {
    /// The resolved paper record.
    pub item: &'a ReferencedItem,
    /// Whether the row should render highlighted.
    pub highlighted: bool,
}

/// Project the panel's rows from the loaded items and the current state.
///
/// Mode All shows every loaded item; Preview shows the locked subset. Both
/// preserve the loaded (store) order, never lock order. Ids that are locked
/// or hovered but missing from `loaded` are silently omitted: no
/// placeholder, no highlight, no error.
pub fn project_panel<'a>(
    loaded: &'a [ReferencedItem],
    state: &InteractionState,
) -> Vec<PanelEntry<'a>> {
    loaded
        .iter()
        .filter(|item| match state.view_mode() {
            ViewMode::All => true,
            ViewMode::Preview => state.locked().contains(&item.id),
        })
        .map(|item| PanelEntry {
            item,
            highlighted: item_highlighted(&item.id, state),
        })
        .collect()
}

/// Whether a single panel item should render highlighted: it is in the
/// hovered sentence's id set, or it is the panel row under the pointer.
pub fn item_highlighted(id: &RefId, state: &InteractionState) -> bool {
    state.hovered().contains(id) || state.hovered_item() == Some(id)
}

/// Whether a citation fragment should render highlighted: any of its ids is
/// hovered, or the panel row under the pointer is one of its ids.
pub fn fragment_highlighted(ref_ids: &[RefId], state: &InteractionState) -> bool {
    ref_ids.iter().any(|id| state.hovered().contains(id))
        || state
            .hovered_item()
            .is_some_and(|item_id| ref_ids.contains(item_id))
}

// ============================================================================
// Tests
// ============================================================================
