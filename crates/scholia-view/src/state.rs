//! Hover/lock interaction state machine.
//!
//! One [`InteractionState`] exists per displayed document, replaced
//! wholesale (never merged) when a new report loads. All transitions are
//! pure reducer applications of a [`ViewerEvent`]; the rendering layer only
//! reads projections and never mutates state directly.
//!
//! # State Machine
//!
//! ```text
//! +-----------------+
//! |      Idle       | hovered={}, locked={}, mode=All
//! +--------+--------+
//!          | SentenceHoverEnter(ids)
//!          v
//! +-----------------+  SentenceHoverLeave   +-----------------+
//! |    Hovering     |---------------------->|     Locked      |
//! | hovered=locked= |                       | hovered={}      |
//! | ids, mode=      |<----------------------| locked=ids      |
//! | Preview         |  SentenceHoverEnter   | mode=Preview    |
//! +--------+--------+  (new ids overwrite)  +--------+--------+
//!          |                                         |
//!          |            ShowAllRequested             |
//!          +-------------------+---------------------+
//!                              v
//!                    back to Idle (the only road to mode=All)
//! ```
//!
//! The lock is hover-driven, not click-driven: moving the pointer off a
//! citation keeps its papers in the panel until a different citation is
//! hovered or show-all resets the view. Clicking is navigation and leaves
//! the lock untouched. Panel-item hover (`hovered_item`) is an orthogonal
//! reverse-highlight signal that no sentence transition touches.

use std::str::FromStr;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use strum::EnumString;
use tracing::trace;

use scholia_types::{RefId, ReferencedItem};

use crate::events::{NavigationRequest, ViewEffect, ViewerEvent};

/// Which items the panel shows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum ViewMode {
    /// Every loaded item, in store order.
    #[default]
    All,
    /// Only the locked subset.
    Preview,
}

impl ViewMode {
    /// Parse from string (case-insensitive).
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        <Self as FromStr>::from_str(s).ok()
    }

    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewMode::All => "all",
            ViewMode::Preview => "preview",
        }
    }
}

impl std::fmt::Display for ViewMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The single mutable value behind the viewer.
///
/// Ephemeral by design: created fresh per document, never persisted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InteractionState {
    /// Ids of the citation sentence currently under the pointer.
    hovered: IndexSet<RefId>,
    /// Sticky panel subset: survives hover leave, cleared only by show-all
    /// or overwritten by the next hover.
    locked: IndexSet<RefId>,
    /// Panel filter mode.
    view_mode: ViewMode,
    /// Panel item under the pointer (reverse highlight), if any.
    hovered_item: Option<RefId>,
}

impl InteractionState {
    /// Fresh idle state: nothing hovered, nothing locked, mode All.
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently hovered sentence ids.
    pub fn hovered(&self) -> &IndexSet<RefId> {
        &self.hovered
    }

    /// The sticky locked set shown in Preview mode.
    pub fn locked(&self) -> &IndexSet<RefId> {
        &self.locked
    }

    /// Current panel filter mode.
    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    /// Panel item currently hovered, if any.
    pub fn hovered_item(&self) -> Option<&RefId> {
        self.hovered_item.as_ref()
    }

    /// Whether the state is indistinguishable from a fresh one.
    pub fn is_idle(&self) -> bool {
        self == &Self::default()
    }

    /// Replace this state wholesale with the idle state.
    ///
    /// Call when a new document loads; hover and lock sets from the old
    /// report must never leak into the new one.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Apply a single viewer event. This is the primary consumer API.
    ///
    /// `loaded` is the reference store result as currently known; it is
    /// only consulted for click resolution and may be empty or partial at
    /// any time.
    pub fn apply(&mut self, event: &ViewerEvent, loaded: &[ReferencedItem]) -> ViewEffect {
        match event {
            ViewerEvent::SentenceHoverEnter { ref_ids } => {
                self.hovered = ref_ids.iter().cloned().collect();
                self.locked = self.hovered.clone();
                self.view_mode = ViewMode::Preview;
                trace!("hover enter: {} ids locked", self.locked.len());
                ViewEffect::Updated
            }

            ViewerEvent::SentenceHoverLeave => {
                // Lock and mode stay; the panel remains sticky on the
                // last-hovered set.
                self.hovered.clear();
                ViewEffect::Updated
            }

            ViewerEvent::SentenceClick { ref_ids } => {
                // Navigation only; no state transition.
                let selected = ref_ids
                    .iter()
                    .find(|id| loaded.iter().any(|item| item.id == **id));
                match selected {
                    Some(id) => {
                        trace!("click resolved to {id}");
                        ViewEffect::Navigate(NavigationRequest {
                            selected: id.clone(),
                            ordered: loaded.iter().map(|item| item.id.clone()).collect(),
                        })
                    }
                    None => {
                        trace!("click on {} ids resolved to no loaded item", ref_ids.len());
                        ViewEffect::Ignored
                    }
                }
            }

            ViewerEvent::PanelItemHoverEnter { item_id } => {
                self.hovered_item = Some(item_id.clone());
                ViewEffect::Updated
            }

            ViewerEvent::PanelItemHoverLeave => {
                self.hovered_item = None;
                ViewEffect::Updated
            }

            ViewerEvent::ShowAllRequested => {
                // The only transition back to All. Panel-item hover is
                // orthogonal and survives.
                self.hovered.clear();
                self.locked.clear();
                self.view_mode = ViewMode::All;
                trace!("show all: lock cleared");
                ViewEffect::Updated
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
