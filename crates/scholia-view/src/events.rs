//! Viewer events and reducer effects.
//!
//! Provides [`ViewerEvent`], the typed enum of everything the rendering
//! shell can report (sentence hovers, clicks, panel hovers, the show-all
//! control), and [`ViewEffect`], what applying one event produced. The
//! shell translates raw pointer events into these; the reducer in
//! [`InteractionState`](crate::InteractionState) is the only consumer.

use scholia_types::RefId;

/// Events the rendering shell feeds into the interaction reducer.
///
/// Every event is defined in every state; there is no invalid-transition
/// path and no terminal state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViewerEvent {
    /// Pointer entered a citation sentence carrying these ids.
    SentenceHoverEnter { ref_ids: Vec<RefId> },
    /// Pointer left the citation sentence.
    SentenceHoverLeave,
    /// Citation sentence was clicked; ids in source order.
    SentenceClick { ref_ids: Vec<RefId> },
    /// Pointer entered a panel item.
    PanelItemHoverEnter { item_id: RefId },
    /// Pointer left the panel item.
    PanelItemHoverLeave,
    /// The show-all control was activated.
    ShowAllRequested,
}

/// What applying a [`ViewerEvent`] produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViewEffect {
    /// State changed; re-project the panel and text highlights.
    Updated,
    /// A clicked citation resolved to a loaded item; open it.
    Navigate(NavigationRequest),
    /// Nothing to do (e.g. a click on ids with no loaded item).
    Ignored,
}

/// Request handed to the navigation collaborator on a citation click.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavigationRequest {
    /// The item to open: first clicked id that is actually loaded.
    pub selected: RefId,
    /// Ids of every loaded item, in store order, for prev/next paging.
    pub ordered: Vec<RefId>,
}
