//! Scholia interaction layer
//!
//! Provides the hover/lock state machine that keeps the report text and the
//! reference panel in sync, plus the pure projections the rendering shell
//! reads. The shell feeds [`ViewerEvent`]s in and renders whatever
//! [`project_panel`] and [`fragment_highlighted`] say; it never touches
//! state directly.

pub mod events;
pub mod projection;
pub mod state;

pub use events::{NavigationRequest, ViewEffect, ViewerEvent};
pub use projection::{PanelEntry, fragment_highlighted, item_highlighted, project_panel};
pub use state::{InteractionState, ViewMode};
