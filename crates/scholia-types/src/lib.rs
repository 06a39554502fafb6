//! Shared identity and reference types for Scholia.
//!
//! This crate is the vocabulary foundation: citation ids, report view ids,
//! and the resolved paper record. It has **no internal scholia dependencies**,
//! a pure leaf crate that the model, view, and store crates build on.
//!
//! # Entity Overview
//!
//! ```text
//! Report view (ReportId) <- one displayed report
//!     |- parses to Document (scholia-model), which carries RefIds only
//!     |- resolves RefIds through a reference store (scholia-store)
//!
//! RefId <- normalized citation id (arXiv-style, e.g. 2512.04207)
//!     |- extracted from inline <ref id="..."> markers
//!     |- keys ReferencedItem lookup and panel membership
//!
//! ReferencedItem <- the paper record a store resolves for a RefId
//! ```
//!
//! # Key Types
//!
//! |--------------------|--------------------------------------------|
//! | Type               | Purpose                                    |
//! |--------------------|--------------------------------------------|
//! | [`RefId`]          | Which paper a citation points at           |
//! | [`ReportId`]       | Which displayed report view                |
//! | [`ReferencedItem`] | Resolved paper record (title + metadata)   |
//! |--------------------|--------------------------------------------|

pub mod ids;
pub mod item;

// Re-export primary types at crate root for convenience.
pub use ids::{RefId, ReportId};
pub use item::ReferencedItem;
