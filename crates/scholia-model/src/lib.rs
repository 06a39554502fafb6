//! Sentence-granular document model and citation parser for Scholia.
//!
//! Turns loosely structured, marker-annotated report text into a stable
//! [`Document`] the viewer can render and hover over. Parsing is total and
//! pure: any string yields a document, malformed input degrades to plain
//! text, and identical input always yields structurally identical output.
//!
//! # Design Philosophy
//!
//! Content is structured as blocks of sentence fragments, not flat text.
//! This enables:
//! - Hover targets at sentence granularity (one citation group per sentence)
//! - Stable reference ids per fragment for panel synchronization
//! - Line-level block kinds (heading, paragraph, list item) without a
//!   markdown engine
//!
//! # Pipeline
//!
//! ```text
//! raw text
//!   -> lines            (trim; blanks dropped)
//!   -> blocks           ('#' run / "- " / "* " / plain, one line each)
//!   -> sentences        (。？！?! + following whitespace)
//!   -> fragments        (Text, or Citation with ordered normalized ids)
//! ```
//!
//! The inline marker grammar is `<ref id="...">` with a non-empty id.
//! Ids are normalized by stripping one leading `p` (`p2512.04207` becomes
//! `2512.04207`). Closing `</ref>` tags are not part of the grammar and
//! pass through into fragment text verbatim.

mod document;
mod parser;

pub use document::{Block, BlockKind, Document, Fragment};
