//! Block and fragment document model.
//!
//! A [`Document`] is an ordered list of [`Block`]s, one per non-blank source
//! line. Each block holds sentence-level [`Fragment`]s; a fragment is either
//! plain text or a citation carrying the reference ids extracted from its
//! inline markers. Documents are immutable once parsed: there is no mutating
//! API, a new report is a new `Document`.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::EnumString;

use scholia_types::RefId;

use crate::parser;

/// What a block *is* (line classification).
///
/// Deliberately small. Heading depth is a companion field on [`Block`],
/// only meaningful for Heading blocks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(ascii_case_insensitive)]
pub enum BlockKind {
    /// Section heading (`#` run at line start).
    Heading,
    /// Prose line.
    #[default]
    Paragraph,
    /// Bulleted list entry (`- ` or `* ` at line start).
    #[serde(rename = "list_item")]
    #[strum(serialize = "list_item", serialize = "listitem")]
    ListItem,
}

impl BlockKind {
    /// Parse from string (case-insensitive).
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        <Self as FromStr>::from_str(s).ok()
    }

    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockKind::Heading => "heading",
            BlockKind::Paragraph => "paragraph",
            BlockKind::ListItem => "list_item",
        }
    }
}

impl std::fmt::Display for BlockKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A sentence-level unit within a block.
///
/// Invariant: `ref_ids` is non-empty exactly when the fragment is a
/// Citation. Ids keep left-to-right source order; the same id cited in two
/// sentences appears in both fragments.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Fragment {
    /// Plain sentence text (markers removed, none matched).
    Text { text: String },
    /// Sentence that carried one or more citation markers.
    Citation { text: String, ref_ids: Vec<RefId> },
}

impl Fragment {
    /// A plain text fragment.
    pub fn plain(text: impl Into<String>) -> Self {
        Fragment::Text { text: text.into() }
    }

    /// A citation fragment with its ordered reference ids.
    ///
    /// Callers must pass at least one id; a sentence that cites nothing is
    /// a [`Fragment::plain`].
    pub fn citation(text: impl Into<String>, ref_ids: Vec<RefId>) -> Self {
        debug_assert!(
            !ref_ids.is_empty(),
            "citation fragments carry at least one ref id (use Fragment::plain)"
        );
        Fragment::Citation {
            text: text.into(),
            ref_ids,
        }
    }

    /// The sentence text (cleaned of markers).
    pub fn text(&self) -> &str {
        match self {
            Fragment::Text { text } => text,
            Fragment::Citation { text, .. } => text,
        }
    }

    /// Reference ids in source order; empty for plain text.
    pub fn ref_ids(&self) -> &[RefId] {
        match self {
            Fragment::Text { .. } => &[],
            Fragment::Citation { ref_ids, .. } => ref_ids,
        }
    }

    /// Whether this fragment carries citations.
    pub fn is_citation(&self) -> bool {
        matches!(self, Fragment::Citation { .. })
    }
}

/// One source line: a classified block holding its sentence fragments.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Line classification (heading, paragraph, list item).
    pub kind: BlockKind,
    /// Heading depth 1..=6. Only meaningful for Heading blocks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u8>,
    /// Sentence fragments in source order.
    pub fragments: Vec<Fragment>,
}

impl Block {
    /// A heading block. Depth is clamped to 1..=6 at parse time.
    pub fn heading(level: u8, fragments: Vec<Fragment>) -> Self {
        Self {
            kind: BlockKind::Heading,
            level: Some(level),
            fragments,
        }
    }

    /// A paragraph block.
    pub fn paragraph(fragments: Vec<Fragment>) -> Self {
        Self {
            kind: BlockKind::Paragraph,
            level: None,
            fragments,
        }
    }

    /// A list item block.
    pub fn list_item(fragments: Vec<Fragment>) -> Self {
        Self {
            kind: BlockKind::ListItem,
            level: None,
            fragments,
        }
    }

    /// Whether any fragment in this block carries citations.
    pub fn has_citations(&self) -> bool {
        self.fragments.iter().any(Fragment::is_citation)
    }

    /// All reference ids in this block, in source order (duplicates kept).
    pub fn ref_ids(&self) -> impl Iterator<Item = &RefId> {
        self.fragments.iter().flat_map(|f| f.ref_ids().iter())
    }

    /// Marker-free text of the whole block. Fragments are joined without a
    /// separator; the kept terminators already delimit sentences.
    pub fn text(&self) -> String {
        self.fragments.iter().map(Fragment::text).collect()
    }
}

// ============================================================================
// Document
// ============================================================================

/// The parsed, structured representation of one report's text.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    blocks: Vec<Block>,
}

impl Document {
    /// Parse raw report text into a document.
    ///
    /// Total and pure: never fails, never does I/O. Empty or whitespace-only
    /// input yields a document with zero blocks; malformed markers stay in
    /// the text verbatim.
    pub fn parse(input: &str) -> Self {
        Self {
            blocks: parser::parse_blocks(input),
        }
    }

    /// Parse optional raw text; `None` yields an empty document.
    pub fn parse_opt(input: Option<&str>) -> Self {
        match input {
            Some(raw) => Self::parse(raw),
            None => Self::default(),
        }
    }

    /// Build a document from pre-constructed blocks.
    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    /// All blocks in source order.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Number of blocks.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Whether the document has no blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// The union of all reference ids, in first-appearance order.
    ///
    /// This is the id universe the panel may ever need to resolve, and the
    /// identity a reference fetch is keyed by.
    pub fn global_ref_ids(&self) -> IndexSet<RefId> {
        self.blocks
            .iter()
            .flat_map(Block::ref_ids)
            .cloned()
            .collect()
    }

    /// Number of citation fragments across the document.
    pub fn citation_count(&self) -> usize {
        self.blocks
            .iter()
            .flat_map(|b| b.fragments.iter())
            .filter(|f| f.is_citation())
            .count()
    }

    /// Marker-free text of the whole document, one line per block.
    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .map(Block::text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

// ============================================================================
// Tests
// ============================================================================
