//! Report text parsing: line classification, sentence splitting, and
//! citation-marker extraction.
//!
//! The input is line-oriented. Each non-blank line becomes exactly one block
//! (multi-line paragraphs are never merged; the report generator writes one
//! sentence group per line). Within a line:
//!
//! ```text
//! "## 背景"                              Heading(2) [Text("背景")]
//! "大模型存在<ref id=\"p1\">幻觉问题。"    Paragraph  [Citation("大模型存在幻觉问题。", ["1"])]
//! "- 第一点。 第二点。"                   ListItem   [Text("第一点。"), Text("第二点。")]
//! ```
//!
//! # Sentence boundaries
//!
//! A sentence ends after a terminator (`。` `？` `！` `?` `!`) only when
//! whitespace follows; the whitespace run is consumed and the terminator
//! stays attached. A terminator glued to the next character does not split,
//! which keeps trailing markup such as `</ref>` inside its sentence and
//! keeps densely written CJK lines as one sentence group. Latin `.` is not
//! a terminator: it appears inside arXiv-style ids.
//!
//! # Markers
//!
//! Only the opening form `<ref id="..."` + `>` with a non-empty id is
//! recognized. Malformed markers (unterminated, missing quotes, empty id)
//! fail to match and stay in the text verbatim, as do closing `</ref>` tags.

use std::sync::LazyLock;

use regex::Regex;
use scholia_types::RefId;

use crate::document::{Block, BlockKind, Fragment};

/// Inline citation marker with a non-empty quoted id.
static REF_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<ref id="([^"]+)">"#).expect("marker pattern is valid"));

/// Whitespace orphaned directly before terminal punctuation by marker removal.
static SPACE_BEFORE_TERMINATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+([。？！?!])").expect("spacing pattern is valid"));

/// Sentence terminators (CJK and Latin, no `.`).
const TERMINATORS: [char; 5] = ['。', '？', '！', '?', '!'];

/// Maximum heading depth. Longer `#` runs clamp to this.
const MAX_HEADING_LEVEL: u8 = 6;

fn is_terminator(c: char) -> bool {
    TERMINATORS.contains(&c)
}

/// Parse raw report text into blocks, one per non-blank line.
pub(crate) fn parse_blocks(input: &str) -> Vec<Block> {
    input.lines().filter_map(parse_line).collect()
}

/// Classify one line and split its text into sentence fragments.
/// Blank lines yield `None`.
fn parse_line(line: &str) -> Option<Block> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let (kind, level, rest) = classify(line);
    let fragments = split_sentences(rest)
        .into_iter()
        .map(fragment_for)
        .collect();
    Some(Block {
        kind,
        level,
        fragments,
    })
}

/// Line classification: `#` run -> Heading, `- `/`* ` -> ListItem,
/// anything else -> Paragraph. The marker prefix is stripped from the
/// returned text.
fn classify(line: &str) -> (BlockKind, Option<u8>, &str) {
    let hashes = line.chars().take_while(|&c| c == '#').count();
    if hashes > 0 {
        let level = hashes.min(MAX_HEADING_LEVEL as usize) as u8;
        // '#' is one byte, so the byte offset equals the count
        return (BlockKind::Heading, Some(level), line[hashes..].trim_start());
    }
    if let Some(rest) = line.strip_prefix("- ").or_else(|| line.strip_prefix("* ")) {
        return (BlockKind::ListItem, None, rest.trim_start());
    }
    (BlockKind::Paragraph, None, line)
}

/// Split text into sentences, keeping terminators attached and consuming
/// the whitespace run that forms each boundary. Whitespace-only pieces are
/// dropped.
fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if !is_terminator(c) {
            continue;
        }
        // Boundary only when whitespace follows the terminator.
        if !matches!(chars.peek(), Some(&(_, next)) if next.is_whitespace()) {
            continue;
        }
        let end = i + c.len_utf8();
        if !text[start..end].trim().is_empty() {
            sentences.push(&text[start..end]);
        }
        start = end;
        while let Some(&(j, next)) = chars.peek() {
            if !next.is_whitespace() {
                break;
            }
            chars.next();
            start = j + next.len_utf8();
        }
    }

    if start < text.len() && !text[start..].trim().is_empty() {
        sentences.push(&text[start..]);
    }
    sentences
}

/// Extract citation ids from one sentence and clean its text.
fn fragment_for(sentence: &str) -> Fragment {
    let ref_ids: Vec<RefId> = REF_MARKER
        .captures_iter(sentence)
        .map(|cap| RefId::normalize(&cap[1]))
        .collect();
    let cleaned = clean_sentence(sentence);
    if ref_ids.is_empty() {
        Fragment::plain(cleaned)
    } else {
        Fragment::citation(cleaned, ref_ids)
    }
}

/// Remove marker substrings, then drop whitespace left directly before a
/// terminal punctuation mark.
fn clean_sentence(sentence: &str) -> String {
    let no_markers = REF_MARKER.replace_all(sentence, "");
    SPACE_BEFORE_TERMINATOR
        .replace_all(&no_markers, "$1")
        .into_owned()
}

// ============================================================================
// Tests
// ============================================================================
