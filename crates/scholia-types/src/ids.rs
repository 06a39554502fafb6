//! Typed identifiers for references and report views.
//!
//! [`RefId`] wraps the citation id string carried by inline markers
//! (arXiv-style, e.g. `2512.04207`). It is cheap to clone, hashable, and
//! serializes as a bare string. [`RefId::normalize`] is the single place the
//! legacy `p`-prefix rule lives; everything downstream works with normalized
//! ids only.
//!
//! [`ReportId`] wraps UUIDv7 (time-ordered) and identifies one displayed
//! report view. The `short()` form (first 8 hex chars) is for logs and UI,
//! never a lookup key.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A citation reference identifier.
///
/// Stored normalized: construction from raw marker text goes through
/// [`RefId::normalize`], which applies the legacy prefix rule. [`RefId::new`]
/// takes the id verbatim.
#[derive(Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RefId(String);

impl RefId {
    /// Create from an already-normalized id string, verbatim.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Create from raw marker text, stripping one leading `p` if present.
    ///
    /// Legacy id-scheme compatibility: upstream markers write `p2512.04207`
    /// for the paper `2512.04207`. The rule is unconditional, so an id that
    /// legitimately begins with `p` loses that character as well.
    pub fn normalize(raw: &str) -> Self {
        Self(raw.strip_prefix('p').unwrap_or(raw).to_string())
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the underlying string.
    pub fn into_string(self) -> String {
        self.0
    }

    /// Whether the id is the empty string (a marker with only the prefix).
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for RefId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for RefId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl fmt::Display for RefId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for RefId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RefId({})", self.0)
    }
}

// ── ReportId ────────────────────────────────────────────────────────────────

/// A report view identifier (UUIDv7).
#[derive(Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReportId(uuid::Uuid);

impl ReportId {
    /// Create a new time-ordered ID (UUIDv7).
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7())
    }

    /// First 8 hex characters, for human display only, not lookup.
    pub fn short(&self) -> String {
        self.0.as_simple().to_string()[..8].to_string()
    }

    /// Full 32-character hex string (no hyphens).
    pub fn to_hex(&self) -> String {
        self.0.as_simple().to_string()
    }

    /// Parse from a hex string (32 chars, no hyphens) or standard UUID format.
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        uuid::Uuid::parse_str(s).map(Self)
    }

    /// A nil / zero ID, for sentinel values only.
    pub fn nil() -> Self {
        Self(uuid::Uuid::nil())
    }

    /// Check if this is the nil ID.
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl Default for ReportId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<uuid::Uuid> for ReportId {
    fn from(u: uuid::Uuid) -> Self {
        Self(u)
    }
}

impl From<ReportId> for uuid::Uuid {
    fn from(id: ReportId) -> uuid::Uuid {
        id.0
    }
}

impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Full UUID with hyphens for log readability
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ReportId({})", self.short())
    }
}

// ============================================================================
// Tests
// ============================================================================
