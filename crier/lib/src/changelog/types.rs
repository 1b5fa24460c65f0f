//! Core types for changelog ingestion.
//!
//! This module defines the data structures produced by the changelog parser:
//! ordered version records and their categorized change items, plus the error
//! type shared by the fetch/parse path.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error types for changelog operations.
#[derive(Error, Debug)]
pub enum ChangelogError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server responded with a non-success status
    #[error("HTTP error! status: {0}")]
    Status(reqwest::StatusCode),

    /// All fetch attempts were exhausted
    #[error("failed to fetch changelog after {attempts} attempts: {last_error}")]
    FetchExhausted {
        /// Number of attempts made before giving up.
        attempts: u32,
        /// Display form of the last underlying failure.
        last_error: String,
    },
}

/// The heuristic category assigned to a single change item.
///
/// The category is *derived* from the item's content, never authoritative:
/// `categorize_item` is a pure function and can be re-run at any time, so the
/// kind is not something that needs a data migration to evolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    /// A new capability ("add", "new", "feature", "support").
    Feature,
    /// A bug fix ("fix", "bug", "issue").
    Fix,
    /// Something taken away ("removed", "deprecated", "no longer").
    Removal,
    /// A breaking change ("breaking", or removed support for something).
    Breaking,
    /// Anything the heuristics could not place.
    Other,
}

impl ChangeKind {
    /// Stable lowercase label, matching the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Feature => "feature",
            ChangeKind::Fix => "fix",
            ChangeKind::Removal => "removal",
            ChangeKind::Breaking => "breaking",
            ChangeKind::Other => "other",
        }
    }
}

/// A single bullet point from a version's change list.
///
/// `content` is the raw inline markdown with only the leading `- `/`* `
/// marker stripped; it is never rewritten or normalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangelogItem {
    /// Derived category (see [`ChangeKind`]).
    pub kind: ChangeKind,
    /// Raw inline markdown content, unmodified.
    pub content: String,
}

/// One version section of a changelog document.
///
/// Versions appear in document order (newest first, as written upstream);
/// no re-sorting or semver comparison happens anywhere in this crate.
/// Duplicate version headers in the source produce duplicate entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangelogVersion {
    /// Version string as captured from the header (may carry a pre-release
    /// suffix like `2.0.0-beta.1`). Always non-empty.
    pub version: String,
    /// Trailing date/label segment from the header, trimmed. Empty when the
    /// header carried none.
    pub date: String,
    /// Change items in document order.
    pub items: Vec<ChangelogItem>,
}

impl ChangelogVersion {
    /// Creates an empty version record for the given header captures.
    pub fn new(version: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            date: date.into(),
            items: Vec::new(),
        }
    }
}
