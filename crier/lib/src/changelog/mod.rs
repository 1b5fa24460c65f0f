//! Changelog ingestion: retrying fetch, line-scanning parser, categorizer.
//!
//! The flow is `fetch_with_retry` → `parse_changelog` → ordered
//! [`ChangelogVersion`] records with heuristically categorized items.
//! Orchestration (analysis windows, caching) lives in
//! [`crate::orchestrator`].

pub mod fetch;
pub mod parser;
pub mod types;

pub use fetch::{DEFAULT_MAX_ATTEMPTS, fetch_with_retry};
pub use parser::{categorize_item, latest_version, parse_changelog};
pub use types::{ChangeKind, ChangelogError, ChangelogItem, ChangelogVersion};
