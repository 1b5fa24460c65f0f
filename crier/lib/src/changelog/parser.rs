//! Markdown changelog parser and change-item categorizer.
//!
//! The parser is a line scanner, not a markdown AST walk: a changelog is a
//! rigid enough document (version headers and bullet lists) that scanning
//! lines keeps the raw inline markdown of every item intact. It never fails;
//! malformed input degrades to an empty or partial result.

use std::sync::LazyLock;

use regex::Regex;

use super::types::{ChangeKind, ChangelogItem, ChangelogVersion};

/// Matches a version header line such as:
///
/// - `## 1.2.3 - 2024-01-01`
/// - `## [2.0.0-beta.1]`
/// - `## 0.9.0 – initial release` (en dash)
///
/// Capture 1 is the version, capture 2 the optional trailing date/label.
static VERSION_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^##\s+\[?(\d+\.\d+\.\d+(?:-[a-zA-Z0-9.]+)?)\]?(?:\s*[-–]\s*(.+))?")
        .expect("version header regex is valid")
});

/// Parse a markdown changelog into ordered version records.
///
/// Versions come out in document order (newest first as written upstream).
/// Lines that are neither version headers nor `- `/`* ` bullets under an
/// open version are ignored, so prose, blank lines and unrelated headings
/// cannot make the parse fail.
///
/// ## Examples
///
/// ```
/// use crier_lib::changelog::parse_changelog;
///
/// let versions = parse_changelog("## 1.0.0 - 2024-01-01\n- Added new feature X");
/// assert_eq!(versions.len(), 1);
/// assert_eq!(versions[0].version, "1.0.0");
/// assert_eq!(versions[0].date, "2024-01-01");
/// ```
pub fn parse_changelog(markdown: &str) -> Vec<ChangelogVersion> {
    let mut versions = Vec::new();
    let mut current: Option<ChangelogVersion> = None;

    for line in markdown.lines() {
        if let Some(caps) = VERSION_HEADER.captures(line) {
            if let Some(done) = current.take() {
                versions.push(done);
            }
            let version = &caps[1];
            let date = caps.get(2).map(|m| m.as_str().trim()).unwrap_or("");
            current = Some(ChangelogVersion::new(version, date));
            continue;
        }

        if let Some(open) = current.as_mut() {
            if let Some(rest) = line.strip_prefix("- ").or_else(|| line.strip_prefix("* ")) {
                let content = rest.trim().to_string();
                open.items.push(ChangelogItem {
                    kind: categorize_item(&content),
                    content,
                });
            }
        }
    }

    if let Some(done) = current {
        versions.push(done);
    }

    versions
}

/// Heuristically categorize a change item from its content.
///
/// Pure function of the content, evaluated against the lowercased text in
/// strict priority order: breaking, removal, fix, feature, other. This is a
/// best-effort classifier; misclassification is expected and harmless, which
/// is also why the kind is derived rather than stored authoritatively.
pub fn categorize_item(content: &str) -> ChangeKind {
    let lower = content.to_lowercase();

    if lower.contains("breaking") || (lower.contains("removed") && lower.contains("support")) {
        return ChangeKind::Breaking;
    }
    if lower.contains("removed") || lower.contains("deprecated") || lower.contains("no longer") {
        return ChangeKind::Removal;
    }
    if lower.contains("fix")
        || lower.contains("fixed")
        || lower.contains("bug")
        || lower.contains("issue")
    {
        return ChangeKind::Fix;
    }
    if lower.contains("add")
        || lower.contains("new")
        || lower.contains("feature")
        || lower.contains("support")
    {
        return ChangeKind::Feature;
    }

    ChangeKind::Other
}

/// The most recent version string, by document position.
///
/// The first parsed entry is the newest because upstream changelogs are
/// written newest-first; no semver comparison is performed. Returns
/// `"Unknown"` for an empty list.
pub fn latest_version(versions: &[ChangelogVersion]) -> &str {
    versions.first().map(|v| v.version.as_str()).unwrap_or("Unknown")
}
