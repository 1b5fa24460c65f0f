//! Structured analysis of a changelog window, as returned by the provider.
//!
//! The shapes here mirror the provider's JSON contract field-for-field; the
//! cache collaborator stores these records verbatim, so renaming a field
//! would invalidate every cached analysis.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from the analysis provider path.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// No provider credential is configured
    #[error("Gemini API key not configured")]
    MissingApiKey,

    /// HTTP request to the provider failed
    #[error("analysis request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider returned a non-success status
    #[error("Gemini API error: {status} - {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body text.
        message: String,
    },

    /// Provider response carried no text payload
    #[error("no response from Gemini API")]
    EmptyResponse,

    /// Provider text payload was not the expected JSON shape
    #[error("failed to parse Gemini response as JSON: {0}")]
    Parse(String),
}

/// Severity attached to a removal notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

/// Overall tone of the analyzed window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    #[default]
    Neutral,
    Critical,
}

/// A feature removal called out by the analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemovalNotice {
    /// Name of the removed feature.
    pub feature: String,
    /// How disruptive the removal is.
    pub severity: Severity,
    /// The provider's stated reason for the removal.
    pub why: String,
}

/// Categorized findings within the analyzed window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisCategories {
    /// Breaking changes requiring immediate action.
    #[serde(default)]
    pub critical_breaking_changes: Vec<String>,
    /// Feature removals with severity and rationale.
    #[serde(default)]
    pub removals: Vec<RemovalNotice>,
    /// Significant new features.
    #[serde(default)]
    pub major_features: Vec<String>,
    /// Notable bug fixes.
    #[serde(default)]
    pub important_fixes: Vec<String>,
    /// New slash commands, if any.
    #[serde(default)]
    pub new_slash_commands: Vec<String>,
    /// Terminal/CLI improvements.
    #[serde(default)]
    pub terminal_improvements: Vec<String>,
    /// API-related changes.
    #[serde(default)]
    pub api_changes: Vec<String>,
}

/// The full structured analysis of a changelog window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChangelogAnalysis {
    /// 150-200 word summary for busy developers.
    #[serde(default)]
    pub tldr: String,
    /// Findings grouped by category.
    #[serde(default)]
    pub categories: AnalysisCategories,
    /// Specific actions developers should take.
    #[serde(default)]
    pub action_items: Vec<String>,
    /// Overall tone of the window.
    #[serde(default)]
    pub sentiment: Sentiment,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_wire_form_is_lowercase() {
        assert_eq!(serde_json::to_string(&Severity::High).unwrap(), "\"high\"");
        let parsed: Severity = serde_json::from_str("\"critical\"").unwrap();
        assert_eq!(parsed, Severity::Critical);
    }

    #[test]
    fn test_analysis_parses_provider_shape() {
        let json = r#"{
            "tldr": "A quiet release.",
            "categories": {
                "critical_breaking_changes": [],
                "removals": [{"feature": "legacy config", "severity": "medium", "why": "superseded"}],
                "major_features": ["MCP server support"],
                "important_fixes": ["startup crash"],
                "new_slash_commands": [],
                "terminal_improvements": [],
                "api_changes": []
            },
            "action_items": ["migrate config"],
            "sentiment": "positive"
        }"#;

        let analysis: ChangelogAnalysis = serde_json::from_str(json).unwrap();
        assert_eq!(analysis.categories.removals[0].severity, Severity::Medium);
        assert_eq!(analysis.sentiment, Sentiment::Positive);
        assert_eq!(analysis.categories.major_features.len(), 1);
    }

    #[test]
    fn test_missing_category_lists_default_empty() {
        // Providers occasionally omit empty arrays; tolerate that.
        let json = r#"{"tldr": "x", "categories": {}, "action_items": [], "sentiment": "neutral"}"#;
        let analysis: ChangelogAnalysis = serde_json::from_str(json).unwrap();
        assert!(analysis.categories.removals.is_empty());
    }
}
