//! Refresh orchestration: fetch → parse → window-hash → cached analysis.
//!
//! A refresh never fails outward. The changelog itself is the product;
//! analysis is garnish. Fetch failures land in the outcome's `error` field,
//! analysis failures leave `analysis` empty, and cache-store failures are
//! logged and forgotten.

use std::time::SystemTime;

use reqwest::Client;

use crate::analysis::{ChangelogAnalysis, ChangelogAnalyzer};
use crate::cache::AnalysisStore;
use crate::changelog::{
    ChangelogVersion, DEFAULT_MAX_ATTEMPTS, fetch_with_retry, latest_version, parse_changelog,
};
use crate::hash::content_hash;

/// Changelog fetched when no URL is configured.
pub const DEFAULT_CHANGELOG_URL: &str =
    "https://raw.githubusercontent.com/anthropics/claude-code/main/CHANGELOG.md";

/// How many of the newest versions feed the analysis window.
///
/// Only these versions' text is hashed for cache lookups, so edits further
/// down the document do not invalidate a cached analysis. Accepted
/// staleness.
pub const ANALYSIS_WINDOW: usize = 3;

/// Result of one refresh pass.
#[derive(Debug, Clone)]
pub struct RefreshOutcome {
    /// Parsed versions in document order (empty on fetch failure).
    pub versions: Vec<ChangelogVersion>,
    /// Cached or freshly generated analysis, when available.
    pub analysis: Option<ChangelogAnalysis>,
    /// Version string of the newest entry (`"Unknown"` when none).
    pub latest_version: String,
    /// When the fetch completed, if it did.
    pub fetched_at: Option<SystemTime>,
    /// User-visible fetch error, if the changelog could not be loaded.
    pub error: Option<String>,
}

/// Build the analysis window document from the newest versions.
///
/// Format per version: `## {version}` followed by one `- {content}` line per
/// item; versions separated by a blank line.
pub fn summarize_recent(versions: &[ChangelogVersion]) -> String {
    versions
        .iter()
        .take(ANALYSIS_WINDOW)
        .map(|version| {
            let items = version
                .items
                .iter()
                .map(|item| format!("- {}", item.content))
                .collect::<Vec<_>>()
                .join("\n");
            format!("## {}\n{}", version.version, items)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Ties together fetch, parse and cached analysis.
///
/// ## Examples
///
/// ```no_run
/// use crier_lib::analysis::GeminiAnalyzer;
/// use crier_lib::cache::MemoryCacheStore;
/// use crier_lib::orchestrator::ChangelogOrchestrator;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let orchestrator =
///     ChangelogOrchestrator::new(Some(GeminiAnalyzer::new()?), MemoryCacheStore::new());
/// let outcome = orchestrator.refresh().await;
/// println!("latest: {}", outcome.latest_version);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ChangelogOrchestrator<A, S> {
    client: Client,
    url: String,
    max_attempts: u32,
    /// `None` disables analysis entirely (no provider credential, or the
    /// caller opted out); the refresh still serves the parsed changelog.
    analyzer: Option<A>,
    store: S,
}

impl<A, S> ChangelogOrchestrator<A, S>
where
    A: ChangelogAnalyzer,
    S: AnalysisStore,
{
    /// Create an orchestrator against [`DEFAULT_CHANGELOG_URL`].
    pub fn new(analyzer: Option<A>, store: S) -> Self {
        Self {
            client: Client::new(),
            url: DEFAULT_CHANGELOG_URL.to_string(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            analyzer,
            store,
        }
    }

    /// Point the orchestrator at a different changelog URL.
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Override the fetch attempt budget.
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Fetch, parse and (best-effort) analyze the changelog.
    ///
    /// Never returns an error: fetch failures populate
    /// [`RefreshOutcome::error`], analysis failures leave
    /// [`RefreshOutcome::analysis`] as `None`.
    pub async fn refresh(&self) -> RefreshOutcome {
        let markdown = match fetch_with_retry(&self.client, &self.url, self.max_attempts).await {
            Ok(body) => body,
            Err(error) => {
                tracing::warn!(url = %self.url, error = %error, "Changelog refresh failed");
                return RefreshOutcome {
                    versions: Vec::new(),
                    analysis: None,
                    latest_version: "Unknown".to_string(),
                    fetched_at: None,
                    error: Some(error.to_string()),
                };
            }
        };

        let versions = parse_changelog(&markdown);
        let latest = latest_version(&versions).to_string();
        let fetched_at = Some(SystemTime::now());

        let analysis = self.resolve_analysis(&versions).await;

        RefreshOutcome {
            versions,
            analysis,
            latest_version: latest,
            fetched_at,
            error: None,
        }
    }

    /// Cache-first analysis of the newest versions.
    async fn resolve_analysis(&self, versions: &[ChangelogVersion]) -> Option<ChangelogAnalysis> {
        let window = summarize_recent(versions);
        let hash = content_hash(&window);

        match self.store.get(&hash).await {
            Ok(Some(cached)) => {
                tracing::debug!(hash = %hash, "Using cached analysis");
                return Some(cached);
            }
            Ok(None) => {}
            Err(error) => {
                tracing::warn!(error = %error, hash = %hash, "Analysis cache lookup failed");
            }
        }

        let analyzer = self.analyzer.as_ref()?;

        match analyzer.analyze(&window).await {
            Ok(analysis) => {
                // Fire-and-forget: a failed store write is logged, never retried.
                if let Err(error) = self.store.put(&hash, &analysis).await {
                    tracing::warn!(error = %error, hash = %hash, "Failed to cache analysis");
                }
                Some(analysis)
            }
            Err(error) => {
                tracing::warn!(error = %error, "Changelog analysis failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::analysis::AnalysisError;
    use crate::cache::MemoryCacheStore;
    use crate::changelog::parse_changelog;

    const SAMPLE_MD: &str = "## 1.2.0 - 2024-03-01\n- Added thing\n\n## 1.1.0\n- Fixed bug\n\n## 1.0.0\n- Initial release\n\n## 0.9.0\n- Old stuff";

    struct CountingAnalyzer {
        calls: AtomicU32,
        fail: bool,
    }

    impl CountingAnalyzer {
        fn new(fail: bool) -> Self {
            Self {
                calls: AtomicU32::new(0),
                fail,
            }
        }
    }

    impl ChangelogAnalyzer for CountingAnalyzer {
        async fn analyze(&self, _text: &str) -> Result<ChangelogAnalysis, AnalysisError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(AnalysisError::EmptyResponse)
            } else {
                Ok(ChangelogAnalysis {
                    tldr: "fresh".into(),
                    ..Default::default()
                })
            }
        }
    }

    async fn changelog_server(body: &str) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/CHANGELOG.md"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&server)
            .await;
        server
    }

    #[test]
    fn test_summary_covers_only_three_newest() {
        let versions = parse_changelog(SAMPLE_MD);
        let summary = summarize_recent(&versions);

        assert!(summary.contains("## 1.2.0"));
        assert!(summary.contains("- Added thing"));
        assert!(summary.contains("## 1.0.0"));
        assert!(!summary.contains("0.9.0"));
        assert_eq!(summary.matches("##").count(), 3);
    }

    #[test]
    fn test_summary_of_empty_list() {
        assert_eq!(summarize_recent(&[]), "");
    }

    #[test]
    fn test_older_edits_do_not_change_window_hash() {
        let edited = SAMPLE_MD.replace("Old stuff", "Rewritten history");
        let original = summarize_recent(&parse_changelog(SAMPLE_MD));
        let after = summarize_recent(&parse_changelog(&edited));
        assert_eq!(content_hash(&original), content_hash(&after));
    }

    #[tokio::test]
    async fn test_refresh_happy_path() {
        let server = changelog_server(SAMPLE_MD).await;
        let orchestrator =
            ChangelogOrchestrator::new(Some(CountingAnalyzer::new(false)), MemoryCacheStore::new())
                .with_url(format!("{}/CHANGELOG.md", server.uri()));

        let outcome = orchestrator.refresh().await;

        assert!(outcome.error.is_none());
        assert_eq!(outcome.versions.len(), 4);
        assert_eq!(outcome.latest_version, "1.2.0");
        assert_eq!(outcome.analysis.unwrap().tldr, "fresh");
        assert!(outcome.fetched_at.is_some());
    }

    #[tokio::test]
    async fn test_refresh_uses_cached_analysis() {
        let server = changelog_server(SAMPLE_MD).await;
        let orchestrator =
            ChangelogOrchestrator::new(Some(CountingAnalyzer::new(false)), MemoryCacheStore::new())
                .with_url(format!("{}/CHANGELOG.md", server.uri()));

        orchestrator.refresh().await;
        let second = orchestrator.refresh().await;

        // Second refresh hits the analysis cache; analyzer ran exactly once.
        assert!(second.analysis.is_some());
        assert_eq!(
            orchestrator
                .analyzer
                .as_ref()
                .unwrap()
                .calls
                .load(Ordering::SeqCst),
            1
        );
    }

    #[tokio::test]
    async fn test_refresh_survives_analysis_failure() {
        let server = changelog_server(SAMPLE_MD).await;
        let orchestrator =
            ChangelogOrchestrator::new(Some(CountingAnalyzer::new(true)), MemoryCacheStore::new())
                .with_url(format!("{}/CHANGELOG.md", server.uri()));

        let outcome = orchestrator.refresh().await;

        assert!(outcome.error.is_none());
        assert_eq!(outcome.versions.len(), 4);
        assert!(outcome.analysis.is_none());
    }

    #[tokio::test]
    async fn test_refresh_without_analyzer() {
        let server = changelog_server(SAMPLE_MD).await;
        let orchestrator =
            ChangelogOrchestrator::<CountingAnalyzer, _>::new(None, MemoryCacheStore::new())
                .with_url(format!("{}/CHANGELOG.md", server.uri()));

        let outcome = orchestrator.refresh().await;
        assert!(outcome.analysis.is_none());
        assert_eq!(outcome.latest_version, "1.2.0");
    }

    #[tokio::test]
    async fn test_refresh_fetch_failure_populates_error() {
        let orchestrator =
            ChangelogOrchestrator::new(Some(CountingAnalyzer::new(false)), MemoryCacheStore::new())
                .with_url("http://127.0.0.1:1/CHANGELOG.md")
                .with_max_attempts(1);

        let outcome = orchestrator.refresh().await;

        assert!(outcome.error.is_some());
        assert!(outcome.versions.is_empty());
        assert_eq!(outcome.latest_version, "Unknown");
        assert!(outcome.fetched_at.is_none());
        // Analyzer is never consulted when the fetch fails.
        assert_eq!(
            orchestrator
                .analyzer
                .as_ref()
                .unwrap()
                .calls
                .load(Ordering::SeqCst),
            0
        );
    }
}
