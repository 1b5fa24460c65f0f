//! Gemini changelog analyzer.
//!
//! Calls the Gemini `generateContent` endpoint in JSON mode with a fixed
//! analysis prompt and parses the returned text as [`ChangelogAnalysis`].
//!
//! ## Environment Variables
//!
//! The API key is read from `GEMINI_API_KEY`.

use std::future::Future;

use reqwest::Client;
use serde_json::{Value, json};

use super::types::{AnalysisError, ChangelogAnalysis};

/// Gemini model used for changelog analysis.
const ANALYSIS_MODEL: &str = "gemini-3-flash-preview";

/// Default Gemini API base URL.
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Environment variable holding the provider credential.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Fixed prompt prefix; the changelog window text is appended verbatim.
const ANALYSIS_PROMPT: &str = r#"You are an expert at analyzing Claude Code changelogs. Analyze the following changelog and return JSON with this exact structure:

{
  "tldr": "150-200 word summary for busy developers highlighting the most important changes",
  "categories": {
    "critical_breaking_changes": ["list of breaking changes that require immediate action"],
    "removals": [{"feature": "name", "severity": "critical|high|medium|low", "why": "reason for removal"}],
    "major_features": ["list of significant new features"],
    "important_fixes": ["list of notable bug fixes"],
    "new_slash_commands": ["list of new slash commands if any"],
    "terminal_improvements": ["list of terminal/CLI improvements"],
    "api_changes": ["list of API-related changes"]
  },
  "action_items": ["specific actions developers should take based on these changes"],
  "sentiment": "positive|neutral|critical"
}

Be thorough but concise. Focus on what developers need to know to update their workflows.

Changelog to analyze:
"#;

/// Analyzer trait for changelog analysis providers.
///
/// Uses native async functions in traits; implementations must be
/// `Send + Sync` for concurrent use across tasks.
pub trait ChangelogAnalyzer: Send + Sync {
    /// Analyze the given changelog text into a structured record.
    ///
    /// ## Errors
    ///
    /// Returns `AnalysisError` if the provider call or response parsing
    /// fails.
    fn analyze(
        &self,
        text: &str,
    ) -> impl Future<Output = Result<ChangelogAnalysis, AnalysisError>> + Send;
}

/// Gemini-backed [`ChangelogAnalyzer`].
///
/// ## Examples
///
/// ```no_run
/// use crier_lib::analysis::GeminiAnalyzer;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let analyzer = GeminiAnalyzer::new()?;
/// # Ok(())
/// # }
/// ```
pub struct GeminiAnalyzer {
    client: Client,
    base_url: String,
    api_key: String,
}

impl std::fmt::Debug for GeminiAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiAnalyzer")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl GeminiAnalyzer {
    /// Create an analyzer using the `GEMINI_API_KEY` environment variable.
    ///
    /// ## Errors
    ///
    /// Returns `AnalysisError::MissingApiKey` if no key is configured.
    pub fn new() -> Result<Self, AnalysisError> {
        let api_key = std::env::var(API_KEY_ENV).map_err(|_| AnalysisError::MissingApiKey)?;
        Ok(Self {
            client: Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key,
        })
    }

    /// Create an analyzer against a custom base URL.
    ///
    /// Useful for testing with mock servers.
    pub fn with_base_url(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }
}

impl ChangelogAnalyzer for GeminiAnalyzer {
    async fn analyze(&self, text: &str) -> Result<ChangelogAnalysis, AnalysisError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, ANALYSIS_MODEL, self.api_key
        );

        let body = json!({
            "contents": [{
                "parts": [{ "text": format!("{ANALYSIS_PROMPT}{text}") }]
            }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "temperature": 1.0
            }
        });

        tracing::debug!(
            model = ANALYSIS_MODEL,
            text_len = text.len(),
            "Sending changelog analysis request"
        );

        let response = self.client.post(&url).json(&body).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(AnalysisError::Api { status, message });
        }

        let payload: Value = response.json().await?;
        let text = payload["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .ok_or(AnalysisError::EmptyResponse)?;

        serde_json::from_str(text).map_err(|e| AnalysisError::Parse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider_response(inner_json: &str) -> Value {
        json!({
            "candidates": [{
                "content": { "parts": [{ "text": inner_json }] }
            }]
        })
    }

    #[test]
    fn test_new_without_env_var() {
        // SAFETY: Tests run with test isolation, removing env vars is safe
        unsafe {
            std::env::remove_var(API_KEY_ENV);
        }
        assert!(matches!(
            GeminiAnalyzer::new(),
            Err(AnalysisError::MissingApiKey)
        ));
    }

    #[tokio::test]
    async fn test_analyze_parses_json_mode_payload() {
        let server = MockServer::start().await;
        let inner = r#"{"tldr": "calm release", "categories": {}, "action_items": [], "sentiment": "neutral"}"#;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-3-flash-preview:generateContent"))
            .and(query_param("key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(provider_response(inner)))
            .mount(&server)
            .await;

        let analyzer = GeminiAnalyzer::with_base_url(server.uri(), "test-key");
        let analysis = analyzer.analyze("## 1.0.0\n- Added x").await.unwrap();
        assert_eq!(analysis.tldr, "calm release");
    }

    #[tokio::test]
    async fn test_analyze_api_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
            .mount(&server)
            .await;

        let analyzer = GeminiAnalyzer::with_base_url(server.uri(), "test-key");
        let result = analyzer.analyze("text").await;
        match result {
            Err(AnalysisError::Api { status, message }) => {
                assert_eq!(status, 429);
                assert!(message.contains("quota"));
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_analyze_missing_text_is_empty_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
            .mount(&server)
            .await;

        let analyzer = GeminiAnalyzer::with_base_url(server.uri(), "test-key");
        assert!(matches!(
            analyzer.analyze("text").await,
            Err(AnalysisError::EmptyResponse)
        ));
    }

    #[tokio::test]
    async fn test_analyze_unparseable_inner_json() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(provider_response("the model got chatty instead of JSON")),
            )
            .mount(&server)
            .await;

        let analyzer = GeminiAnalyzer::with_base_url(server.uri(), "test-key");
        assert!(matches!(
            analyzer.analyze("text").await,
            Err(AnalysisError::Parse(_))
        ));
    }
}
