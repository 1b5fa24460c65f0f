//! Retrying fetch for the remote changelog document.
//!
//! A plain GET with exponential backoff: non-success statuses and transport
//! failures are treated identically as retryable, with no jitter and no
//! distinction between 4xx and 5xx. Only after the final attempt does the
//! last failure surface as [`ChangelogError::FetchExhausted`].

use std::time::Duration;

use reqwest::Client;

use super::types::ChangelogError;

/// Default number of fetch attempts before giving up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Fetch a URL as text, retrying with exponential backoff.
///
/// Waits `2^attempt_index` seconds before each retry (1s, 2s, ... starting
/// after the first failure); there is no delay after the final failed
/// attempt — the last error surfaces immediately.
///
/// ## Arguments
///
/// * `client` - HTTP client for making requests
/// * `url` - Resource to fetch
/// * `max_attempts` - Total attempts, including the first (min 1)
///
/// ## Errors
///
/// Returns `ChangelogError::FetchExhausted` carrying the attempt count and
/// the display form of the last underlying failure.
pub async fn fetch_with_retry(
    client: &Client,
    url: &str,
    max_attempts: u32,
) -> Result<String, ChangelogError> {
    let max_attempts = max_attempts.max(1);
    let mut last_error: Option<ChangelogError> = None;

    for attempt in 0..max_attempts {
        match try_fetch(client, url).await {
            Ok(body) => return Ok(body),
            Err(error) => {
                tracing::debug!(
                    url = url,
                    attempt = attempt + 1,
                    max_attempts,
                    error = %error,
                    "Changelog fetch attempt failed"
                );
                last_error = Some(error);
                if attempt + 1 < max_attempts {
                    tokio::time::sleep(Duration::from_secs(1 << attempt)).await;
                }
            }
        }
    }

    Err(ChangelogError::FetchExhausted {
        attempts: max_attempts,
        last_error: last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "unknown error".into()),
    })
}

/// One fetch attempt; non-2xx statuses count as failures.
async fn try_fetch(client: &Client, url: &str) -> Result<String, ChangelogError> {
    let response = client.get(url).send().await?;
    if !response.status().is_success() {
        return Err(ChangelogError::Status(response.status()));
    }
    Ok(response.text().await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_fetch_success_first_attempt() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/CHANGELOG.md"))
            .respond_with(ResponseTemplate::new(200).set_body_string("## 1.0.0\n- Added x"))
            .mount(&server)
            .await;

        let client = Client::new();
        let body = fetch_with_retry(&client, &format!("{}/CHANGELOG.md", server.uri()), 3)
            .await
            .unwrap();
        assert_eq!(body, "## 1.0.0\n- Added x");
    }

    #[tokio::test]
    async fn test_fetch_recovers_after_two_failures() {
        let server = MockServer::start().await;

        // First two attempts fail with 500, third succeeds.
        Mock::given(method("GET"))
            .and(path("/CHANGELOG.md"))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/CHANGELOG.md"))
            .respond_with(ResponseTemplate::new(200).set_body_string("recovered"))
            .mount(&server)
            .await;

        tokio::time::pause();
        let client = Client::new();
        let url = format!("{}/CHANGELOG.md", server.uri());
        // auto-advance virtual time through the backoff sleeps
        let body = fetch_with_retry(&client, &url, 3).await.unwrap();
        assert_eq!(body, "recovered");
    }

    #[tokio::test]
    async fn test_fetch_exhausts_after_max_attempts() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/CHANGELOG.md"))
            .respond_with(ResponseTemplate::new(404))
            .expect(3)
            .mount(&server)
            .await;

        tokio::time::pause();
        let client = Client::new();
        let result = fetch_with_retry(&client, &format!("{}/CHANGELOG.md", server.uri()), 3).await;

        match result {
            Err(ChangelogError::FetchExhausted {
                attempts,
                last_error,
            }) => {
                assert_eq!(attempts, 3);
                assert!(last_error.contains("404"), "got: {last_error}");
            }
            other => panic!("expected FetchExhausted, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_4xx_and_5xx_retry_identically() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/CHANGELOG.md"))
            .respond_with(ResponseTemplate::new(403))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/CHANGELOG.md"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&server)
            .await;

        tokio::time::pause();
        let client = Client::new();
        let body = fetch_with_retry(&client, &format!("{}/CHANGELOG.md", server.uri()), 2)
            .await
            .unwrap();
        assert_eq!(body, "ok");
    }

    #[tokio::test]
    async fn test_transport_failure_exhausts() {
        // Nothing is listening on port 1.
        let client = Client::new();
        let result = fetch_with_retry(&client, "http://127.0.0.1:1/CHANGELOG.md", 1).await;
        assert!(matches!(
            result,
            Err(ChangelogError::FetchExhausted { attempts: 1, .. })
        ));
    }
}
