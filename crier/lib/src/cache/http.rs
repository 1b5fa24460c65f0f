//! HTTP client for the external cache persistence collaborator.
//!
//! The collaborator exposes four endpoints:
//!
//! - `GET  /analysis/{hash}` → `{"analysis": {...}}` or 404
//! - `POST /analysis/{hash}` with `{"analysis": {...}}`
//! - `GET  /audio/{hash}/{voice}` → raw WAV bytes or 404
//! - `POST /audio` with `{"textHash", "voice", "audioData"(base64)}`
//!
//! The camelCase audio-upload field names are part of the collaborator's
//! existing wire format and are preserved here.

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{AnalysisStore, AudioStore, CacheError};
use crate::analysis::ChangelogAnalysis;

/// Envelope used by the analysis endpoints.
#[derive(Debug, Serialize, Deserialize)]
struct AnalysisEnvelope {
    analysis: ChangelogAnalysis,
}

/// Upload body for `POST /audio`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AudioUpload<'a> {
    text_hash: &'a str,
    voice: &'a str,
    /// Base64-encoded WAV bytes.
    audio_data: String,
}

/// Cache store backed by the HTTP persistence collaborator.
///
/// ## Examples
///
/// ```no_run
/// use crier_lib::cache::HttpCacheStore;
///
/// let store = HttpCacheStore::new("http://localhost:3001/api");
/// ```
#[derive(Debug, Clone)]
pub struct HttpCacheStore {
    client: Client,
    base_url: String,
}

impl HttpCacheStore {
    /// Create a store pointed at the collaborator's base URL (no trailing
    /// slash, e.g. `http://localhost:3001/api`).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Create a store reusing an existing HTTP client.
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl AnalysisStore for HttpCacheStore {
    async fn get(&self, hash: &str) -> Result<Option<ChangelogAnalysis>, CacheError> {
        let response = self
            .client
            .get(self.url(&format!("/analysis/{hash}")))
            .send()
            .await?;

        if !response.status().is_success() {
            // Misses come back as 404; any other status is still a miss for
            // the caller, there is nothing useful to do with it here.
            tracing::debug!(hash = hash, status = %response.status(), "Analysis cache miss");
            return Ok(None);
        }

        let envelope: AnalysisEnvelope = response
            .json()
            .await
            .map_err(|e| CacheError::Decode(e.to_string()))?;
        Ok(Some(envelope.analysis))
    }

    async fn put(&self, hash: &str, analysis: &ChangelogAnalysis) -> Result<(), CacheError> {
        let response = self
            .client
            .post(self.url(&format!("/analysis/{hash}")))
            .json(&AnalysisEnvelope {
                analysis: analysis.clone(),
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(CacheError::Rejected { status, message });
        }
        Ok(())
    }
}

impl AudioStore for HttpCacheStore {
    async fn get(&self, hash: &str, voice: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let response = self
            .client
            .get(self.url(&format!("/audio/{hash}/{voice}")))
            .send()
            .await?;

        if !response.status().is_success() {
            tracing::debug!(hash = hash, voice = voice, "Audio cache miss");
            return Ok(None);
        }

        Ok(Some(response.bytes().await?.to_vec()))
    }

    async fn put(&self, hash: &str, voice: &str, audio: &[u8]) -> Result<(), CacheError> {
        let response = self
            .client
            .post(self.url("/audio"))
            .json(&AudioUpload {
                text_hash: hash,
                voice,
                audio_data: BASE64.encode(audio),
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(CacheError::Rejected { status, message });
        }

        tracing::debug!(hash = hash, voice = voice, bytes = audio.len(), "Audio cached");
        Ok(())
    }
}
