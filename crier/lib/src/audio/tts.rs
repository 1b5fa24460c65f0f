//! Gemini speech synthesis provider.
//!
//! Calls the Gemini TTS `generateContent` endpoint with a narration
//! preamble and a prebuilt voice, and decodes the base64 raw-PCM payload
//! from the response. Container encoding is the pipeline's job, not the
//! provider's.
//!
//! ## Environment Variables
//!
//! The API key is read from `GEMINI_API_KEY`.

use std::future::Future;

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use reqwest::Client;
use serde_json::{Value, json};

use super::voice::VoiceName;
use crate::analysis::API_KEY_ENV;

/// Gemini model used for speech synthesis.
const TTS_MODEL: &str = "gemini-2.5-flash-preview-tts";

/// Default Gemini API base URL.
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Narration framing prepended to every synthesis request.
const NARRATION_PREAMBLE: &str = "Read this changelog summary in a clear, informative tone:";

/// Errors from speech generation and playback.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum TtsError {
    /// No provider credential is configured
    #[error("Gemini API key not configured")]
    MissingApiKey,

    /// HTTP request to the provider failed
    #[error("TTS request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider returned a non-success status
    #[error("TTS API error: {status} - {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body text.
        message: String,
    },

    /// Provider response carried no audio payload
    #[error("no audio data in response")]
    EmptyResponse,

    /// Audio payload was not valid base64
    #[error("failed to decode audio payload: {0}")]
    Decode(#[from] base64::DecodeError),

    /// No system audio player was found
    #[error("no system audio player available")]
    NoAudioPlayer,

    /// Temp file creation for playback failed
    #[error("failed to create temp file for playback")]
    TempFile {
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The player process could not be started
    #[error("failed to spawn audio player '{player}'")]
    SpawnFailed {
        /// The player binary that failed to start.
        player: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The player process exited with an error
    #[error("audio playback failed ({player}): {stderr}")]
    PlaybackFailed {
        /// The player binary used.
        player: String,
        /// Its stderr output.
        stderr: String,
    },

    /// Filesystem I/O failed
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Synthesizer trait for TTS providers.
///
/// Returns raw 16-bit mono PCM at 24 kHz; WAV containerization happens in
/// the pipeline. Implementations must be `Send + Sync`.
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize speech for the given text with the given voice.
    ///
    /// ## Errors
    ///
    /// Returns `TtsError` if the provider call fails or the response carries
    /// no decodable audio.
    fn synthesize(
        &self,
        text: &str,
        voice: VoiceName,
    ) -> impl Future<Output = Result<Vec<u8>, TtsError>> + Send;
}

/// Gemini-backed [`SpeechSynthesizer`].
///
/// ## Examples
///
/// ```no_run
/// use crier_lib::audio::{GeminiTts, SpeechSynthesizer, VoiceName};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let tts = GeminiTts::new()?;
/// let pcm = tts.synthesize("Version 2.0 is out.", VoiceName::Charon).await?;
/// # Ok(())
/// # }
/// ```
pub struct GeminiTts {
    client: Client,
    base_url: String,
    api_key: String,
}

impl std::fmt::Debug for GeminiTts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiTts")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl GeminiTts {
    /// Create a synthesizer using the `GEMINI_API_KEY` environment variable.
    ///
    /// ## Errors
    ///
    /// Returns `TtsError::MissingApiKey` if no key is configured.
    pub fn new() -> Result<Self, TtsError> {
        let api_key = std::env::var(API_KEY_ENV).map_err(|_| TtsError::MissingApiKey)?;
        Ok(Self {
            client: Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key,
        })
    }

    /// Create a synthesizer against a custom base URL.
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

impl SpeechSynthesizer for GeminiTts {
    async fn synthesize(&self, text: &str, voice: VoiceName) -> Result<Vec<u8>, TtsError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, TTS_MODEL, self.api_key
        );

        let body = json!({
            "contents": [{
                "parts": [{ "text": format!("{NARRATION_PREAMBLE}\n\n{text}") }]
            }],
            "generationConfig": {
                "responseModalities": ["AUDIO"],
                "speechConfig": {
                    "voiceConfig": {
                        "prebuiltVoiceConfig": { "voiceName": voice.as_str() }
                    }
                }
            }
        });

        tracing::debug!(
            voice = %voice,
            text_len = text.len(),
            model = TTS_MODEL,
            "Sending TTS request"
        );

        let response = self.client.post(&url).json(&body).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(TtsError::Api { status, message });
        }

        let payload: Value = response.json().await?;
        let base64_audio = payload["candidates"][0]["content"]["parts"][0]["inlineData"]["data"]
            .as_str()
            .ok_or(TtsError::EmptyResponse)?;

        let pcm = BASE64.decode(base64_audio)?;

        tracing::debug!(pcm_bytes = pcm.len(), "Received TTS audio response");
        Ok(pcm)
    }
}
