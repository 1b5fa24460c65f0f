//! Audio generation pipeline: hash → cache → synthesize → WAV → cache.
//!
//! The cache is consulted before the provider, so repeated requests for the
//! same `(text, voice)` pair never hit the TTS API twice. Cache failures in
//! either direction are logged and treated as misses; they never fail a
//! generation that the provider could satisfy.

use super::tts::{SpeechSynthesizer, TtsError};
use super::voice::VoiceName;
use super::wav::pcm_to_wav;
use crate::cache::AudioStore;
use crate::hash::content_hash;

/// Orchestrates speech generation with content-addressed caching.
///
/// ## Examples
///
/// ```no_run
/// use crier_lib::audio::{AudioPipeline, GeminiTts, VoiceName};
/// use crier_lib::cache::MemoryCacheStore;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pipeline = AudioPipeline::new(GeminiTts::new()?, MemoryCacheStore::new());
/// let wav = pipeline.generate("Version 2.0 is out.", VoiceName::Charon).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct AudioPipeline<S, C> {
    synthesizer: S,
    store: C,
}

impl<S, C> AudioPipeline<S, C>
where
    S: SpeechSynthesizer,
    C: AudioStore,
{
    /// Create a pipeline from a synthesizer and an audio cache store.
    pub fn new(synthesizer: S, store: C) -> Self {
        Self { synthesizer, store }
    }

    /// Generate WAV audio for `text` in the given voice.
    ///
    /// On a cache hit the cached bytes come back unchanged and the provider
    /// is never called. On a miss the provider's raw PCM is wrapped in a WAV
    /// container, stored under `(hash(text), voice)` best-effort, and
    /// returned.
    ///
    /// ## Errors
    ///
    /// Returns `TtsError` only for provider/decoding failures; cache store
    /// failures are logged and swallowed.
    pub async fn generate(&self, text: &str, voice: VoiceName) -> Result<Vec<u8>, TtsError> {
        let hash = content_hash(text);

        match self.store.get(&hash, voice.as_str()).await {
            Ok(Some(cached)) => {
                tracing::debug!(hash = %hash, voice = %voice, "Using cached audio");
                return Ok(cached);
            }
            Ok(None) => {}
            Err(error) => {
                tracing::warn!(error = %error, hash = %hash, "Audio cache lookup failed");
            }
        }

        let pcm = self.synthesizer.synthesize(text, voice).await?;
        let wav = pcm_to_wav(&pcm);

        if let Err(error) = self.store.put(&hash, voice.as_str(), &wav).await {
            tracing::warn!(error = %error, hash = %hash, "Failed to cache generated audio");
        }

        Ok(wav)
    }
}
