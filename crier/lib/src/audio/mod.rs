//! Speech generation and playback.
//!
//! - [`voice`] - The fixed prebuilt voice catalog
//! - [`wav`] - Raw-PCM-to-WAV container encoding
//! - [`tts`] - The Gemini [`SpeechSynthesizer`] provider
//! - [`pipeline`] - Cache-aware generation ([`AudioPipeline`])
//! - [`playback`] - The [`PlaybackController`] state machine
//! - [`player`] - System-player output for the CLI

pub mod pipeline;
pub mod playback;
pub mod player;
pub mod tts;
pub mod voice;
pub mod wav;

pub use pipeline::AudioPipeline;
pub use playback::{GenerationToken, PlaybackController, PlaybackState};
pub use player::{get_audio_player, play_wav_bytes, play_wav_file};
pub use tts::{GeminiTts, SpeechSynthesizer, TtsError};
pub use voice::{UnknownVoice, VOICE_OPTIONS, VoiceName, VoiceOption};
pub use wav::{SAMPLE_RATE, pcm_to_wav, wav_duration_secs};
