//! Crier
//!
//! Changelog ingestion, AI analysis and spoken narration with
//! content-addressed caching.
//!
//! ## Features
//!
//! - **Resilient ingestion**: exponential-backoff fetch and a
//!   never-failing markdown changelog parser with heuristic categorization
//! - **Content-addressed caching**: AI analyses and generated speech are
//!   cached by text hash (plus voice, for audio) against an external store,
//!   so identical inputs never pay for a second provider call
//! - **Cache-aware speech pipeline**: raw provider PCM is wrapped in a WAV
//!   container and played through the system audio player
//! - **Playback state machine**: a single active buffer with seek/speed
//!   controls and a monotonic token guard against racing generations
//! - **Async-first**: built on tokio with native async traits at the
//!   provider and store seams
//!
//! ## Quick Start
//!
//! ```ignore
//! use crier_lib::analysis::GeminiAnalyzer;
//! use crier_lib::cache::MemoryCacheStore;
//! use crier_lib::orchestrator::ChangelogOrchestrator;
//!
//! let orchestrator =
//!     ChangelogOrchestrator::new(Some(GeminiAnalyzer::new()?), MemoryCacheStore::new());
//! let outcome = orchestrator.refresh().await;
//! println!("latest version: {}", outcome.latest_version);
//! ```
//!
//! ## Module Structure
//!
//! - [`changelog`] - Retrying fetch, parser and categorizer
//! - [`hash`] - Deterministic content hashing for cache keys
//! - [`analysis`] - Structured AI analysis of recent versions
//! - [`audio`] - Speech synthesis, WAV encoding, playback
//! - [`cache`] - Content-addressed stores for analysis and audio
//! - [`orchestrator`] - The refresh flow tying it all together
//! - [`prefs`] - Persisted user preferences (voice, speed)

pub mod analysis;
pub mod audio;
pub mod cache;
pub mod changelog;
pub mod hash;
pub mod orchestrator;
pub mod prefs;

// Re-export main types at crate root for convenience
pub use analysis::{AnalysisError, ChangelogAnalysis, ChangelogAnalyzer, GeminiAnalyzer};
pub use audio::{
    AudioPipeline, GeminiTts, PlaybackController, PlaybackState, SpeechSynthesizer, TtsError,
    VoiceName,
};
pub use cache::{AnalysisStore, AudioStore, CacheError, HttpCacheStore, MemoryCacheStore};
pub use changelog::{
    ChangeKind, ChangelogError, ChangelogItem, ChangelogVersion, parse_changelog,
};
pub use hash::content_hash;
pub use orchestrator::{ChangelogOrchestrator, DEFAULT_CHANGELOG_URL, RefreshOutcome};
pub use prefs::{JsonPreferenceStore, PreferenceStore, UserPreferences};
