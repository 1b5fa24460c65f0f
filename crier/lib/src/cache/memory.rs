//! In-process cache store.
//!
//! Used by the CLI when no cache server is configured, and as the store
//! double in pipeline/orchestrator tests. Contents live for the life of the
//! process only.

use std::collections::HashMap;
use std::sync::Mutex;

use super::{AnalysisStore, AudioStore, CacheError};
use crate::analysis::ChangelogAnalysis;

/// A `Mutex`-guarded in-memory implementation of both store traits.
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    analyses: Mutex<HashMap<String, ChangelogAnalysis>>,
    audio: Mutex<HashMap<(String, String), Vec<u8>>>,
}

impl MemoryCacheStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl AnalysisStore for MemoryCacheStore {
    async fn get(&self, hash: &str) -> Result<Option<ChangelogAnalysis>, CacheError> {
        let analyses = self.analyses.lock().expect("analysis cache lock poisoned");
        Ok(analyses.get(hash).cloned())
    }

    async fn put(&self, hash: &str, analysis: &ChangelogAnalysis) -> Result<(), CacheError> {
        let mut analyses = self.analyses.lock().expect("analysis cache lock poisoned");
        analyses.insert(hash.to_string(), analysis.clone());
        Ok(())
    }
}

impl AudioStore for MemoryCacheStore {
    async fn get(&self, hash: &str, voice: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let audio = self.audio.lock().expect("audio cache lock poisoned");
        Ok(audio.get(&(hash.to_string(), voice.to_string())).cloned())
    }

    async fn put(&self, hash: &str, voice: &str, bytes: &[u8]) -> Result<(), CacheError> {
        let mut audio = self.audio.lock().expect("audio cache lock poisoned");
        audio.insert((hash.to_string(), voice.to_string()), bytes.to_vec());
        Ok(())
    }
}
