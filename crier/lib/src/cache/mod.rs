//! Content-addressed caches for analysis results and generated audio.
//!
//! Both stores are best-effort collaborators: a failed lookup is treated as
//! a miss and a failed write is logged and forgotten, never allowed to block
//! returning a freshly computed artifact to the caller.
//!
//! ## Native Async Traits
//!
//! The store traits use the desugared async-fn-in-trait form so that
//! implementations stay `Send`-composable across tasks; no `async-trait`
//! crate is involved.

pub mod http;
pub mod memory;

use std::future::Future;

use crate::analysis::ChangelogAnalysis;

pub use http::HttpCacheStore;
pub use memory::MemoryCacheStore;

/// Errors from cache store operations.
///
/// These never propagate past the pipeline/orchestrator boundary; callers
/// log them and carry on.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// HTTP request to the cache collaborator failed
    #[error("cache request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Cache collaborator rejected the request
    #[error("cache store returned {status}: {message}")]
    Rejected {
        /// HTTP status code from the collaborator.
        status: u16,
        /// Response body, for the log line.
        message: String,
    },

    /// Cached payload could not be decoded
    #[error("cached payload could not be decoded: {0}")]
    Decode(String),
}

/// Store for cached changelog analyses, keyed by content hash.
pub trait AnalysisStore: Send + Sync {
    /// Look up a cached analysis. `Ok(None)` is a miss.
    fn get(
        &self,
        hash: &str,
    ) -> impl Future<Output = Result<Option<ChangelogAnalysis>, CacheError>> + Send;

    /// Persist an analysis under the given hash (upsert semantics).
    fn put(
        &self,
        hash: &str,
        analysis: &ChangelogAnalysis,
    ) -> impl Future<Output = Result<(), CacheError>> + Send;
}

/// Store for cached WAV audio, keyed by `(content hash, voice)`.
pub trait AudioStore: Send + Sync {
    /// Look up cached audio bytes. `Ok(None)` is a miss.
    fn get(
        &self,
        hash: &str,
        voice: &str,
    ) -> impl Future<Output = Result<Option<Vec<u8>>, CacheError>> + Send;

    /// Persist audio bytes under the composite key (upsert semantics).
    fn put(
        &self,
        hash: &str,
        voice: &str,
        audio: &[u8],
    ) -> impl Future<Output = Result<(), CacheError>> + Send;
}
