//! AI analysis of recent changelog versions.
//!
//! - [`types`] - The structured analysis record and its error type
//! - [`gemini`] - The Gemini-backed [`ChangelogAnalyzer`] implementation

pub mod gemini;
pub mod types;

pub use gemini::{API_KEY_ENV, ChangelogAnalyzer, GeminiAnalyzer};
pub use types::{
    AnalysisCategories, AnalysisError, ChangelogAnalysis, RemovalNotice, Sentiment, Severity,
};
