use async_trait::async_trait;

use crate::error::AnalysisError;
use crate::result::AnalysisRecord;

pub mod heuristic;
pub mod remote;

pub use heuristic::HeuristicAnalyzer;
pub use remote::RemoteAnalyzer;

/// Turns lyrics into a scene description plus the prompt handed to the image model.
///
/// Every implementation fills the whole `AnalysisRecord`, so later stages do
/// not care which one ran.
#[async_trait]
pub trait ContentAnalyzer: Send + Sync {
    async fn analyze(&self, lyrics: &str, artist: &str, title: &str) -> Result<AnalysisRecord, AnalysisError>;
}

/// First `max_chars` characters of `text`.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => &text[..cut],
        None => text,
    }
}

pub fn full_prompt(analysis: &str, style_suffix: &str) -> String {
    format!("{}\n\n{}", analysis.trim(), style_suffix)
}
