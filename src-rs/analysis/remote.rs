use std::sync::Arc;

use async_trait::async_trait;

use super::heuristic::{analyze_mood, extract_themes};
use super::{full_prompt, truncate_chars, ContentAnalyzer};
use crate::error::AnalysisError;
use crate::llm::{CompletionRequest, Message, ProviderAdapter};
use crate::result::AnalysisRecord;

const SYSTEM_PROMPT: &str = "You are an expert in song lyrics and visual storytelling. \
Read the lyrics and write a detailed description of a single image that captures the song. \
Cover: the main theme and mood; key symbols and metaphors; the colour palette; \
the visual style (realism, surrealism, abstraction and so on); composition elements. \
Answer with the description only.";

/// Analysis through a chat model. Mood and themes still come from the local
/// heuristics so the record matches `HeuristicAnalyzer` field for field.
pub struct RemoteAnalyzer {
    adapter: Arc<dyn ProviderAdapter>,
    char_limit: usize,
    style_suffix: String,
}

impl RemoteAnalyzer {
    pub fn new(adapter: Arc<dyn ProviderAdapter>, char_limit: usize, style_suffix: &str) -> Self {
        Self {
            adapter,
            char_limit,
            style_suffix: style_suffix.to_string(),
        }
    }

    fn user_prompt(&self, lyrics: &str, artist: &str, title: &str) -> String {
        format!(
            "Song: \"{}\" by {}\n\nLyrics:\n{}\n\nDescribe the image for this song.",
            title,
            artist,
            truncate_chars(lyrics, self.char_limit)
        )
    }
}

#[async_trait]
impl ContentAnalyzer for RemoteAnalyzer {
    async fn analyze(&self, lyrics: &str, artist: &str, title: &str) -> Result<AnalysisRecord, AnalysisError> {
        let request = CompletionRequest {
            messages: vec![
                Message::system(SYSTEM_PROMPT),
                Message::user(&self.user_prompt(lyrics, artist, title)),
            ],
            temperature: Some(0.7),
            max_tokens: Some(500),
            model: None,
        };
        let response = self.adapter.complete(request).await.map_err(|err| {
            if err.is_network() {
                AnalysisError::Network(err.message)
            } else {
                AnalysisError::Remote(err.to_string())
            }
        })?;

        let analysis = response.content.trim().to_string();
        if analysis.is_empty() {
            return Err(AnalysisError::EmptyResponse);
        }
        Ok(AnalysisRecord {
            full_prompt: full_prompt(&analysis, &self.style_suffix),
            analysis,
            mood: analyze_mood(lyrics).to_string(),
            themes: extract_themes(lyrics),
        })
    }
}
