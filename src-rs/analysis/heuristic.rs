//! Keyword and lexicon based analysis that needs no remote model.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;

use super::{full_prompt, truncate_chars, ContentAnalyzer};
use crate::error::AnalysisError;
use crate::result::AnalysisRecord;

const THEME_COUNT: usize = 5;
const MOOD_SAMPLE_CHARS: usize = 1000;

const STOP_WORDS: &[&str] = &[
    "the", "and", "you", "that", "for", "with", "this", "your", "a", "an", "i", "me", "my", "is", "it", "in", "on",
    "of", "to", "be", "are", "was", "we", "so", "but", "all", "just", "what", "when", "oh", "yeah", "im", "dont",
    "its", "do", "at", "no", "not", "can", "if", "up", "out", "got", "like", "know", "get", "go", "now", "she",
    "he", "they", "her", "his", "our", "us", "them", "from", "by", "or", "as", "will", "would", "there", "then",
];

const POSITIVE_WORDS: &[&str] = &[
    "happy", "joy", "smile", "sun", "sunshine", "shine", "bright", "dance", "alive", "free", "light", "laugh",
    "celebrate", "good", "beautiful", "high", "gold", "fun", "party", "hope",
];

const NEGATIVE_WORDS: &[&str] = &[
    "sad", "cry", "tears", "pain", "hurt", "alone", "lonely", "dark", "darkness", "die", "dead", "lost", "broken",
    "cold", "rain", "empty", "goodbye", "grave", "sorrow", "fear",
];

const ANGRY_WORDS: &[&str] = &[
    "hate", "rage", "fight", "burn", "fire", "kill", "war", "scream", "blood", "fury", "angry", "destroy",
];

const ROMANTIC_WORDS: &[&str] = &[
    "love", "heart", "kiss", "baby", "darling", "hold", "touch", "forever", "together", "lover",
];

const GENRE_STYLES: &[(&str, &str)] = &[
    ("rock", "dark fantasy, dramatic lighting"),
    ("pop", "vibrant, colorful, pop art"),
    ("rap", "urban, graffiti, street art"),
    ("electronic", "cyberpunk, neon, futuristic"),
    ("indie", "watercolor, dreamy, vintage"),
    ("classical", "baroque painting, oil painting style"),
];

const MOOD_STYLES: &[(&str, &str)] = &[
    ("joyful", "bright, colorful, cheerful"),
    ("melancholic", "melancholic, blue tones, rainy"),
    ("angry", "chaotic, red tones, aggressive"),
    ("romantic", "soft, pastel colors, dreamy"),
];

const FALLBACK_STYLE: &str = "digital art, fantasy";

/// The five most frequent alphabetic words that are not stop words.
/// Ties keep the order of first appearance.
pub fn extract_themes(text: &str) -> Vec<String> {
    let stop: HashSet<&str> = STOP_WORDS.iter().copied().collect();
    let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
    for (position, raw) in text.split_whitespace().enumerate() {
        let word = raw
            .trim_matches(|c: char| !c.is_alphabetic())
            .to_lowercase();
        if word.chars().count() < 3 || !word.chars().all(char::is_alphabetic) || stop.contains(word.as_str()) {
            continue;
        }
        let entry = counts.entry(word).or_insert((0, position));
        entry.0 += 1;
    }
    let mut ranked: Vec<(String, (usize, usize))> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1 .0.cmp(&a.1 .0).then(a.1 .1.cmp(&b.1 .1)));
    ranked.into_iter().take(THEME_COUNT).map(|(word, _)| word).collect()
}

/// Single mood label from lexicon hits over the first part of the lyrics.
pub fn analyze_mood(text: &str) -> &'static str {
    let sample = truncate_chars(text, MOOD_SAMPLE_CHARS).to_lowercase();
    let mut scores = [0usize; 4];
    for word in sample.split(|c: char| !c.is_alphabetic()).filter(|w| !w.is_empty()) {
        if POSITIVE_WORDS.contains(&word) {
            scores[0] += 1;
        }
        if NEGATIVE_WORDS.contains(&word) {
            scores[1] += 1;
        }
        if ANGRY_WORDS.contains(&word) {
            scores[2] += 1;
        }
        if ROMANTIC_WORDS.contains(&word) {
            scores[3] += 1;
        }
    }
    let [positive, negative, angry, romantic] = scores;
    if scores.iter().all(|score| *score == 0) {
        return "mysterious";
    }
    if angry > positive && angry > negative && angry >= romantic {
        return "angry";
    }
    if romantic > positive && romantic > negative {
        return "romantic";
    }
    if positive > negative {
        "joyful"
    } else if negative > positive {
        "melancholic"
    } else {
        "calm"
    }
}

pub fn determine_style(artist: &str, mood: &str) -> &'static str {
    let artist = artist.to_lowercase();
    if let Some((_, style)) = GENRE_STYLES.iter().find(|(genre, _)| artist.contains(genre)) {
        return style;
    }
    MOOD_STYLES
        .iter()
        .find(|(label, _)| *label == mood)
        .map(|(_, style)| *style)
        .unwrap_or(FALLBACK_STYLE)
}

pub fn build_prompt(artist: &str, themes: &[String], mood: &str, style: &str) -> String {
    let mut parts = vec![format!("{} style", style)];
    if !themes.is_empty() {
        parts.push(themes.iter().take(3).cloned().collect::<Vec<_>>().join(", "));
    }
    parts.push("highly detailed".to_string());
    parts.push("professional digital art".to_string());
    parts.push(format!("mood: {}", mood));
    if !artist.is_empty() {
        parts.push(format!("inspired by {}", artist));
    }
    parts.join(", ")
}

pub struct HeuristicAnalyzer {
    style_suffix: String,
}

impl HeuristicAnalyzer {
    pub fn new(style_suffix: &str) -> Self {
        Self {
            style_suffix: style_suffix.to_string(),
        }
    }
}

#[async_trait]
impl ContentAnalyzer for HeuristicAnalyzer {
    async fn analyze(&self, lyrics: &str, artist: &str, _title: &str) -> Result<AnalysisRecord, AnalysisError> {
        if lyrics.trim().is_empty() {
            return Err(AnalysisError::Remote("no lyrics to analyze".to_string()));
        }
        let themes = extract_themes(lyrics);
        let mood = analyze_mood(lyrics);
        let style = determine_style(artist, mood);
        let analysis = build_prompt(artist, &themes, mood, style);
        Ok(AnalysisRecord {
            full_prompt: full_prompt(&analysis, &self.style_suffix),
            analysis,
            mood: mood.to_string(),
            themes,
        })
    }
}
