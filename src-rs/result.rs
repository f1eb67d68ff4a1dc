use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A song as matched by the lyrics catalog, which may differ from what was asked for.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SongRecord {
    pub artist: String,
    pub title: String,
    pub lyrics: String,
    pub source_url: String,
    pub album_art: Option<String>,
    pub release_date: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SongSummary {
    pub title: String,
    pub artist: String,
    pub url: String,
    pub image: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub analysis: String,
    pub mood: String,
    pub themes: Vec<String>,
    pub full_prompt: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ImageRecord {
    pub image_url: String,
    pub local_image: String,
    pub local_path: PathBuf,
    pub revised_prompt: Option<String>,
}
