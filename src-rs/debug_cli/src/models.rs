use serde::{Deserialize, Serialize};

#[derive(Clone, Debug)]
pub struct CLIConfig {
    pub base_url: String,
    pub poll_interval_ms: u64,
    /// Polls before `/search` stops waiting and leaves the task running.
    pub poll_limit: u64,
    pub debug: bool,
}

#[derive(Debug, Serialize)]
pub struct SearchRequest {
    pub artist: String,
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub success: bool,
    pub task_id: Option<String>,
    pub status_url: Option<String>,
    pub error: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct TaskInfo {
    pub id: String,
    pub artist: String,
    pub title: String,
    pub status: String,
    pub step: String,
    pub progress: u8,
    pub created_at: String,
    pub completed_at: Option<String>,
    pub processing_time_secs: Option<f64>,
    pub lyrics_preview: Option<String>,
    pub analysis: Option<String>,
    pub mood: Option<String>,
    pub themes: Option<Vec<String>>,
    pub generated_prompt: Option<String>,
    pub image_url: Option<String>,
    pub local_image: Option<String>,
    pub error: Option<String>,
}

impl TaskInfo {
    pub fn is_terminal(&self) -> bool {
        matches!(self.status.as_str(), "completed" | "error")
    }
}

#[derive(Debug, Deserialize)]
pub struct TrendingSong {
    pub title: String,
    pub artist: String,
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct TrendingResponse {
    pub artist: String,
    pub songs: Vec<TrendingSong>,
}
