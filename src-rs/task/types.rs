use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::TransitionError;
use crate::result::{AnalysisRecord, ImageRecord, SongRecord};

pub const STEP_SEARCHING: &str = "Searching for lyrics...";
pub const STEP_ANALYZING: &str = "Analyzing lyrics...";
pub const STEP_GENERATING: &str = "Generating image...";
pub const STEP_DONE: &str = "Done!";
pub const STEP_FAILED: &str = "Failed";

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TaskId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Searching,
    Analyzing,
    Generating,
    Completed,
    Error,
}

impl TaskStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Error)
    }

    fn next(self) -> Option<TaskStatus> {
        match self {
            TaskStatus::Searching => Some(TaskStatus::Analyzing),
            TaskStatus::Analyzing => Some(TaskStatus::Generating),
            TaskStatus::Generating => Some(TaskStatus::Completed),
            TaskStatus::Completed | TaskStatus::Error => None,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TaskStatus::Searching => "searching",
            TaskStatus::Analyzing => "analyzing",
            TaskStatus::Generating => "generating",
            TaskStatus::Completed => "completed",
            TaskStatus::Error => "error",
        };
        f.write_str(label)
    }
}

/// One song-to-image job.
///
/// Stage outputs are only written through the `record_*` methods, which each
/// require the status the stage runs in, so a field can be set at most once
/// and never ahead of the fields of earlier stages.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub artist: String,
    pub title: String,
    pub status: TaskStatus,
    pub step: String,
    pub progress: u8,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub processing_time_secs: Option<f64>,

    pub resolved_artist: Option<String>,
    pub resolved_title: Option<String>,
    pub lyrics: Option<String>,
    pub source_url: Option<String>,
    pub album_art: Option<String>,
    pub release_date: Option<String>,

    pub analysis: Option<String>,
    pub mood: Option<String>,
    pub themes: Option<Vec<String>>,
    pub generated_prompt: Option<String>,

    pub image_url: Option<String>,
    pub local_image: Option<String>,
    pub revised_prompt: Option<String>,

    pub error: Option<String>,
}

impl Task {
    pub fn new(artist: &str, title: &str) -> Self {
        let now = Utc::now();
        Self {
            id: TaskId::generate(),
            artist: artist.to_string(),
            title: title.to_string(),
            status: TaskStatus::Searching,
            step: STEP_SEARCHING.to_string(),
            progress: 10,
            created_at: now,
            updated_at: now,
            completed_at: None,
            processing_time_secs: None,
            resolved_artist: None,
            resolved_title: None,
            lyrics: None,
            source_url: None,
            album_art: None,
            release_date: None,
            analysis: None,
            mood: None,
            themes: None,
            generated_prompt: None,
            image_url: None,
            local_image: None,
            revised_prompt: None,
            error: None,
        }
    }

    pub fn record_lyrics(&mut self, song: SongRecord) -> Result<(), TransitionError> {
        self.advance(TaskStatus::Searching, STEP_ANALYZING, 40)?;
        self.resolved_artist = Some(song.artist);
        self.resolved_title = Some(song.title);
        self.lyrics = Some(song.lyrics);
        self.source_url = Some(song.source_url);
        self.album_art = song.album_art;
        self.release_date = song.release_date;
        Ok(())
    }

    pub fn record_analysis(&mut self, analysis: AnalysisRecord) -> Result<(), TransitionError> {
        self.advance(TaskStatus::Analyzing, STEP_GENERATING, 70)?;
        self.analysis = Some(analysis.analysis);
        self.mood = Some(analysis.mood);
        self.themes = Some(analysis.themes);
        self.generated_prompt = Some(analysis.full_prompt);
        Ok(())
    }

    pub fn record_image(&mut self, image: ImageRecord) -> Result<(), TransitionError> {
        self.advance(TaskStatus::Generating, STEP_DONE, 100)?;
        self.image_url = Some(image.image_url);
        self.local_image = Some(image.local_image);
        self.revised_prompt = image.revised_prompt;
        self.completed_at = Some(self.updated_at);
        let elapsed = self.updated_at - self.created_at;
        self.processing_time_secs = Some(elapsed.num_milliseconds().max(0) as f64 / 1000.0);
        Ok(())
    }

    /// Moves any non-terminal task to `error`. Progress is left where it was.
    pub fn fail(&mut self, message: &str) -> Result<(), TransitionError> {
        if self.status.is_terminal() {
            return Err(TransitionError::Terminal(self.status));
        }
        self.status = TaskStatus::Error;
        self.step = STEP_FAILED.to_string();
        self.error = Some(message.to_string());
        self.updated_at = Utc::now();
        Ok(())
    }

    fn advance(&mut self, expected: TaskStatus, step: &str, progress: u8) -> Result<(), TransitionError> {
        if self.status.is_terminal() {
            return Err(TransitionError::Terminal(self.status));
        }
        let to = expected.next().unwrap_or(TaskStatus::Error);
        if self.status != expected {
            return Err(TransitionError::OutOfOrder {
                from: self.status,
                to,
            });
        }
        self.status = to;
        self.step = step.to_string();
        self.progress = self.progress.max(progress);
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn snapshot(&self, preview_chars: usize) -> TaskSnapshot {
        TaskSnapshot {
            id: self.id.clone(),
            artist: self.artist.clone(),
            title: self.title.clone(),
            status: self.status,
            step: self.step.clone(),
            progress: self.progress,
            created_at: self.created_at,
            completed_at: self.completed_at,
            processing_time_secs: self.processing_time_secs,
            resolved_artist: self.resolved_artist.clone(),
            resolved_title: self.resolved_title.clone(),
            lyrics_preview: self.lyrics.as_deref().map(|text| preview(text, preview_chars)),
            source_url: self.source_url.clone(),
            album_art: self.album_art.clone(),
            release_date: self.release_date.clone(),
            analysis: self.analysis.clone(),
            mood: self.mood.clone(),
            themes: self.themes.clone(),
            generated_prompt: self.generated_prompt.clone(),
            image_url: self.image_url.clone(),
            local_image: self.local_image.clone(),
            revised_prompt: self.revised_prompt.clone(),
            error: self.error.clone(),
        }
    }
}

/// Polling view of a task: full lyrics are replaced by a short preview.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TaskSnapshot {
    pub id: TaskId,
    pub artist: String,
    pub title: String,
    pub status: TaskStatus,
    pub step: String,
    pub progress: u8,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_time_secs: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_artist: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lyrics_preview: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub album_art: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mood: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub themes: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revised_prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn song() -> SongRecord {
        SongRecord {
            artist: "Artist A".to_string(),
            title: "Song B".to_string(),
            lyrics: "la la la".to_string(),
            source_url: "https://genius.com/a-b-lyrics".to_string(),
            album_art: None,
            release_date: Some("1999".to_string()),
        }
    }

    fn analysis() -> AnalysisRecord {
        AnalysisRecord {
            analysis: "a quiet night".to_string(),
            mood: "calm".to_string(),
            themes: vec!["night".to_string()],
            full_prompt: "a quiet night\n\nStyle: digital art".to_string(),
        }
    }

    fn image() -> ImageRecord {
        ImageRecord {
            image_url: "https://img.example/1.png".to_string(),
            local_image: "/static/images/1.png".to_string(),
            local_path: "static/images/1.png".into(),
            revised_prompt: None,
        }
    }

    #[test]
    fn test_new_task_starts_searching() {
        let task = Task::new("Artist A", "Song B");
        assert_eq!(task.status, TaskStatus::Searching);
        assert_eq!(task.progress, 10);
        assert!(task.lyrics.is_none());
        assert!(task.error.is_none());
    }

    #[test]
    fn test_full_walk_reaches_completed() {
        let mut task = Task::new("Artist A", "Song B");
        task.record_lyrics(song()).unwrap();
        assert_eq!((task.status, task.progress), (TaskStatus::Analyzing, 40));
        task.record_analysis(analysis()).unwrap();
        assert_eq!((task.status, task.progress), (TaskStatus::Generating, 70));
        task.record_image(image()).unwrap();
        assert_eq!((task.status, task.progress), (TaskStatus::Completed, 100));
        let completed_at = task.completed_at.unwrap();
        assert!(completed_at >= task.created_at);
        assert!(task.processing_time_secs.unwrap() >= 0.0);
    }

    #[test]
    fn test_stage_output_is_write_once() {
        let mut task = Task::new("Artist A", "Song B");
        task.record_lyrics(song()).unwrap();
        let err = task.record_lyrics(song()).unwrap_err();
        assert_eq!(
            err,
            TransitionError::OutOfOrder {
                from: TaskStatus::Analyzing,
                to: TaskStatus::Analyzing,
            }
        );
    }

    #[test]
    fn test_cannot_skip_a_stage() {
        let mut task = Task::new("Artist A", "Song B");
        assert!(task.record_image(image()).is_err());
        assert!(task.image_url.is_none());
        assert_eq!(task.status, TaskStatus::Searching);
    }

    #[test]
    fn test_terminal_task_rejects_writes() {
        let mut task = Task::new("Artist A", "Song B");
        task.fail("song not found").unwrap();
        assert_eq!(task.status, TaskStatus::Error);
        assert_eq!(
            task.fail("again").unwrap_err(),
            TransitionError::Terminal(TaskStatus::Error)
        );
        assert_eq!(
            task.record_lyrics(song()).unwrap_err(),
            TransitionError::Terminal(TaskStatus::Error)
        );
        assert_eq!(task.error.as_deref(), Some("song not found"));
    }

    #[test]
    fn test_failure_keeps_earlier_outputs() {
        let mut task = Task::new("Artist A", "Song B");
        task.record_lyrics(song()).unwrap();
        task.fail("analysis failed").unwrap();
        assert_eq!(task.lyrics.as_deref(), Some("la la la"));
        assert!(task.analysis.is_none());
        assert_eq!(task.progress, 40);
        assert!(task.completed_at.is_none());
    }

    #[test]
    fn test_preview_truncates_on_char_boundary() {
        assert_eq!(preview("short", 200), "short");
        assert_eq!(preview("ёжик в тумане", 4), "ёжик...");
        let exact = "a".repeat(200);
        assert_eq!(preview(&exact, 200), exact);
    }

    #[test]
    fn test_snapshot_hides_full_lyrics() {
        let mut task = Task::new("Artist A", "Song B");
        let mut long = song();
        long.lyrics = "x".repeat(500);
        task.record_lyrics(long).unwrap();
        let snap = task.snapshot(200);
        let preview = snap.lyrics_preview.unwrap();
        assert_eq!(preview.chars().count(), 203);
        assert!(preview.ends_with("..."));
        let json = serde_json::to_value(task.snapshot(200)).unwrap();
        assert!(json.get("lyrics").is_none());
        assert_eq!(json["status"], "analyzing");
    }
}
