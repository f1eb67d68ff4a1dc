use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio_util::sync::CancellationToken;

use crate::analysis::ContentAnalyzer;
use crate::error::{OrchestratorError, StoreError};
use crate::image::ImageSynthesizer;
use crate::lyrics::LyricsProvider;
use crate::result::SongSummary;
use crate::task::{PipelineExecutor, ShutdownMode, Task, TaskId, TaskSnapshot, TaskStatus, TaskStore};

pub const ABANDONED_MESSAGE: &str = "abandoned: service shutting down";

/// The three stages a task runs through, plus the store they report to.
#[derive(Clone)]
pub struct Pipeline {
    pub store: Arc<dyn TaskStore>,
    pub lyrics: Arc<dyn LyricsProvider>,
    pub analyzer: Arc<dyn ContentAnalyzer>,
    pub synthesizer: Arc<dyn ImageSynthesizer>,
}

impl Pipeline {
    /// Drives one task to a terminal state. Never panics outward.
    pub async fn run(self, id: TaskId, artist: String, title: String, cancel: CancellationToken) {
        let driven = AssertUnwindSafe(self.drive(&id, &artist, &title)).catch_unwind();
        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::warn!(task_id = %id, "pipeline abandoned");
                self.fail(&id, ABANDONED_MESSAGE).map(|_| TaskStatus::Error)
            }
            driven = driven => match driven {
                Ok(result) => result,
                Err(panic) => {
                    let message = format!("critical error: {}", panic_message(panic.as_ref()));
                    tracing::error!(task_id = %id, "{}", message);
                    self.fail(&id, &message).map(|_| TaskStatus::Error)
                }
            },
        };

        match outcome {
            Ok(TaskStatus::Completed) => tracing::info!(task_id = %id, "task completed"),
            Ok(status) => tracing::info!(task_id = %id, %status, "task finished"),
            Err(err) => tracing::error!(task_id = %id, "could not record task outcome: {}", err),
        }
    }

    async fn drive(&self, id: &TaskId, artist: &str, title: &str) -> Result<TaskStatus, StoreError> {
        let song = match self.lyrics.fetch(artist, title).await {
            Ok(song) => song,
            Err(err) => return self.stage_failed(id, "lyrics", &err.to_string()),
        };
        let lyrics = song.lyrics.clone();
        let (resolved_artist, resolved_title) = (song.artist.clone(), song.title.clone());
        self.store.update(id, Box::new(move |task: &mut Task| task.record_lyrics(song)))?;

        let analysis = match self.analyzer.analyze(&lyrics, &resolved_artist, &resolved_title).await {
            Ok(analysis) => analysis,
            Err(err) => return self.stage_failed(id, "analysis", &err.to_string()),
        };
        let prompt = analysis.full_prompt.clone();
        self.store.update(id, Box::new(move |task: &mut Task| task.record_analysis(analysis)))?;

        let image = match self.synthesizer.synthesize(&prompt).await {
            Ok(image) => image,
            Err(err) => return self.stage_failed(id, "image", &err.to_string()),
        };
        let task = self.store.update(id, Box::new(move |task: &mut Task| task.record_image(image)))?;
        Ok(task.status)
    }

    fn stage_failed(&self, id: &TaskId, stage: &str, message: &str) -> Result<TaskStatus, StoreError> {
        tracing::warn!(task_id = %id, stage, "stage failed: {}", message);
        self.fail(id, message)?;
        Ok(TaskStatus::Error)
    }

    fn fail(&self, id: &TaskId, message: &str) -> Result<Task, StoreError> {
        let message = message.to_string();
        self.store
            .update(id, Box::new(move |task: &mut Task| task.fail(&message)))
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        text.to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Accepts songs, runs their pipelines in the background and answers polls.
pub struct Orchestrator {
    pipeline: Pipeline,
    executor: PipelineExecutor,
    preview_chars: usize,
}

impl Orchestrator {
    pub fn new(pipeline: Pipeline, max_concurrent: usize, preview_chars: usize) -> Self {
        Self {
            pipeline,
            executor: PipelineExecutor::new(max_concurrent),
            preview_chars,
        }
    }

    pub fn store(&self) -> Arc<dyn TaskStore> {
        self.pipeline.store.clone()
    }

    /// Creates the task and schedules its pipeline; returns without waiting on any stage.
    pub fn submit(&self, artist: &str, title: &str) -> Result<TaskId, OrchestratorError> {
        let artist = artist.trim();
        let title = title.trim();
        if artist.is_empty() || title.is_empty() {
            return Err(OrchestratorError::InvalidInput(
                "both artist and title are required".to_string(),
            ));
        }
        if self.executor.is_closed() {
            return Err(OrchestratorError::ShuttingDown);
        }

        let task = Task::new(artist, title);
        let id = task.id.clone();
        self.pipeline.store.insert(task)?;

        let pipeline = self.pipeline.clone();
        let (job_id, job_artist, job_title) = (id.clone(), artist.to_string(), title.to_string());
        let scheduled = self
            .executor
            .spawn(move |cancel| pipeline.run(job_id, job_artist, job_title, cancel));
        if !scheduled {
            // Lost a race with shutdown after the insert.
            self.pipeline.fail(&id, ABANDONED_MESSAGE)?;
            return Err(OrchestratorError::ShuttingDown);
        }

        tracing::info!(task_id = %id, %artist, %title, "task submitted");
        Ok(id)
    }

    pub fn get_status(&self, id: &TaskId) -> Result<TaskSnapshot, OrchestratorError> {
        Ok(self.get_task(id)?.snapshot(self.preview_chars))
    }

    pub fn get_task(&self, id: &TaskId) -> Result<Task, OrchestratorError> {
        self.pipeline
            .store
            .get(id)?
            .ok_or_else(|| OrchestratorError::NotFound(id.to_string()))
    }

    pub fn list(&self, limit: usize) -> Result<Vec<TaskSnapshot>, OrchestratorError> {
        Ok(self
            .pipeline
            .store
            .list(limit)?
            .iter()
            .map(|task| task.snapshot(self.preview_chars))
            .collect())
    }

    pub async fn popular_songs(&self, artist: &str, limit: usize) -> Result<Vec<SongSummary>, OrchestratorError> {
        Ok(self.pipeline.lyrics.popular_songs(artist, limit).await?)
    }

    pub fn outstanding(&self) -> usize {
        self.executor.outstanding()
    }

    pub async fn shutdown(&self, mode: ShutdownMode) {
        self.executor.shutdown(mode).await;
    }
}
