//! Fake stages and polling helpers shared by the integration tests.
#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;

use lyric_canvas::analysis::ContentAnalyzer;
use lyric_canvas::error::{AnalysisError, LyricsError, SynthesisError};
use lyric_canvas::image::{AssetStore, ImageSynthesizer};
use lyric_canvas::lyrics::LyricsProvider;
use lyric_canvas::task::InMemoryTaskStore;
use lyric_canvas::{AnalysisRecord, ImageRecord, Orchestrator, Pipeline, SongRecord, SongSummary, TaskId, TaskSnapshot};

pub enum LyricsOutcome {
    Found,
    NotFound,
    Unparseable,
}

pub struct FakeLyrics {
    pub outcome: LyricsOutcome,
    pub gate: Option<Arc<Notify>>,
}

impl FakeLyrics {
    pub fn found() -> Self {
        Self {
            outcome: LyricsOutcome::Found,
            gate: None,
        }
    }

    pub fn gated(gate: Arc<Notify>) -> Self {
        Self {
            outcome: LyricsOutcome::Found,
            gate: Some(gate),
        }
    }
}

pub fn lyrics_text() -> String {
    "Under the silver moon we walk alone\n".repeat(20)
}

#[async_trait]
impl LyricsProvider for FakeLyrics {
    async fn fetch(&self, artist: &str, title: &str) -> Result<SongRecord, LyricsError> {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        match self.outcome {
            LyricsOutcome::Found => Ok(SongRecord {
                artist: artist.to_string(),
                title: title.to_string(),
                lyrics: lyrics_text(),
                source_url: "https://genius.com/fake-lyrics".to_string(),
                album_art: None,
                release_date: None,
            }),
            LyricsOutcome::NotFound => Err(LyricsError::NotFound(format!("{} {}", artist, title))),
            LyricsOutcome::Unparseable => Err(LyricsError::ParseFailure("https://genius.com/x".to_string())),
        }
    }

    async fn popular_songs(&self, artist: &str, limit: usize) -> Result<Vec<SongSummary>, LyricsError> {
        Ok((0..limit)
            .map(|idx| SongSummary {
                title: format!("Hit {}", idx),
                artist: artist.to_string(),
                url: format!("https://genius.com/hit-{}", idx),
                image: None,
            })
            .collect())
    }
}

pub struct FakeAnalyzer {
    pub fail: bool,
    pub gate: Option<Arc<Notify>>,
}

impl FakeAnalyzer {
    pub fn ok() -> Self {
        Self { fail: false, gate: None }
    }

    pub fn failing() -> Self {
        Self { fail: true, gate: None }
    }
}

#[async_trait]
impl ContentAnalyzer for FakeAnalyzer {
    async fn analyze(&self, _lyrics: &str, artist: &str, title: &str) -> Result<AnalysisRecord, AnalysisError> {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if self.fail {
            return Err(AnalysisError::Remote("model unavailable".to_string()));
        }
        let analysis = format!("A moonlit road for {} by {}", title, artist);
        Ok(AnalysisRecord {
            full_prompt: format!("{}\n\nStyle: digital art", analysis),
            analysis,
            mood: "melancholic".to_string(),
            themes: vec!["moon".to_string(), "alone".to_string()],
        })
    }
}

pub enum SynthBehaviour {
    Succeed,
    Fail,
    Panic,
}

pub struct FakeSynth {
    pub assets: AssetStore,
    pub behaviour: SynthBehaviour,
    pub gate: Option<Arc<Notify>>,
}

impl FakeSynth {
    pub fn new(dir: &Path, behaviour: SynthBehaviour) -> Self {
        Self {
            assets: AssetStore::new(dir, "/static/images"),
            behaviour,
            gate: None,
        }
    }
}

#[async_trait]
impl ImageSynthesizer for FakeSynth {
    async fn synthesize(&self, prompt: &str) -> Result<ImageRecord, SynthesisError> {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        match self.behaviour {
            SynthBehaviour::Succeed => {
                let stored = self.assets.save(prompt, b"fake png").await?;
                Ok(ImageRecord {
                    image_url: "https://images.example/generated.png".to_string(),
                    local_image: stored.public_url,
                    local_path: stored.path,
                    revised_prompt: Some(prompt.to_string()),
                })
            }
            SynthBehaviour::Fail => Err(SynthesisError::Remote("content policy".to_string())),
            SynthBehaviour::Panic => panic!("generator exploded"),
        }
    }
}

pub fn orchestrator_with(
    lyrics: impl LyricsProvider + 'static,
    analyzer: impl ContentAnalyzer + 'static,
    synth: impl ImageSynthesizer + 'static,
) -> (Orchestrator, Arc<InMemoryTaskStore>) {
    let store = Arc::new(InMemoryTaskStore::new());
    let pipeline = Pipeline {
        store: store.clone(),
        lyrics: Arc::new(lyrics),
        analyzer: Arc::new(analyzer),
        synthesizer: Arc::new(synth),
    };
    (Orchestrator::new(pipeline, 4, 200), store)
}

/// Polls until the task is terminal, returning every snapshot seen on the way.
pub async fn poll_until_terminal(orchestrator: &Orchestrator, id: &TaskId) -> Vec<TaskSnapshot> {
    let mut seen = Vec::new();
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        let snapshot = orchestrator.get_status(id).expect("task should exist");
        let done = snapshot.status.is_terminal();
        seen.push(snapshot);
        if done {
            return seen;
        }
        assert!(tokio::time::Instant::now() < deadline, "task did not finish in time");
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
}
