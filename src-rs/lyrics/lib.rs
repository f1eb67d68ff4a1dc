use async_trait::async_trait;

use crate::error::LyricsError;
use crate::result::{SongRecord, SongSummary};

pub mod genius;
pub mod scrape;

pub use genius::{GeniusConfig, GeniusProvider};

/// Finds a song in the lyrics catalog and returns its plain-text lyrics.
///
/// The first search hit is taken as the match, so the returned artist and
/// title can differ from what was asked for.
#[async_trait]
pub trait LyricsProvider: Send + Sync {
    async fn fetch(&self, artist: &str, title: &str) -> Result<SongRecord, LyricsError>;

    /// Up to `limit` songs the catalog associates with `artist`.
    async fn popular_songs(&self, artist: &str, limit: usize) -> Result<Vec<SongSummary>, LyricsError>;
}
