use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::scrape::extract_lyrics;
use super::LyricsProvider;
use crate::error::LyricsError;
use crate::result::{SongRecord, SongSummary};

const USER_AGENT: &str = "LyricCanvas/0.1";

pub struct GeniusConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
}

pub struct GeniusProvider {
    cfg: GeniusConfig,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    response: SearchResponse,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    hits: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    #[serde(rename = "type", default)]
    hit_type: String,
    #[serde(default)]
    result: SongHit,
}

/// Non-song hits may lack any of these, so every field is optional on the wire.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SongHit {
    title: String,
    url: String,
    primary_artist: ArtistHit,
    song_art_image_url: Option<String>,
    song_art_image_thumbnail_url: Option<String>,
    release_date_for_display: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ArtistHit {
    name: String,
}

impl SearchHit {
    fn is_song(&self) -> bool {
        (self.hit_type.is_empty() || self.hit_type == "song") && !self.result.url.is_empty()
    }
}

impl GeniusProvider {
    pub fn new(mut cfg: GeniusConfig) -> Result<Self, LyricsError> {
        if cfg.base_url.is_empty() {
            cfg.base_url = "https://api.genius.com".to_string();
        }
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(cfg.timeout)
            .build()
            .map_err(|err| LyricsError::Network(err.to_string()))?;
        Ok(Self { cfg, client })
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, LyricsError> {
        let url = format!("{}/search", self.cfg.base_url.trim_end_matches('/'));
        tracing::debug!(%query, "genius search");
        let resp = self
            .client
            .get(url)
            .bearer_auth(&self.cfg.api_key)
            .query(&[("q", query)])
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(|err| LyricsError::Network(err.to_string()))?;
        let body = resp
            .text()
            .await
            .map_err(|err| LyricsError::Network(err.to_string()))?;
        let envelope: SearchEnvelope = serde_json::from_str(&body)
            .map_err(|err| LyricsError::ParseFailure(format!("search response ({})", err)))?;
        Ok(envelope.response.hits.into_iter().filter(SearchHit::is_song).collect())
    }

    async fn fetch_page(&self, url: &str) -> Result<String, LyricsError> {
        tracing::debug!(%url, "genius page");
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(|err| LyricsError::Network(err.to_string()))?;
        resp.text()
            .await
            .map_err(|err| LyricsError::Network(err.to_string()))
    }
}

#[async_trait]
impl LyricsProvider for GeniusProvider {
    async fn fetch(&self, artist: &str, title: &str) -> Result<SongRecord, LyricsError> {
        let query = format!("{} {}", artist, title);
        let hit = self
            .search(&query)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| LyricsError::NotFound(query.clone()))?;

        let page = self.fetch_page(&hit.result.url).await?;
        let lyrics = extract_lyrics(&page).ok_or_else(|| LyricsError::ParseFailure(hit.result.url.clone()))?;

        Ok(song_record(hit.result, lyrics))
    }

    async fn popular_songs(&self, artist: &str, limit: usize) -> Result<Vec<SongSummary>, LyricsError> {
        let hits = self.search(artist).await?;
        Ok(hits
            .into_iter()
            .take(limit)
            .map(|hit| SongSummary {
                title: hit.result.title,
                artist: hit.result.primary_artist.name,
                url: hit.result.url,
                image: hit.result.song_art_image_thumbnail_url,
            })
            .collect())
    }
}

fn song_record(hit: SongHit, lyrics: String) -> SongRecord {
    SongRecord {
        artist: hit.primary_artist.name,
        title: hit.title,
        lyrics,
        source_url: hit.url,
        album_art: hit.song_art_image_url.filter(|url| !url.is_empty()),
        release_date: hit.release_date_for_display.filter(|date| !date.is_empty()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEARCH_BODY: &str = r#"{
        "meta": {"status": 200},
        "response": {"hits": [
            {"type": "song", "result": {
                "id": 1,
                "title": "Hurt",
                "url": "https://genius.com/Johnny-cash-hurt-lyrics",
                "primary_artist": {"name": "Johnny Cash"},
                "song_art_image_url": "https://images.genius.com/hurt.jpg",
                "song_art_image_thumbnail_url": "https://images.genius.com/hurt.300.jpg",
                "release_date_for_display": ""
            }},
            {"type": "album", "result": {
                "title": "American IV",
                "url": "https://genius.com/albums/x",
                "primary_artist": {"name": "Johnny Cash"}
            }}
        ]}
    }"#;

    #[test]
    fn test_parses_search_hits() {
        let envelope: SearchEnvelope = serde_json::from_str(SEARCH_BODY).unwrap();
        assert_eq!(envelope.response.hits.len(), 2);
        assert_eq!(envelope.response.hits[1].hit_type, "album");
    }

    #[test]
    fn test_song_record_drops_empty_metadata() {
        let envelope: SearchEnvelope = serde_json::from_str(SEARCH_BODY).unwrap();
        let hit = envelope.response.hits.into_iter().next().unwrap();
        let record = song_record(hit.result, "I hurt myself today".to_string());
        assert_eq!(record.artist, "Johnny Cash");
        assert_eq!(record.title, "Hurt");
        assert_eq!(record.album_art.as_deref(), Some("https://images.genius.com/hurt.jpg"));
        assert!(record.release_date.is_none());
    }

    #[test]
    fn test_empty_hits_parse() {
        let envelope: SearchEnvelope = serde_json::from_str(r#"{"response": {"hits": []}}"#).unwrap();
        assert!(envelope.response.hits.is_empty());
    }

    mod wire {
        use super::*;
        use axum::http::StatusCode;
        use axum::response::Html;
        use axum::routing::get;
        use axum::{Json, Router};
        use serde_json::{json, Value};

        /// Serves the router built for its own base URL on an ephemeral port.
        fn serve(build: impl FnOnce(String) -> Router) -> String {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            let base = format!("http://{}", listener.local_addr().unwrap());
            let app = build(base.clone());
            tokio::spawn(axum::Server::from_tcp(listener).unwrap().serve(app.into_make_service()));
            base
        }

        fn provider(base: String) -> GeniusProvider {
            GeniusProvider::new(GeniusConfig {
                api_key: "genius-token".to_string(),
                base_url: base,
                timeout: Duration::from_secs(5),
            })
            .unwrap()
        }

        fn hits(base: &str) -> Value {
            json!({"response": {"hits": [
                {"type": "album", "result": {"name": "American IV"}},
                {"type": "song", "result": {
                    "title": "Hurt",
                    "url": format!("{}/hurt-lyrics", base),
                    "primary_artist": {"name": "Johnny Cash"},
                    "release_date_for_display": "2002"
                }}
            ]}})
        }

        #[tokio::test]
        async fn test_fetch_resolves_first_song_hit() {
            let base = serve(|base| {
                let body = hits(&base);
                Router::new()
                    .route("/search", get(move || async move { Json(body) }))
                    .route(
                        "/hurt-lyrics",
                        get(|| async {
                            Html(r#"<div data-lyrics-container="true">[Verse 1]<br>I hurt myself today</div>"#)
                        }),
                    )
            });
            let song = provider(base.clone()).fetch("johnny cash", "hurt").await.unwrap();
            assert_eq!(song.artist, "Johnny Cash");
            assert_eq!(song.title, "Hurt");
            assert_eq!(song.lyrics, "I hurt myself today");
            assert_eq!(song.source_url, format!("{}/hurt-lyrics", base));
            assert_eq!(song.release_date.as_deref(), Some("2002"));
        }

        #[tokio::test]
        async fn test_empty_hits_is_not_found() {
            let base = serve(|_| {
                Router::new().route(
                    "/search",
                    get(|| async { Json(json!({"response": {"hits": []}})) }),
                )
            });
            let err = provider(base).fetch("Unknown Artist", "Unknown Song").await.unwrap_err();
            assert!(matches!(err, LyricsError::NotFound(ref q) if q == "Unknown Artist Unknown Song"));
        }

        #[tokio::test]
        async fn test_page_without_lyrics_is_parse_failure() {
            let base = serve(|base| {
                let body = hits(&base);
                Router::new()
                    .route("/search", get(move || async move { Json(body) }))
                    .route("/hurt-lyrics", get(|| async { Html("<html><p>Lyrics coming soon</p></html>") }))
            });
            let err = provider(base).fetch("Johnny Cash", "Hurt").await.unwrap_err();
            assert!(matches!(err, LyricsError::ParseFailure(ref url) if url.ends_with("/hurt-lyrics")));
        }

        #[tokio::test]
        async fn test_server_error_is_network() {
            let base = serve(|_| {
                Router::new().route(
                    "/search",
                    get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "upstream down") }),
                )
            });
            let err = provider(base).fetch("Johnny Cash", "Hurt").await.unwrap_err();
            assert!(matches!(err, LyricsError::Network(_)));
        }

        #[tokio::test]
        async fn test_malformed_search_body_is_parse_failure() {
            let base = serve(|_| Router::new().route("/search", get(|| async { "not json" })));
            let err = provider(base).fetch("Johnny Cash", "Hurt").await.unwrap_err();
            assert!(matches!(err, LyricsError::ParseFailure(_)));
        }

        #[tokio::test]
        async fn test_popular_songs_skips_other_hits() {
            let base = serve(|base| {
                let body = hits(&base);
                Router::new().route("/search", get(move || async move { Json(body) }))
            });
            let songs = provider(base).popular_songs("Johnny Cash", 5).await.unwrap();
            assert_eq!(songs.len(), 1);
            assert_eq!(songs[0].title, "Hurt");
            assert_eq!(songs[0].artist, "Johnny Cash");
        }
    }
}
