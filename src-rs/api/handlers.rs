use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::Json;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{ApiError, ApiResult};
use crate::orchestrator::Orchestrator;
use crate::result::SongSummary;
use crate::task::{TaskId, TaskSnapshot};

pub const TRENDING_ARTISTS: [&str; 5] = ["Taylor Swift", "The Weeknd", "Drake", "Billie Eilish", "Kanye West"];

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub artist: String,
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub success: bool,
    pub task_id: TaskId,
    pub status_url: String,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub success: bool,
    pub task: TaskSnapshot,
}

#[derive(Debug, Serialize)]
pub struct TrendingResponse {
    pub success: bool,
    pub artist: String,
    pub songs: Vec<SongSummary>,
}

#[derive(Debug, Deserialize, Default)]
pub struct TasksQuery {
    pub limit: Option<usize>,
}

pub async fn handle_health(State(orchestrator): State<Arc<Orchestrator>>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "running_tasks": orchestrator.outstanding(),
    }))
}

pub async fn handle_search(
    State(orchestrator): State<Arc<Orchestrator>>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> ApiResult<Json<SearchResponse>> {
    let Json(req) = payload.map_err(|rejection| match rejection {
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::UnsupportedMediaType("Content-Type must be application/json".to_string())
        }
        other => ApiError::BadRequest(other.body_text()),
    })?;

    let task_id = orchestrator.submit(&req.artist, &req.title)?;
    Ok(Json(SearchResponse {
        success: true,
        status_url: format!("/api/status/{}", task_id),
        task_id,
    }))
}

pub async fn handle_status(
    State(orchestrator): State<Arc<Orchestrator>>,
    Path(task_id): Path<String>,
) -> ApiResult<Json<StatusResponse>> {
    let task = orchestrator.get_status(&TaskId::from(task_id.as_str()))?;
    Ok(Json(StatusResponse { success: true, task }))
}

pub async fn handle_tasks(
    State(orchestrator): State<Arc<Orchestrator>>,
    Query(query): Query<TasksQuery>,
) -> ApiResult<Json<serde_json::Value>> {
    let limit = query.limit.unwrap_or(10);
    let tasks = orchestrator.list(limit)?;
    Ok(Json(json!({"success": true, "tasks": tasks})))
}

pub async fn handle_trending(State(orchestrator): State<Arc<Orchestrator>>) -> ApiResult<Json<TrendingResponse>> {
    let artist = TRENDING_ARTISTS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(TRENDING_ARTISTS[0]);
    let songs = orchestrator
        .popular_songs(artist, 5)
        .await
        .map_err(|err| ApiError::Internal(err.to_string()))?;
    Ok(Json(TrendingResponse {
        success: true,
        artist: artist.to_string(),
        songs,
    }))
}
