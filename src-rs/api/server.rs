use std::future::Future;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::api::handlers::{handle_health, handle_search, handle_status, handle_tasks, handle_trending};
use crate::orchestrator::Orchestrator;

pub fn build_router(orchestrator: Arc<Orchestrator>, asset_dir: PathBuf, asset_url_prefix: &str) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .route("/search", post(handle_search))
        .route("/api/status/:task_id", get(handle_status))
        .route("/api/trending", get(handle_trending))
        .route("/tasks", get(handle_tasks))
        .nest_service(asset_url_prefix, ServeDir::new(asset_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(orchestrator)
}

pub struct AppServer {
    pub addr: SocketAddr,
    pub orchestrator: Arc<Orchestrator>,
    pub asset_dir: PathBuf,
    pub asset_url_prefix: String,
}

impl AppServer {
    pub fn new(addr: SocketAddr, orchestrator: Arc<Orchestrator>, asset_dir: PathBuf, asset_url_prefix: &str) -> Self {
        Self {
            addr,
            orchestrator,
            asset_dir,
            asset_url_prefix: asset_url_prefix.to_string(),
        }
    }

    /// Serves until `shutdown` resolves. Outstanding pipelines are left to the caller.
    pub async fn start<F>(&self, shutdown: F) -> Result<(), String>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = build_router(
            self.orchestrator.clone(),
            self.asset_dir.clone(),
            &self.asset_url_prefix,
        );
        axum::Server::try_bind(&self.addr)
            .map_err(|err| err.to_string())?
            .serve(app.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|err| err.to_string())
    }
}
