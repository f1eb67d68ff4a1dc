use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use lyric_canvas::api::AppServer;
use lyric_canvas::helpers::{build_orchestrator, config_from_env, retention_policy};
use lyric_canvas::task::spawn_sweeper;
use lyric_canvas::ShutdownMode;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cfg = config_from_env()?;
    let addr: SocketAddr = format!("{}:{}", cfg.host, cfg.port)
        .parse()
        .with_context(|| format!("invalid listen address {}:{}", cfg.host, cfg.port))?;

    let orchestrator = Arc::new(build_orchestrator(&cfg)?);
    tokio::fs::create_dir_all(&cfg.asset_dir)
        .await
        .with_context(|| format!("cannot create asset dir {}", cfg.asset_dir.display()))?;

    let sweeper_stop = CancellationToken::new();
    let sweeper = spawn_sweeper(orchestrator.store(), retention_policy(&cfg), sweeper_stop.clone());

    let server = AppServer::new(addr, orchestrator.clone(), cfg.asset_dir.clone(), &cfg.asset_url_prefix);
    tracing::info!("lyric-canvas listening on http://{}", addr);
    let served = server
        .start(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutdown requested");
        })
        .await;

    sweeper_stop.cancel();
    let _ = sweeper.await;
    orchestrator.shutdown(ShutdownMode::Join).await;

    served.map_err(|err| anyhow::anyhow!("server error: {}", err))
}
