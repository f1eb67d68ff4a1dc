use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use crate::analysis::{ContentAnalyzer, HeuristicAnalyzer, RemoteAnalyzer};
use crate::config::AppConfig;
use crate::error::ConfigError;
use crate::image::{AssetStore, ImageSettings, OpenAIImageSynthesizer};
use crate::llm::{OpenAIAdapter, OpenAIConfig, ProviderAdapter};
use crate::lyrics::{GeniusConfig, GeniusProvider};
use crate::orchestrator::{Orchestrator, Pipeline};
use crate::task::{InMemoryTaskStore, RetentionPolicy};

fn load_keys_from_env(primary: &str, prefix: &str) -> Vec<String> {
    let mut keys = Vec::new();
    if let Ok(raw) = env::var(primary) {
        for item in raw.split(',') {
            let trimmed = item.trim();
            if !trimmed.is_empty() {
                keys.push(trimmed.to_string());
            }
        }
    }
    for idx in 2..=10 {
        let key = format!("{}_{}", prefix, idx);
        if let Ok(value) = env::var(&key) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                keys.push(trimmed.to_string());
            }
        }
    }
    keys
}

pub fn load_openai_keys() -> Vec<String> {
    load_keys_from_env("OPENAI_API_KEY", "OPENAI_API_KEY")
}

fn env_opt(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => Some(value.trim().to_string()),
        _ => None,
    }
}

fn env_parse<T: FromStr>(key: &'static str, fallback: T) -> Result<T, ConfigError> {
    match env_opt(key) {
        Some(value) => value
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidValue { key, value }),
        None => Ok(fallback),
    }
}

pub fn config_from_env() -> Result<AppConfig, ConfigError> {
    let defaults = AppConfig::default();
    let genius_api_key = env_opt("GENIUS_API_KEY").ok_or(ConfigError::MissingKey("GENIUS_API_KEY"))?;
    Ok(AppConfig {
        host: env_opt("HOST").unwrap_or(defaults.host),
        port: env_parse("PORT", defaults.port)?,
        genius_api_key,
        genius_base_url: env_opt("GENIUS_BASE_URL").unwrap_or(defaults.genius_base_url),
        openai_api_keys: load_openai_keys(),
        openai_base_url: env_opt("OPENAI_BASE_URL").unwrap_or(defaults.openai_base_url),
        chat_model: env_opt("CHAT_MODEL").unwrap_or(defaults.chat_model),
        image_model: env_opt("IMAGE_MODEL").unwrap_or(defaults.image_model),
        image_size: env_opt("IMAGE_SIZE").unwrap_or(defaults.image_size),
        image_quality: env_opt("IMAGE_QUALITY").unwrap_or(defaults.image_quality),
        image_style: env_opt("DEFAULT_IMAGE_STYLE").unwrap_or(defaults.image_style),
        task_timeout_secs: env_parse("TASK_TIMEOUT", defaults.task_timeout_secs)?,
        asset_dir: env_opt("ASSET_DIR").map(PathBuf::from).unwrap_or(defaults.asset_dir),
        max_concurrent_tasks: env_parse("MAX_CONCURRENT_TASKS", defaults.max_concurrent_tasks)?,
        retention_secs: env_parse("TASK_RETENTION_SECS", defaults.retention_secs)?,
        ..defaults
    })
}

pub fn build_openai_adapter(cfg: &AppConfig) -> Result<Option<Arc<dyn ProviderAdapter>>, ConfigError> {
    if !cfg.has_openai() {
        return Ok(None);
    }
    let adapter = OpenAIAdapter::new(OpenAIConfig {
        api_keys: cfg.openai_api_keys.clone(),
        base_url: cfg.openai_base_url.clone(),
        chat_model: cfg.chat_model.clone(),
        image_model: cfg.image_model.clone(),
        chat_timeout: Duration::from_secs(cfg.openai_timeout_secs),
        image_timeout: Duration::from_secs(cfg.image_timeout_secs),
    })
    .map_err(|err| ConfigError::Client(err.to_string()))?;
    Ok(Some(Arc::new(adapter)))
}

/// Wires the Genius and OpenAI backed stages into an orchestrator.
///
/// Without an OpenAI key the heuristic analyzer is used and image generation
/// fails per task instead of at startup.
pub fn build_orchestrator(cfg: &AppConfig) -> Result<Orchestrator, ConfigError> {
    if cfg.genius_api_key.is_empty() {
        return Err(ConfigError::MissingKey("GENIUS_API_KEY"));
    }
    let lyrics = GeniusProvider::new(GeniusConfig {
        api_key: cfg.genius_api_key.clone(),
        base_url: cfg.genius_base_url.clone(),
        timeout: cfg.genius_timeout(),
    })
    .map_err(|err| ConfigError::Client(err.to_string()))?;

    let adapter = build_openai_adapter(cfg)?;
    let style_suffix = cfg.style_suffix();
    let analyzer: Arc<dyn ContentAnalyzer> = match &adapter {
        Some(adapter) => Arc::new(RemoteAnalyzer::new(adapter.clone(), cfg.analysis_char_limit, &style_suffix)),
        None => {
            tracing::warn!("OPENAI_API_KEY not set: using heuristic analysis, image generation disabled");
            Arc::new(HeuristicAnalyzer::new(&style_suffix))
        }
    };

    let synthesizer = OpenAIImageSynthesizer::new(
        adapter,
        AssetStore::new(cfg.asset_dir.clone(), &cfg.asset_url_prefix),
        ImageSettings {
            size: cfg.image_size.clone(),
            quality: cfg.image_quality.clone(),
            download_timeout: Duration::from_secs(cfg.image_timeout_secs),
        },
    )
    .map_err(|err| ConfigError::Client(err.to_string()))?;

    let pipeline = Pipeline {
        store: Arc::new(InMemoryTaskStore::new()),
        lyrics: Arc::new(lyrics),
        analyzer,
        synthesizer: Arc::new(synthesizer),
    };
    Ok(Orchestrator::new(pipeline, cfg.max_concurrent_tasks, cfg.preview_chars))
}

pub fn retention_policy(cfg: &AppConfig) -> RetentionPolicy {
    RetentionPolicy {
        keep_finished: cfg.retention(),
        stale_after: cfg.task_timeout(),
        sweep_every: cfg.sweep_interval(),
    }
}
