use std::env;

use crate::models::CLIConfig;

const DEFAULT_URL: &str = "http://localhost:5000";

pub fn parse_config() -> CLIConfig {
    let mut cfg = CLIConfig {
        base_url: env_or("LYRIC_CANVAS_URL", DEFAULT_URL.to_string()),
        poll_interval_ms: env_u64("LYRIC_CANVAS_POLL_MS", 1000),
        poll_limit: env_u64("LYRIC_CANVAS_POLL_LIMIT", 300),
        debug: env_bool("LYRIC_CANVAS_DEBUG", false),
    };

    let args: Vec<String> = env::args().collect();
    let mut idx = 1;
    while idx < args.len() {
        match args[idx].as_str() {
            "--base" => {
                if let Some(value) = args.get(idx + 1) {
                    cfg.base_url = value.clone();
                    idx += 1;
                }
            }
            "--poll-ms" => {
                if let Some(value) = args.get(idx + 1) {
                    if let Ok(parsed) = value.parse::<u64>() {
                        cfg.poll_interval_ms = parsed;
                    }
                    idx += 1;
                }
            }
            "--debug" => {
                if let Some(value) = args.get(idx + 1) {
                    if value.starts_with('-') {
                        cfg.debug = true;
                    } else if let Ok(parsed) = value.parse::<bool>() {
                        cfg.debug = parsed;
                        idx += 1;
                    } else {
                        cfg.debug = true;
                    }
                } else {
                    cfg.debug = true;
                }
            }
            _ => {}
        }
        idx += 1;
    }

    cfg
}

fn env_or(key: &str, fallback: String) -> String {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => value,
        _ => fallback,
    }
}

fn env_bool(key: &str, fallback: bool) -> bool {
    match env::var(key) {
        Ok(value) => value.parse::<bool>().unwrap_or(fallback),
        Err(_) => fallback,
    }
}

fn env_u64(key: &str, fallback: u64) -> u64 {
    match env::var(key) {
        Ok(value) => value.parse::<u64>().unwrap_or(fallback),
        Err(_) => fallback,
    }
}
