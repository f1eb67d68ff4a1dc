use std::path::PathBuf;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub genius_api_key: String,
    pub genius_base_url: String,
    pub openai_api_keys: Vec<String>,
    pub openai_base_url: String,
    pub chat_model: String,
    pub image_model: String,
    pub image_size: String,
    pub image_quality: String,
    pub image_style: String,
    pub analysis_char_limit: usize,
    pub genius_timeout_secs: u64,
    pub openai_timeout_secs: u64,
    pub image_timeout_secs: u64,
    pub task_timeout_secs: u64,
    pub asset_dir: PathBuf,
    pub asset_url_prefix: String,
    pub max_concurrent_tasks: usize,
    pub retention_secs: u64,
    pub sweep_interval_secs: u64,
    pub preview_chars: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            genius_api_key: String::new(),
            genius_base_url: "https://api.genius.com".to_string(),
            openai_api_keys: Vec::new(),
            openai_base_url: "https://api.openai.com".to_string(),
            chat_model: "gpt-4".to_string(),
            image_model: "dall-e-3".to_string(),
            image_size: "1024x1024".to_string(),
            image_quality: "standard".to_string(),
            image_style: "digital art".to_string(),
            analysis_char_limit: 3000,
            genius_timeout_secs: 10,
            openai_timeout_secs: 30,
            image_timeout_secs: 120,
            task_timeout_secs: 300,
            asset_dir: PathBuf::from("static/images"),
            asset_url_prefix: "/static/images".to_string(),
            max_concurrent_tasks: 8,
            retention_secs: 3600,
            sweep_interval_secs: 60,
            preview_chars: 200,
        }
    }
}

impl AppConfig {
    pub fn has_openai(&self) -> bool {
        !self.openai_api_keys.is_empty()
    }

    pub fn genius_timeout(&self) -> Duration {
        Duration::from_secs(self.genius_timeout_secs)
    }

    pub fn task_timeout(&self) -> Duration {
        Duration::from_secs(self.task_timeout_secs)
    }

    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.retention_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }

    /// Suffix appended to every analysis before it reaches the image model.
    pub fn style_suffix(&self) -> String {
        format!(
            "Style: {}, highly detailed, high quality, 8k",
            self.image_style
        )
    }
}
