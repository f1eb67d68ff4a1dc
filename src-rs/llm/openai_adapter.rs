use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde_json::{json, Value};

use super::rotation::Rotator;
use super::types::{
    CompletionRequest, GeneratedImage, ImageRequest, ImageResponse, LLMResponse, Message, ProviderAdapter,
    ProviderError,
};

pub struct OpenAIConfig {
    pub api_keys: Vec<String>,
    pub base_url: String,
    pub chat_model: String,
    pub image_model: String,
    pub chat_timeout: Duration,
    pub image_timeout: Duration,
}

pub struct OpenAIAdapter {
    cfg: OpenAIConfig,
    rotator: Rotator,
    client: Client,
}

impl OpenAIAdapter {
    pub fn new(mut cfg: OpenAIConfig) -> Result<Self, ProviderError> {
        if cfg.base_url.is_empty() {
            cfg.base_url = "https://api.openai.com".to_string();
        }
        if cfg.chat_model.is_empty() {
            cfg.chat_model = "gpt-4".to_string();
        }
        if cfg.image_model.is_empty() {
            cfg.image_model = "dall-e-3".to_string();
        }
        // Per-request timeouts below; the client only bounds connecting.
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|err| ProviderError::new("client_error", &err.to_string()))?;
        Ok(Self {
            rotator: Rotator::new(cfg.api_keys.clone()),
            cfg,
            client,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/v1/{}", self.cfg.base_url.trim_end_matches('/'), path)
    }

    async fn post(&self, path: &str, payload: &Value, timeout: Duration) -> Result<Value, ProviderError> {
        let key = self
            .rotator
            .next()
            .ok_or_else(|| ProviderError::new("auth_error", "no OpenAI API keys"))?;
        let endpoint = self.endpoint(path);
        tracing::debug!(%endpoint, "openai request");
        let resp = self
            .client
            .post(endpoint)
            .bearer_auth(key)
            .timeout(timeout)
            .json(payload)
            .send()
            .await
            .map_err(|err| ProviderError::new("network_error", &err.to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|err| ProviderError::new("network_error", &err.to_string()))?;
        if status.is_client_error() || status.is_server_error() {
            return Err(classify_failure(status.as_u16(), &body));
        }
        serde_json::from_str(&body).map_err(|_| ProviderError::new("parse_error", "invalid json"))
    }
}

#[async_trait]
impl ProviderAdapter for OpenAIAdapter {
    async fn complete(&self, request: CompletionRequest) -> Result<LLMResponse, ProviderError> {
        let model = request.model.clone().unwrap_or_else(|| self.cfg.chat_model.clone());
        let payload = build_chat_payload(&model, &request.messages, request.temperature, request.max_tokens);
        let raw = self.post("chat/completions", &payload, self.cfg.chat_timeout).await?;
        let content = parse_chat_response(&raw);
        Ok(LLMResponse {
            content,
            raw: Some(raw),
        })
    }

    async fn generate_image(&self, request: ImageRequest) -> Result<ImageResponse, ProviderError> {
        let model = request.model.clone().unwrap_or_else(|| self.cfg.image_model.clone());
        let payload = build_image_payload(&model, &request);
        let raw = self.post("images/generations", &payload, self.cfg.image_timeout).await?;
        parse_image_response(&raw)
    }
}

fn classify_failure(status: u16, body: &str) -> ProviderError {
    let message = error_message(body);
    let lowered = message.to_lowercase();
    if status == 401 || status == 403 {
        return ProviderError::new("auth_error", &message);
    }
    if status == 429 || lowered.contains("quota") || lowered.contains("rate limit") {
        return ProviderError::new("rate_limit", &message);
    }
    if status >= 500 {
        return ProviderError::new("server_error", &message);
    }
    ProviderError::new("api_error", &message)
}

/// OpenAI wraps failures as `{"error": {"message": ...}}`; fall back to the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| {
            value
                .pointer("/error/message")
                .and_then(|v| v.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.to_string())
}

fn build_chat_payload(model: &str, messages: &[Message], temperature: Option<f64>, max_tokens: Option<u32>) -> Value {
    let mut payload = json!({
        "model": model,
        "messages": messages,
    });
    if let Some(temperature) = temperature {
        payload["temperature"] = json!(temperature);
    }
    if let Some(max_tokens) = max_tokens {
        payload["max_tokens"] = json!(max_tokens);
    }
    payload
}

fn parse_chat_response(raw: &Value) -> String {
    raw.pointer("/choices/0/message/content")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .trim()
        .to_string()
}

fn build_image_payload(model: &str, request: &ImageRequest) -> Value {
    let mut payload = json!({
        "model": model,
        "prompt": request.prompt,
        "n": 1,
    });
    if let Some(size) = &request.size {
        payload["size"] = json!(size);
    }
    if let Some(quality) = &request.quality {
        payload["quality"] = json!(quality);
    }
    payload
}

fn parse_image_response(raw: &Value) -> Result<ImageResponse, ProviderError> {
    let first = raw
        .pointer("/data/0")
        .ok_or_else(|| ProviderError::new("parse_error", "no image in response"))?;
    let revised_prompt = first
        .get("revised_prompt")
        .and_then(|v| v.as_str())
        .map(str::to_string);

    if let Some(url) = first.get("url").and_then(|v| v.as_str()) {
        return Ok(ImageResponse {
            image: GeneratedImage::Url(url.to_string()),
            revised_prompt,
        });
    }
    if let Some(encoded) = first.get("b64_json").and_then(|v| v.as_str()) {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map_err(|err| ProviderError::new("parse_error", &err.to_string()))?;
        return Ok(ImageResponse {
            image: GeneratedImage::Bytes(bytes),
            revised_prompt,
        });
    }
    Err(ProviderError::new("parse_error", "image entry has neither url nor b64_json"))
}
