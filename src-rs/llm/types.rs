use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn system(content: &str) -> Self {
        Self {
            role: "system".to_string(),
            content: content.to_string(),
        }
    }

    pub fn user(content: &str) -> Self {
        Self {
            role: "user".to_string(),
            content: content.to_string(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LLMResponse {
    pub content: String,
    pub raw: Option<Value>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub messages: Vec<Message>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
    pub model: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ImageRequest {
    pub prompt: String,
    pub model: Option<String>,
    pub size: Option<String>,
    pub quality: Option<String>,
}

/// The generator hands back either a URL to fetch or the bytes inline.
#[derive(Clone, Debug)]
pub enum GeneratedImage {
    Url(String),
    Bytes(Vec<u8>),
}

#[derive(Clone, Debug)]
pub struct ImageResponse {
    pub image: GeneratedImage,
    pub revised_prompt: Option<String>,
}

#[derive(Clone, Debug)]
pub struct ProviderError {
    pub code: String,
    pub message: String,
}

impl ProviderError {
    pub fn new(code: &str, message: &str) -> Self {
        Self {
            code: code.to_string(),
            message: message.to_string(),
        }
    }

    /// Transport failures, as opposed to an error reply from the provider.
    pub fn is_network(&self) -> bool {
        self.code == "network_error"
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ProviderError {}

#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<LLMResponse, ProviderError>;

    async fn generate_image(&self, request: ImageRequest) -> Result<ImageResponse, ProviderError>;
}
