pub mod openai_adapter;
pub mod rotation;
pub mod types;

pub use openai_adapter::{OpenAIAdapter, OpenAIConfig};
pub use rotation::Rotator;
pub use types::{
    CompletionRequest, GeneratedImage, ImageRequest, ImageResponse, LLMResponse, Message, ProviderAdapter,
    ProviderError,
};
