use async_trait::async_trait;

use crate::error::SynthesisError;
use crate::result::ImageRecord;

pub mod assets;
pub mod synthesizer;

pub use assets::{AssetStore, StoredAsset};
pub use synthesizer::{ImageSettings, OpenAIImageSynthesizer};

/// Generates an image for a prompt and keeps a local copy of it.
#[async_trait]
pub trait ImageSynthesizer: Send + Sync {
    async fn synthesize(&self, prompt: &str) -> Result<ImageRecord, SynthesisError>;
}
