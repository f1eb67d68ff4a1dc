use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use super::assets::AssetStore;
use super::ImageSynthesizer;
use crate::error::SynthesisError;
use crate::llm::{GeneratedImage, ImageRequest, ProviderAdapter};
use crate::result::ImageRecord;

#[derive(Clone, Debug)]
pub struct ImageSettings {
    pub size: String,
    pub quality: String,
    pub download_timeout: Duration,
}

/// Generates through the provider adapter, downloads the result and stores it.
/// Without an adapter every call fails with `NotConfigured`.
pub struct OpenAIImageSynthesizer {
    adapter: Option<Arc<dyn ProviderAdapter>>,
    assets: AssetStore,
    settings: ImageSettings,
    client: Client,
}

impl OpenAIImageSynthesizer {
    pub fn new(
        adapter: Option<Arc<dyn ProviderAdapter>>,
        assets: AssetStore,
        settings: ImageSettings,
    ) -> Result<Self, SynthesisError> {
        let client = Client::builder()
            .timeout(settings.download_timeout)
            .build()
            .map_err(|err| SynthesisError::Network(err.to_string()))?;
        Ok(Self {
            adapter,
            assets,
            settings,
            client,
        })
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, SynthesisError> {
        tracing::debug!(%url, "downloading generated image");
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(|err| SynthesisError::Download(err.to_string()))?;
        let bytes = resp
            .bytes()
            .await
            .map_err(|err| SynthesisError::Download(err.to_string()))?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl ImageSynthesizer for OpenAIImageSynthesizer {
    async fn synthesize(&self, prompt: &str) -> Result<ImageRecord, SynthesisError> {
        let adapter = self
            .adapter
            .as_ref()
            .ok_or_else(|| SynthesisError::NotConfigured("no OpenAI API key".to_string()))?;

        let request = ImageRequest {
            prompt: prompt.to_string(),
            model: None,
            size: Some(self.settings.size.clone()),
            quality: Some(self.settings.quality.clone()),
        };
        let response = adapter.generate_image(request).await.map_err(|err| {
            if err.is_network() {
                SynthesisError::Network(err.message)
            } else {
                SynthesisError::Remote(err.to_string())
            }
        })?;

        let (image_url, bytes) = match response.image {
            GeneratedImage::Url(url) => {
                let bytes = self.download(&url).await?;
                (url, bytes)
            }
            GeneratedImage::Bytes(bytes) => (String::new(), bytes),
        };

        let stored = self.assets.save(prompt, &bytes).await?;
        let image_url = if image_url.is_empty() {
            stored.public_url.clone()
        } else {
            image_url
        };
        Ok(ImageRecord {
            image_url,
            local_image: stored.public_url,
            local_path: stored.path,
            revised_prompt: response.revised_prompt,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{CompletionRequest, ImageResponse, LLMResponse, ProviderError};

    struct InlineImageAdapter;

    #[async_trait]
    impl ProviderAdapter for InlineImageAdapter {
        async fn complete(&self, _request: CompletionRequest) -> Result<LLMResponse, ProviderError> {
            Err(ProviderError::new("api_error", "not used"))
        }

        async fn generate_image(&self, request: ImageRequest) -> Result<ImageResponse, ProviderError> {
            assert_eq!(request.size.as_deref(), Some("1024x1024"));
            Ok(ImageResponse {
                image: GeneratedImage::Bytes(b"png-bytes".to_vec()),
                revised_prompt: Some(format!("revised: {}", request.prompt)),
            })
        }
    }

    fn settings() -> ImageSettings {
        ImageSettings {
            size: "1024x1024".to_string(),
            quality: "standard".to_string(),
            download_timeout: Duration::from_secs(5),
        }
    }

    #[tokio::test]
    async fn test_inline_image_is_persisted() {
        let tmp = tempfile::tempdir().unwrap();
        let synth = OpenAIImageSynthesizer::new(
            Some(Arc::new(InlineImageAdapter)),
            AssetStore::new(tmp.path(), "/static/images"),
            settings(),
        )
        .unwrap();

        let record = synth.synthesize("a red sky").await.unwrap();
        assert_eq!(std::fs::read(&record.local_path).unwrap(), b"png-bytes");
        assert!(record.local_image.starts_with("/static/images/image_"));
        assert_eq!(record.image_url, record.local_image);
        assert_eq!(record.revised_prompt.as_deref(), Some("revised: a red sky"));
    }

    #[tokio::test]
    async fn test_missing_adapter_is_not_configured() {
        let tmp = tempfile::tempdir().unwrap();
        let synth = OpenAIImageSynthesizer::new(None, AssetStore::new(tmp.path(), "/static/images"), settings())
            .unwrap();
        let err = synth.synthesize("a red sky").await.unwrap_err();
        assert!(matches!(err, SynthesisError::NotConfigured(_)));
    }
}
