use std::path::PathBuf;

use chrono::Utc;

/// A file written by the asset store, with the URL it is served under.
#[derive(Clone, Debug)]
pub struct StoredAsset {
    pub path: PathBuf,
    pub public_url: String,
}

/// Local directory holding generated images.
#[derive(Clone, Debug)]
pub struct AssetStore {
    dir: PathBuf,
    url_prefix: String,
}

impl AssetStore {
    pub fn new(dir: impl Into<PathBuf>, url_prefix: &str) -> Self {
        Self {
            dir: dir.into(),
            url_prefix: url_prefix.trim_end_matches('/').to_string(),
        }
    }

    pub async fn ensure_dir(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await
    }

    /// Writes `bytes` under a fresh name derived from `seed` and the current time.
    pub async fn save(&self, seed: &str, bytes: &[u8]) -> std::io::Result<StoredAsset> {
        self.ensure_dir().await?;
        let filename = generate_filename(seed, "png");
        let path = self.dir.join(&filename);
        tokio::fs::write(&path, bytes).await?;
        Ok(StoredAsset {
            path,
            public_url: format!("{}/{}", self.url_prefix, filename),
        })
    }
}

/// `image_<timestamp>_<12 hex>.<ext>`; the hash covers the seed and the
/// nanosecond clock so two saves in the same second do not collide.
pub fn generate_filename(seed: &str, extension: &str) -> String {
    let now = Utc::now();
    let nanos = now.timestamp_nanos_opt().unwrap_or_default();
    let digest = md5::compute(format!("{}_{}_{}", seed, nanos, uuid::Uuid::new_v4()));
    let hash = format!("{:x}", digest);
    format!(
        "image_{}_{}.{}",
        now.format("%Y%m%d_%H%M%S"),
        &hash[..12],
        extension
    )
}
