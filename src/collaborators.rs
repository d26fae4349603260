//! Contracts for the services a crawl hands its results to
//!
//! The crawl pipeline only depends on these traits. Model clients, object
//! storage and the database live outside this crate.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::normalizer::CanonicalProduct;

/// Vision-capable language model: one image plus an instruction in, JSON text out
#[async_trait]
pub trait VisionModel: Send + Sync {
    async fn generate(&self, image_png: &[u8], instruction: &str) -> anyhow::Result<String>;
}

/// Renders a marketing banner for a product as PNG bytes
#[async_trait]
pub trait BannerGenerator: Send + Sync {
    async fn generate(&self, product: &CanonicalProduct) -> anyhow::Result<Vec<u8>>;
}

/// Blob storage returning a public URL for every stored object
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(&self, bytes: Vec<u8>, key: &str, content_type: &str) -> anyhow::Result<String>;
}

/// Persistence for canonical products. Each `save` commits or rolls back as a unit.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn save(&self, product: &CanonicalProduct) -> anyhow::Result<String>;
}

/// Object key for a banner uploaded now
#[must_use]
pub fn storage_key(name: &str, platform: &str) -> String {
    storage_key_at(name, platform, Utc::now())
}

/// `banners/YYYY/MM/DD/<platform>/<safe_name>_<hash8>.png`
///
/// `safe_name` keeps ASCII alphanumerics, `-` and `_` of the sanitized name,
/// lowercased. The hash covers name, platform and timestamp so repeated
/// uploads of one product never collide.
#[must_use]
pub fn storage_key_at(name: &str, platform: &str, at: DateTime<Utc>) -> String {
    let safe_name: String = sanitize_filename::sanitize(name)
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'))
        .collect::<String>()
        .to_lowercase();

    let hash = xxhash_rust::xxh3::xxh3_64(
        format!("{name}{platform}{}", at.to_rfc3339()).as_bytes(),
    );
    let unique_id = format!("{hash:016x}");

    let mut key = format!("banners/{}", at.format("%Y/%m/%d"));
    if !platform.is_empty() {
        key.push('/');
        key.push_str(platform);
    }
    key.push('/');
    key.push_str(&safe_name);
    key.push('_');
    key.push_str(&unique_id[..8]);
    key.push_str(".png");
    key
}
