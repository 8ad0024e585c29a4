//! Photo storage port.
//!
//! Uploads cross an explicit asynchronous boundary so a real network-backed
//! implementation (S3/GCS plus a thumbnailer) can be substituted without
//! touching callers. The placeholder implementation returns deterministic
//! placeholder-image URLs keyed by a generated identifier, preserving the
//! record shape callers depend on: id, original reference, thumbnail
//! reference, timestamp.

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::error::Result;
use crate::models::PhotoRecord;

/// Asynchronous boundary to photo storage
#[async_trait]
pub trait PhotoStore: Send + Sync {
    /// Store an image payload and return its reference pair
    async fn upload(&self, payload: &str) -> Result<PhotoRecord>;
}

/// Mock photo store returning placeholder-image URLs
#[derive(Debug, Default, Clone, Copy)]
pub struct PlaceholderPhotoStore;

#[async_trait]
impl PhotoStore for PlaceholderPhotoStore {
    async fn upload(&self, _payload: &str) -> Result<PhotoRecord> {
        let photo_id = Uuid::new_v4().to_string();
        Ok(PhotoRecord {
            original_url: format!("https://picsum.photos/seed/{photo_id}/1200/800"),
            thumbnail_url: format!("https://picsum.photos/seed/{photo_id}/300/200"),
            id: photo_id,
            created_at: Utc::now(),
        })
    }
}
