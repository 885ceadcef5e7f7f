//! Local development backend
//!
//! Implements [`RemoteStore`] over the SQLite repository and the blob
//! store, so the whole data layer runs without a managed service.

use super::RemoteStore;
use crate::database::{
    NewPhoto, NewWish, Photo, PhotoPatch, Repository, SiteSetting, StoredObject, Wish,
};
use crate::error::Result;
use crate::storage::BlobStore;
use async_trait::async_trait;

/// SQLite + blob store backend
#[derive(Clone)]
pub struct SqliteStore {
    repo: Repository,
    blobs: BlobStore,
    /// Prefix for object URLs, e.g. `http://localhost:3000/media`
    media_base_url: String,
}

impl SqliteStore {
    pub fn new(repo: Repository, blobs: BlobStore, media_base_url: &str) -> Self {
        Self {
            repo,
            blobs,
            media_base_url: media_base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn repository(&self) -> &Repository {
        &self.repo
    }
}

#[async_trait]
impl RemoteStore for SqliteStore {
    async fn list_photos(&self) -> Result<Vec<Photo>> {
        self.repo.list_photos().await
    }

    async fn insert_photo(&self, photo: &NewPhoto) -> Result<Photo> {
        self.repo.create_photo(photo).await
    }

    async fn update_photo(&self, id: &str, patch: &PhotoPatch) -> Result<Photo> {
        self.repo.update_photo(id, patch).await
    }

    async fn delete_photo(&self, id: &str) -> Result<Photo> {
        self.repo.delete_photo(id).await
    }

    async fn upload_object(
        &self,
        filename: &str,
        _content_type: &str,
        data: Vec<u8>,
    ) -> Result<StoredObject> {
        let hash = self.blobs.write(&data).await?;
        tracing::debug!("Stored upload {} as blob {}", filename, hash);

        Ok(StoredObject {
            url: format!("{}/{}", self.media_base_url, hash),
            path: hash,
        })
    }

    async fn remove_object(&self, path: &str) -> Result<()> {
        // Identical uploads share a blob; keep it while any photo still points at it
        let still_used = self
            .repo
            .list_photos()
            .await?
            .iter()
            .any(|p| p.storage_path.as_deref() == Some(path));

        if still_used {
            tracing::debug!("Blob {} still referenced, keeping it", path);
            return Ok(());
        }

        self.blobs.delete(path).await
    }

    async fn list_wishes(&self) -> Result<Vec<Wish>> {
        self.repo.list_wishes().await
    }

    async fn insert_wish(&self, wish: &NewWish) -> Result<Wish> {
        self.repo.create_wish(wish).await
    }

    async fn set_wish_read(&self, id: &str, is_read: bool) -> Result<Wish> {
        self.repo.set_wish_read(id, is_read).await
    }

    async fn delete_wish(&self, id: &str) -> Result<()> {
        self.repo.delete_wish(id).await
    }

    async fn list_settings(&self) -> Result<Vec<SiteSetting>> {
        self.repo.list_settings().await
    }

    async fn upsert_setting(&self, key: &str, value: &str) -> Result<SiteSetting> {
        self.repo.upsert_setting(key, value).await
    }
}
