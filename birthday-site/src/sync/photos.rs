//! Photo gallery resource
//!
//! The public gallery never renders empty: an unconfigured backend, an
//! empty table or a failed load all show the bundled gallery. The admin
//! view uses [`SyncPolicy::strict`] and shows the error instead.

use super::fallback::fallback_photos;
use super::resource::{LoadOutcome, ReadFallback, Resource, ResourceState, SyncPolicy};
use crate::config::UNTITLED_CAPTION;
use crate::database::{Photo, PhotoPatch};
use crate::error::{AppError, Result};
use crate::remote::RemoteDataClient;
use tokio::sync::watch;

pub struct PhotoResource {
    client: RemoteDataClient,
    resource: Resource<Vec<Photo>>,
    policy: SyncPolicy,
}

impl PhotoResource {
    /// Public gallery: degrade to the bundled photos
    pub fn gallery(client: RemoteDataClient) -> Self {
        Self::with_policy(client, SyncPolicy::degraded_reads())
    }

    /// Admin list: show exactly what the backend has
    pub fn admin(client: RemoteDataClient) -> Self {
        Self::with_policy(client, SyncPolicy::strict())
    }

    pub fn with_policy(client: RemoteDataClient, policy: SyncPolicy) -> Self {
        Self {
            client,
            resource: Resource::new("photos", Vec::new()),
            policy,
        }
    }

    pub fn state(&self) -> ResourceState<Vec<Photo>> {
        self.resource.snapshot()
    }

    pub fn photos(&self) -> Vec<Photo> {
        self.resource.data()
    }

    pub fn subscribe(&self) -> watch::Receiver<ResourceState<Vec<Photo>>> {
        self.resource.subscribe()
    }

    fn degrades(&self) -> bool {
        self.policy.on_read_failure == ReadFallback::Degraded
    }

    pub async fn load(&self) -> LoadOutcome {
        let ticket = self.resource.begin_load();

        if !self.client.is_configured() {
            let photos = if self.degrades() {
                fallback_photos()
            } else {
                Vec::new()
            };
            return self.resource.commit(ticket, photos, None);
        }

        match self.client.fetch_photos().await {
            Ok(photos) if photos.is_empty() && self.degrades() => {
                tracing::info!("No photos in backend, showing bundled gallery");
                self.resource.commit(ticket, fallback_photos(), None)
            }
            Ok(photos) => {
                tracing::debug!("Loaded {} photos", photos.len());
                self.resource.commit(ticket, photos, None)
            }
            Err(e) => {
                tracing::warn!("Failed to load photos: {}", e);
                let photos = if self.degrades() {
                    fallback_photos()
                } else {
                    Vec::new()
                };
                self.resource
                    .commit(ticket, photos, Some(format!("Failed to load photos: {}", e)))
            }
        }
    }

    pub async fn refetch(&self) -> LoadOutcome {
        self.load().await
    }

    /// Discard any in-flight load
    pub fn cancel(&self) {
        self.resource.cancel();
    }

    /// Upload a file and append it to the gallery.
    /// `Ok(None)` means no backend is configured.
    pub async fn upload(
        &self,
        filename: &str,
        content_type: &str,
        data: Vec<u8>,
        caption: &str,
    ) -> Result<Option<Photo>> {
        if data.is_empty() {
            return Err(AppError::validation("Uploaded file is empty"));
        }
        if !content_type.starts_with("image/") {
            return Err(AppError::validation(format!(
                "Unsupported file type {:?}, expected an image",
                content_type
            )));
        }

        let order_index = self.next_order_index();
        let result = self
            .client
            .upload_photo(filename, content_type, data, &caption_or_untitled(caption), order_index)
            .await;

        let photo = self.surface(result)?;
        if let Some(photo) = &photo {
            let photo = photo.clone();
            // Bundled placeholders go away once a real photo exists
            self.resource.update(|photos| {
                photos.retain(|p| p.storage_path.is_some() || !p.id.starts_with("fallback-"));
                photos.push(photo);
                sort_photos(photos);
            });
        }
        Ok(photo)
    }

    /// Change a caption; an empty caption becomes "Untitled"
    pub async fn update_caption(&self, id: &str, caption: &str) -> Result<Option<Photo>> {
        let patch = PhotoPatch {
            caption: Some(caption_or_untitled(caption)),
            order_index: None,
        };
        self.apply_patch(id, &patch).await
    }

    pub async fn set_order(&self, id: &str, order_index: i64) -> Result<Option<Photo>> {
        let patch = PhotoPatch {
            caption: None,
            order_index: Some(order_index),
        };
        self.apply_patch(id, &patch).await
    }

    pub async fn remove(&self, id: &str) -> Result<Option<Photo>> {
        let result = self.client.delete_photo(id).await;
        let deleted = self.surface(result)?;
        if deleted.is_some() {
            self.resource.update(|photos| photos.retain(|p| p.id != id));
        }
        Ok(deleted)
    }

    async fn apply_patch(&self, id: &str, patch: &PhotoPatch) -> Result<Option<Photo>> {
        let result = self.client.update_photo(id, patch).await;
        let updated = self.surface(result)?;
        if let Some(photo) = &updated {
            let photo = photo.clone();
            self.resource.update(|photos| {
                if let Some(existing) = photos.iter_mut().find(|p| p.id == photo.id) {
                    *existing = photo;
                }
                sort_photos(photos);
            });
        }
        Ok(updated)
    }

    /// A photo that never reached the backend has no URL to show, so
    /// write failures surface whatever the policy says
    fn surface<T>(&self, result: Result<T>) -> Result<T> {
        result.map_err(|e| {
            self.resource.set_error(format!("Photo update failed: {}", e));
            e
        })
    }

    fn next_order_index(&self) -> i64 {
        self.resource
            .data()
            .iter()
            .filter(|p| !p.id.starts_with("fallback-"))
            .map(|p| p.order_index + 1)
            .max()
            .unwrap_or(0)
    }
}

fn caption_or_untitled(caption: &str) -> String {
    let trimmed = caption.trim();
    if trimmed.is_empty() {
        UNTITLED_CAPTION.to_string()
    } else {
        trimmed.to_string()
    }
}

fn sort_photos(photos: &mut [Photo]) {
    photos.sort_by(|a, b| {
        a.order_index
            .cmp(&b.order_index)
            .then(a.created_at.cmp(&b.created_at))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::testing::{photo, MockStore};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_unconfigured_gallery_is_exact_fallback() {
        let gallery = PhotoResource::gallery(RemoteDataClient::unconfigured());

        assert_eq!(gallery.load().await, LoadOutcome::Committed);

        let state = gallery.state();
        assert_eq!(state.data, fallback_photos());
        assert_eq!(state.data.len(), 18);
        assert!(state.error.is_none());
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn test_empty_backend_uses_fallback() {
        let store = Arc::new(MockStore::default());
        let gallery = PhotoResource::gallery(RemoteDataClient::new(store));

        gallery.load().await;

        assert_eq!(gallery.photos().len(), 18);
    }

    #[tokio::test]
    async fn test_failure_degrades_gallery_but_not_admin() {
        let store = Arc::new(MockStore::default());
        store.fail_reads("connection refused");

        let gallery = PhotoResource::gallery(RemoteDataClient::new(store.clone()));
        gallery.load().await;
        let state = gallery.state();
        assert_eq!(state.data.len(), 18);
        assert_eq!(
            state.error.as_deref(),
            Some("Failed to load photos: connection refused")
        );

        let admin = PhotoResource::admin(RemoteDataClient::new(store));
        admin.load().await;
        let state = admin.state();
        assert!(state.data.is_empty());
        assert!(state.error.is_some());
    }

    #[tokio::test]
    async fn test_refetch_while_pending_keeps_only_latest() {
        let store = Arc::new(MockStore::default());
        let first_gate = store.gate_next_listing();
        let second_gate = store.gate_next_listing();
        let gallery = Arc::new(PhotoResource::gallery(RemoteDataClient::new(store)));

        let first = tokio::spawn({
            let gallery = gallery.clone();
            async move { gallery.load().await }
        });
        tokio::task::yield_now().await;
        let second = tokio::spawn({
            let gallery = gallery.clone();
            async move { gallery.refetch().await }
        });
        tokio::task::yield_now().await;

        // Second call resolves first, then the stale first call resolves
        second_gate.send(vec![photo("new", "Second", 0)]).unwrap();
        assert_eq!(second.await.unwrap(), LoadOutcome::Committed);
        first_gate.send(vec![photo("old", "First", 0)]).unwrap();
        assert_eq!(first.await.unwrap(), LoadOutcome::Superseded);

        let photos = gallery.photos();
        assert_eq!(photos.len(), 1);
        assert_eq!(photos[0].id, "new");
    }

    #[tokio::test]
    async fn test_cleared_caption_becomes_untitled() {
        let store = Arc::new(MockStore::with_photos(vec![photo("p1", "Cake", 0)]));
        let admin = PhotoResource::admin(RemoteDataClient::new(store));
        admin.load().await;

        let updated = admin.update_caption("p1", "   ").await.unwrap().unwrap();

        assert_eq!(updated.caption, "Untitled");
        assert_eq!(admin.photos()[0].caption, "Untitled");
    }

    #[tokio::test]
    async fn test_upload_replaces_placeholders_and_appends() {
        let store = Arc::new(MockStore::default());
        let gallery = PhotoResource::gallery(RemoteDataClient::new(store));
        gallery.load().await;
        assert_eq!(gallery.photos().len(), 18);

        let uploaded = gallery
            .upload("party.jpg", "image/jpeg", vec![0xff, 0xd8], "")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(uploaded.caption, "Untitled");
        assert_eq!(uploaded.order_index, 0);
        assert_eq!(gallery.photos(), vec![uploaded]);
    }

    #[tokio::test]
    async fn test_upload_rejects_non_images_before_remote_call() {
        let store = Arc::new(MockStore::default());
        let admin = PhotoResource::admin(RemoteDataClient::new(store.clone()));

        let result = admin
            .upload("notes.txt", "text/plain", b"hello".to_vec(), "Notes")
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_failed_write_surfaces_and_keeps_state() {
        let store = Arc::new(MockStore::with_photos(vec![photo("p1", "Cake", 0)]));
        let admin = PhotoResource::admin(RemoteDataClient::new(store.clone()));
        admin.load().await;
        store.fail_writes("row-level security violation");

        let result = admin.set_order("p1", 5).await;

        assert!(result.is_err());
        let state = admin.state();
        assert_eq!(state.data[0].order_index, 0);
        assert_eq!(
            state.error.as_deref(),
            Some("Photo update failed: row-level security violation")
        );
    }

    #[tokio::test]
    async fn test_remove() {
        let store = Arc::new(MockStore::with_photos(vec![
            photo("p1", "Cake", 0),
            photo("p2", "Balloons", 1),
        ]));
        let admin = PhotoResource::admin(RemoteDataClient::new(store));
        admin.load().await;

        admin.remove("p1").await.unwrap();

        let ids: Vec<String> = admin.photos().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec!["p2"]);
    }
}
