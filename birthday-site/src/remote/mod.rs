//! Remote data client
//!
//! Boundary between the resource hooks and whatever backend holds
//! photos, wishes and site settings. Backends implement [`RemoteStore`];
//! [`RemoteDataClient`] adds the unconfigured short-circuit and the
//! upload-then-insert composition on top.

pub mod local;
pub mod preferences;
pub mod rest;

pub use local::SqliteStore;
pub use preferences::{PreferencesClient, PreferencesRemote};
pub use rest::RestStore;

use crate::database::{NewPhoto, NewWish, Photo, PhotoPatch, SiteSetting, StoredObject, Wish};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Operations a managed backend must provide.
///
/// Every write returns the persisted record with server-assigned fields.
/// Errors carry the backend's message verbatim.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn list_photos(&self) -> Result<Vec<Photo>>;
    async fn insert_photo(&self, photo: &NewPhoto) -> Result<Photo>;
    async fn update_photo(&self, id: &str, patch: &PhotoPatch) -> Result<Photo>;
    /// Delete a photo row and return it
    async fn delete_photo(&self, id: &str) -> Result<Photo>;

    /// Store a binary object, returning its locator and public URL
    async fn upload_object(
        &self,
        filename: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> Result<StoredObject>;
    async fn remove_object(&self, path: &str) -> Result<()>;

    async fn list_wishes(&self) -> Result<Vec<Wish>>;
    async fn insert_wish(&self, wish: &NewWish) -> Result<Wish>;
    async fn set_wish_read(&self, id: &str, is_read: bool) -> Result<Wish>;
    async fn delete_wish(&self, id: &str) -> Result<()>;

    async fn list_settings(&self) -> Result<Vec<SiteSetting>>;
    async fn upsert_setting(&self, key: &str, value: &str) -> Result<SiteSetting>;
}

/// Client used by the resource hooks.
///
/// Without a backend every read is empty and every write is a no-op
/// (`Ok(None)` / `Ok(false)`); no network call is attempted.
#[derive(Clone, Default)]
pub struct RemoteDataClient {
    store: Option<Arc<dyn RemoteStore>>,
}

impl RemoteDataClient {
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Self { store: Some(store) }
    }

    pub fn unconfigured() -> Self {
        Self { store: None }
    }

    pub fn is_configured(&self) -> bool {
        self.store.is_some()
    }

    fn store(&self, operation: &str) -> Option<&Arc<dyn RemoteStore>> {
        if self.store.is_none() {
            tracing::debug!("Backend not configured, skipping {}", operation);
        }
        self.store.as_ref()
    }

    // ===== Photos =====

    pub async fn fetch_photos(&self) -> Result<Vec<Photo>> {
        match self.store("fetch photos") {
            Some(store) => store.list_photos().await,
            None => Ok(Vec::new()),
        }
    }

    pub async fn add_photo(&self, photo: &NewPhoto) -> Result<Option<Photo>> {
        match self.store("add photo") {
            Some(store) => store.insert_photo(photo).await.map(Some),
            None => Ok(None),
        }
    }

    pub async fn update_photo(&self, id: &str, patch: &PhotoPatch) -> Result<Option<Photo>> {
        match self.store("update photo") {
            Some(store) => store.update_photo(id, patch).await.map(Some),
            None => Ok(None),
        }
    }

    /// Upload the file, then insert a record pointing at it.
    ///
    /// If the insert fails the uploaded object is removed again so no
    /// orphan is left behind.
    pub async fn upload_photo(
        &self,
        filename: &str,
        content_type: &str,
        data: Vec<u8>,
        caption: &str,
        order_index: i64,
    ) -> Result<Option<Photo>> {
        let Some(store) = self.store("upload photo") else {
            return Ok(None);
        };

        tracing::info!(
            "Uploading photo: {} ({} bytes, {})",
            filename,
            data.len(),
            content_type
        );

        let object = store.upload_object(filename, content_type, data).await?;

        let record = NewPhoto {
            url: object.url.clone(),
            caption: caption.to_string(),
            order_index,
            storage_path: Some(object.path.clone()),
        };

        match store.insert_photo(&record).await {
            Ok(photo) => {
                tracing::info!("Photo uploaded: {}", photo.id);
                Ok(Some(photo))
            }
            Err(e) => {
                if let Err(cleanup) = store.remove_object(&object.path).await {
                    tracing::warn!("Failed to remove orphaned object {}: {}", object.path, cleanup);
                }
                Err(e)
            }
        }
    }

    /// Delete a photo record and its stored object, if any
    pub async fn delete_photo(&self, id: &str) -> Result<Option<Photo>> {
        let Some(store) = self.store("delete photo") else {
            return Ok(None);
        };

        let photo = store.delete_photo(id).await?;

        if let Some(path) = &photo.storage_path {
            // The record is gone either way; a leftover object is only wasted space
            if let Err(e) = store.remove_object(path).await {
                tracing::warn!("Failed to remove stored object {}: {}", path, e);
            }
        }

        Ok(Some(photo))
    }

    // ===== Wishes =====

    pub async fn fetch_wishes(&self) -> Result<Vec<Wish>> {
        match self.store("fetch wishes") {
            Some(store) => store.list_wishes().await,
            None => Ok(Vec::new()),
        }
    }

    pub async fn add_wish(&self, wish: &NewWish) -> Result<Option<Wish>> {
        match self.store("add wish") {
            Some(store) => store.insert_wish(wish).await.map(Some),
            None => Ok(None),
        }
    }

    pub async fn set_wish_read(&self, id: &str, is_read: bool) -> Result<Option<Wish>> {
        match self.store("mark wish") {
            Some(store) => store.set_wish_read(id, is_read).await.map(Some),
            None => Ok(None),
        }
    }

    /// Returns `false` when the backend is not configured
    pub async fn delete_wish(&self, id: &str) -> Result<bool> {
        match self.store("delete wish") {
            Some(store) => store.delete_wish(id).await.map(|_| true),
            None => Ok(false),
        }
    }

    // ===== Site settings =====

    pub async fn fetch_settings(&self) -> Result<Vec<SiteSetting>> {
        match self.store("fetch settings") {
            Some(store) => store.list_settings().await,
            None => Ok(Vec::new()),
        }
    }

    pub async fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let settings = self.fetch_settings().await?;
        Ok(settings.into_iter().find(|s| s.key == key).map(|s| s.value))
    }

    pub async fn save_setting(&self, key: &str, value: &str) -> Result<Option<SiteSetting>> {
        match self.store("save setting") {
            Some(store) => store.upsert_setting(key, value).await.map(Some),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory [`RemoteStore`] with failure switches, call counters
    //! and an optional gate that holds photo listings until released.

    use super::*;
    use crate::error::AppError;
    use chrono::Utc;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tokio::sync::oneshot;

    #[derive(Default)]
    pub struct MockStore {
        pub photos: Mutex<Vec<Photo>>,
        pub wishes: Mutex<Vec<Wish>>,
        pub settings: Mutex<Vec<SiteSetting>>,
        pub removed_objects: Mutex<Vec<String>>,
        /// Reads fail with this message while set
        pub fail_reads: Mutex<Option<String>>,
        /// Writes fail with this message while set
        pub fail_writes: Mutex<Option<String>>,
        /// Each queued receiver delays one `list_photos` call until fired;
        /// the paired value replaces the listing result.
        pub photo_gates: Mutex<VecDeque<oneshot::Receiver<Vec<Photo>>>>,
        pub reads: AtomicUsize,
        pub writes: AtomicUsize,
    }

    impl MockStore {
        pub fn with_photos(photos: Vec<Photo>) -> Self {
            let store = Self::default();
            *store.photos.lock().unwrap() = photos;
            store
        }

        pub fn fail_reads(&self, message: &str) {
            *self.fail_reads.lock().unwrap() = Some(message.to_string());
        }

        pub fn fail_writes(&self, message: &str) {
            *self.fail_writes.lock().unwrap() = Some(message.to_string());
        }

        /// Hold the next `list_photos` call until the returned sender fires
        pub fn gate_next_listing(&self) -> oneshot::Sender<Vec<Photo>> {
            let (tx, rx) = oneshot::channel();
            self.photo_gates.lock().unwrap().push_back(rx);
            tx
        }

        pub fn read_count(&self) -> usize {
            self.reads.load(Ordering::SeqCst)
        }

        pub fn write_count(&self) -> usize {
            self.writes.load(Ordering::SeqCst)
        }

        fn read(&self) -> Result<()> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            match self.fail_reads.lock().unwrap().clone() {
                Some(message) => Err(AppError::Remote(message)),
                None => Ok(()),
            }
        }

        fn write(&self) -> Result<()> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            match self.fail_writes.lock().unwrap().clone() {
                Some(message) => Err(AppError::Remote(message)),
                None => Ok(()),
            }
        }
    }

    pub fn photo(id: &str, caption: &str, order_index: i64) -> Photo {
        Photo {
            id: id.to_string(),
            url: format!("https://cdn.example.com/{}.jpg", id),
            caption: caption.to_string(),
            order_index,
            storage_path: None,
            created_at: Utc::now(),
        }
    }

    #[async_trait]
    impl RemoteStore for MockStore {
        async fn list_photos(&self) -> Result<Vec<Photo>> {
            let gate = self.photo_gates.lock().unwrap().pop_front();
            if let Some(gate) = gate {
                let released = gate
                    .await
                    .map_err(|_| AppError::Remote("gate dropped".to_string()))?;
                self.reads.fetch_add(1, Ordering::SeqCst);
                return Ok(released);
            }
            self.read()?;
            Ok(self.photos.lock().unwrap().clone())
        }

        async fn insert_photo(&self, photo: &NewPhoto) -> Result<Photo> {
            self.write()?;
            let mut photos = self.photos.lock().unwrap();
            let record = Photo {
                id: format!("photo-{}", photos.len() + 1),
                url: photo.url.clone(),
                caption: photo.caption.clone(),
                order_index: photo.order_index,
                storage_path: photo.storage_path.clone(),
                created_at: Utc::now(),
            };
            photos.push(record.clone());
            Ok(record)
        }

        async fn update_photo(&self, id: &str, patch: &PhotoPatch) -> Result<Photo> {
            self.write()?;
            let mut photos = self.photos.lock().unwrap();
            let photo = photos
                .iter_mut()
                .find(|p| p.id == id)
                .ok_or_else(|| AppError::Remote(format!("no photo {}", id)))?;
            if let Some(caption) = &patch.caption {
                photo.caption = caption.clone();
            }
            if let Some(order_index) = patch.order_index {
                photo.order_index = order_index;
            }
            Ok(photo.clone())
        }

        async fn delete_photo(&self, id: &str) -> Result<Photo> {
            self.write()?;
            let mut photos = self.photos.lock().unwrap();
            let index = photos
                .iter()
                .position(|p| p.id == id)
                .ok_or_else(|| AppError::Remote(format!("no photo {}", id)))?;
            Ok(photos.remove(index))
        }

        async fn upload_object(
            &self,
            filename: &str,
            _content_type: &str,
            _data: Vec<u8>,
        ) -> Result<StoredObject> {
            self.write()?;
            Ok(StoredObject {
                path: format!("uploads/{}", filename),
                url: format!("https://cdn.example.com/uploads/{}", filename),
            })
        }

        async fn remove_object(&self, path: &str) -> Result<()> {
            self.removed_objects.lock().unwrap().push(path.to_string());
            Ok(())
        }

        async fn list_wishes(&self) -> Result<Vec<Wish>> {
            self.read()?;
            Ok(self.wishes.lock().unwrap().clone())
        }

        async fn insert_wish(&self, wish: &NewWish) -> Result<Wish> {
            self.write()?;
            let mut wishes = self.wishes.lock().unwrap();
            let record = Wish {
                id: format!("wish-{}", wishes.len() + 1),
                name: wish.name.clone(),
                email: wish.email.clone(),
                message: wish.message.clone(),
                is_read: false,
                created_at: Utc::now(),
            };
            wishes.insert(0, record.clone());
            Ok(record)
        }

        async fn set_wish_read(&self, id: &str, is_read: bool) -> Result<Wish> {
            self.write()?;
            let mut wishes = self.wishes.lock().unwrap();
            let wish = wishes
                .iter_mut()
                .find(|w| w.id == id)
                .ok_or_else(|| AppError::Remote(format!("no wish {}", id)))?;
            wish.is_read = is_read;
            Ok(wish.clone())
        }

        async fn delete_wish(&self, id: &str) -> Result<()> {
            self.write()?;
            self.wishes.lock().unwrap().retain(|w| w.id != id);
            Ok(())
        }

        async fn list_settings(&self) -> Result<Vec<SiteSetting>> {
            self.read()?;
            Ok(self.settings.lock().unwrap().clone())
        }

        async fn upsert_setting(&self, key: &str, value: &str) -> Result<SiteSetting> {
            self.write()?;
            let mut settings = self.settings.lock().unwrap();
            let record = SiteSetting {
                key: key.to_string(),
                value: value.to_string(),
                updated_at: Utc::now(),
            };
            settings.retain(|s| s.key != key);
            settings.push(record.clone());
            Ok(record)
        }
    }
}
