//! Managed backend over REST
//!
//! Talks to a PostgREST-style table API (`/rest/v1/{table}`) and an
//! object storage API (`/storage/v1/object/{bucket}/{path}`), both
//! authenticated with the project's anon key.

use super::RemoteStore;
use crate::config::REMOTE_REQUEST_TIMEOUT;
use crate::database::{NewPhoto, NewWish, Photo, PhotoPatch, SiteSetting, StoredObject, Wish};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use serde::Deserialize;

const RETURN_REPRESENTATION: &str = "return=representation";
const UPSERT_REPRESENTATION: &str = "resolution=merge-duplicates,return=representation";

/// REST client for the managed backend
pub struct RestStore {
    client: reqwest::Client,
    base_url: String,
    bucket: String,
}

impl RestStore {
    /// Build a client whose every request carries the anon key
    pub fn new(base_url: &str, anon_key: &str, bucket: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("apikey"),
            HeaderValue::from_str(anon_key)
                .map_err(|e| AppError::Generic(format!("Invalid backend key: {}", e)))?,
        );
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", anon_key))
                .map_err(|e| AppError::Generic(format!("Invalid backend key: {}", e)))?,
        );

        let client = reqwest::ClientBuilder::new()
            .default_headers(headers)
            .timeout(REMOTE_REQUEST_TIMEOUT)
            .build()?;

        tracing::info!("REST backend configured at {}", base_url);

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            bucket: bucket.to_string(),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn object_url(&self, path: &str) -> String {
        format!("{}/storage/v1/object/{}/{}", self.base_url, self.bucket, path)
    }

    fn public_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, self.bucket, path
        )
    }

    /// Send a request and decode a JSON body, or surface the backend's
    /// error message as-is.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, operation: &str) -> Result<T> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let message = backend_message(&body)
                .unwrap_or_else(|| format!("{} failed with HTTP {}", operation, status));
            tracing::error!("[Backend] {} failed ({}): {}", operation, status, message);
            return Err(AppError::Remote(message));
        }

        tracing::debug!("[Backend] {} succeeded ({} bytes)", operation, body.len());

        Ok(serde_json::from_slice(&body)?)
    }

    /// Like [`send`](Self::send) for calls answered with the affected rows,
    /// returning the single row.
    async fn send_one<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        operation: &str,
        missing: impl FnOnce() -> AppError,
    ) -> Result<T> {
        let rows: Vec<T> = self.send(request, operation).await?;
        rows.into_iter().next().ok_or_else(missing)
    }

    async fn send_empty(&self, request: RequestBuilder, operation: &str) -> Result<()> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.bytes().await?;
            let message = backend_message(&body)
                .unwrap_or_else(|| format!("{} failed with HTTP {}", operation, status));
            tracing::error!("[Backend] {} failed ({}): {}", operation, status, message);
            return Err(AppError::Remote(message));
        }

        Ok(())
    }
}

/// Pull a human-readable message out of an error body
fn backend_message(body: &[u8]) -> Option<String> {
    #[derive(Deserialize)]
    struct ErrorBody {
        message: Option<String>,
        error: Option<String>,
        msg: Option<String>,
    }

    if let Ok(parsed) = serde_json::from_slice::<ErrorBody>(body) {
        if let Some(message) = parsed.message.or(parsed.msg).or(parsed.error) {
            return Some(message);
        }
    }

    let text = String::from_utf8_lossy(body).trim().to_string();
    (!text.is_empty()).then_some(text)
}

/// Reduce an uploaded filename to a single URL-safe path segment:
/// ASCII letters, digits, `.`, `_` and `-`, whitespace becoming `-`
fn sanitize_filename(filename: &str) -> String {
    let cleaned: String = filename
        .chars()
        .map(|c| if c.is_whitespace() { '-' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .take(200)
        .collect();

    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}

#[async_trait]
impl RemoteStore for RestStore {
    async fn list_photos(&self) -> Result<Vec<Photo>> {
        let request = self
            .client
            .get(self.table_url("photos"))
            .query(&[("select", "*"), ("order", "order_index.asc")]);
        self.send(request, "list photos").await
    }

    async fn insert_photo(&self, photo: &NewPhoto) -> Result<Photo> {
        let request = self
            .client
            .post(self.table_url("photos"))
            .header("Prefer", RETURN_REPRESENTATION)
            .json(photo);
        self.send_one(request, "insert photo", || {
            AppError::Remote("Backend returned no photo".to_string())
        })
        .await
    }

    async fn update_photo(&self, id: &str, patch: &PhotoPatch) -> Result<Photo> {
        let request = self
            .client
            .patch(self.table_url("photos"))
            .query(&[("id", format!("eq.{}", id))])
            .header("Prefer", RETURN_REPRESENTATION)
            .json(patch);
        self.send_one(request, "update photo", || {
            AppError::NotFound(format!("Photo not found: {}", id))
        })
        .await
    }

    async fn delete_photo(&self, id: &str) -> Result<Photo> {
        let request = self
            .client
            .delete(self.table_url("photos"))
            .query(&[("id", format!("eq.{}", id))])
            .header("Prefer", RETURN_REPRESENTATION);
        self.send_one(request, "delete photo", || {
            AppError::NotFound(format!("Photo not found: {}", id))
        })
        .await
    }

    async fn upload_object(
        &self,
        filename: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> Result<StoredObject> {
        let path = format!(
            "{}-{}",
            Utc::now().timestamp_millis(),
            sanitize_filename(filename)
        );

        let request = self
            .client
            .post(self.object_url(&path))
            .header(CONTENT_TYPE, content_type)
            .body(data);
        self.send_empty(request, "upload object").await?;

        Ok(StoredObject {
            url: self.public_url(&path),
            path,
        })
    }

    async fn remove_object(&self, path: &str) -> Result<()> {
        let request = self.client.delete(self.object_url(path));
        self.send_empty(request, "remove object").await
    }

    async fn list_wishes(&self) -> Result<Vec<Wish>> {
        let request = self
            .client
            .get(self.table_url("wishes"))
            .query(&[("select", "*"), ("order", "created_at.desc")]);
        self.send(request, "list wishes").await
    }

    async fn insert_wish(&self, wish: &NewWish) -> Result<Wish> {
        let request = self
            .client
            .post(self.table_url("wishes"))
            .header("Prefer", RETURN_REPRESENTATION)
            .json(wish);
        self.send_one(request, "insert wish", || {
            AppError::Remote("Backend returned no wish".to_string())
        })
        .await
    }

    async fn set_wish_read(&self, id: &str, is_read: bool) -> Result<Wish> {
        let request = self
            .client
            .patch(self.table_url("wishes"))
            .query(&[("id", format!("eq.{}", id))])
            .header("Prefer", RETURN_REPRESENTATION)
            .json(&serde_json::json!({ "is_read": is_read }));
        self.send_one(request, "mark wish", || {
            AppError::NotFound(format!("Wish not found: {}", id))
        })
        .await
    }

    async fn delete_wish(&self, id: &str) -> Result<()> {
        let request = self
            .client
            .delete(self.table_url("wishes"))
            .query(&[("id", format!("eq.{}", id))]);
        self.send_empty(request, "delete wish").await
    }

    async fn list_settings(&self) -> Result<Vec<SiteSetting>> {
        let request = self
            .client
            .get(self.table_url("site_settings"))
            .query(&[("select", "*"), ("order", "key.asc")]);
        self.send(request, "list settings").await
    }

    async fn upsert_setting(&self, key: &str, value: &str) -> Result<SiteSetting> {
        let request = self
            .client
            .post(self.table_url("site_settings"))
            .query(&[("on_conflict", "key")])
            .header("Prefer", UPSERT_REPRESENTATION)
            .json(&serde_json::json!({
                "key": key,
                "value": value,
                "updated_at": Utc::now(),
            }));
        self.send_one(request, "upsert setting", || {
            AppError::Remote("Backend returned no setting".to_string())
        })
        .await
    }
}
