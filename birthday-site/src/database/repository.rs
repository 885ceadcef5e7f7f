//! Repository layer for database operations
//!
//! CRUD operations for photos, wishes, site settings and analytics
//! events in the local SQLite backend.

use super::models::*;
use crate::error::{AppError, Result};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

/// Repository for database operations
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ===== Photos =====

    /// List photos in display order
    pub async fn list_photos(&self) -> Result<Vec<Photo>> {
        let photos = sqlx::query_as::<_, Photo>(
            r#"
            SELECT * FROM photos
            ORDER BY order_index ASC, created_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(photos)
    }

    /// Insert a photo record
    pub async fn create_photo(&self, req: &NewPhoto) -> Result<Photo> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        let photo = sqlx::query_as::<_, Photo>(
            r#"
            INSERT INTO photos (id, url, caption, order_index, storage_path, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&id)
        .bind(&req.url)
        .bind(&req.caption)
        .bind(req.order_index)
        .bind(&req.storage_path)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!("Created photo: {}", id);
        Ok(photo)
    }

    /// Update caption and/or order of a photo
    pub async fn update_photo(&self, id: &str, patch: &PhotoPatch) -> Result<Photo> {
        let photo = sqlx::query_as::<_, Photo>(
            r#"
            UPDATE photos
            SET caption = COALESCE(?, caption),
                order_index = COALESCE(?, order_index)
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(&patch.caption)
        .bind(patch.order_index)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Photo not found: {}", id)))?;

        tracing::debug!("Updated photo: {}", id);
        Ok(photo)
    }

    /// Delete a photo, returning the deleted row
    pub async fn delete_photo(&self, id: &str) -> Result<Photo> {
        let photo = sqlx::query_as::<_, Photo>("DELETE FROM photos WHERE id = ? RETURNING *")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Photo not found: {}", id)))?;

        tracing::debug!("Deleted photo: {}", id);
        Ok(photo)
    }

    // ===== Wishes =====

    /// List wishes, newest first
    pub async fn list_wishes(&self) -> Result<Vec<Wish>> {
        let wishes = sqlx::query_as::<_, Wish>(
            r#"
            SELECT * FROM wishes ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(wishes)
    }

    /// Insert a wish (unread)
    pub async fn create_wish(&self, req: &NewWish) -> Result<Wish> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        let wish = sqlx::query_as::<_, Wish>(
            r#"
            INSERT INTO wishes (id, name, email, message, is_read, created_at)
            VALUES (?, ?, ?, ?, 0, ?)
            RETURNING *
            "#,
        )
        .bind(&id)
        .bind(&req.name)
        .bind(&req.email)
        .bind(&req.message)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!("Created wish: {}", id);
        Ok(wish)
    }

    /// Set the read flag of a wish
    pub async fn set_wish_read(&self, id: &str, is_read: bool) -> Result<Wish> {
        let wish = sqlx::query_as::<_, Wish>(
            r#"
            UPDATE wishes SET is_read = ? WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(is_read)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Wish not found: {}", id)))?;

        tracing::debug!("Marked wish {} read={}", id, is_read);
        Ok(wish)
    }

    /// Delete a wish
    pub async fn delete_wish(&self, id: &str) -> Result<()> {
        let rows = sqlx::query("DELETE FROM wishes WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if rows == 0 {
            return Err(AppError::NotFound(format!("Wish not found: {}", id)));
        }

        tracing::debug!("Deleted wish: {}", id);
        Ok(())
    }

    // ===== Site settings =====

    /// List all site settings
    pub async fn list_settings(&self) -> Result<Vec<SiteSetting>> {
        let settings = sqlx::query_as::<_, SiteSetting>(
            r#"
            SELECT * FROM site_settings ORDER BY key ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(settings)
    }

    pub async fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let value: Option<String> =
            sqlx::query_scalar("SELECT value FROM site_settings WHERE key = ?")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

        Ok(value)
    }

    /// Insert or replace a setting
    pub async fn upsert_setting(&self, key: &str, value: &str) -> Result<SiteSetting> {
        let now = Utc::now();

        let setting = sqlx::query_as::<_, SiteSetting>(
            r#"
            INSERT INTO site_settings (key, value, updated_at) VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            RETURNING *
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!("Set site setting: {}", key);
        Ok(setting)
    }

    // ===== Analytics =====

    /// Append an analytics event
    pub async fn record_analytics_event(
        &self,
        event: &str,
        device: &str,
        section: Option<&str>,
        occurred_at: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO analytics_events (event, device, section, occurred_at, recorded_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(event)
        .bind(device)
        .bind(section)
        .bind(occurred_at)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Count events with the given name, grouped by device
    pub async fn count_events_by_device(&self, event: &str) -> Result<Vec<(String, i64)>> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT device, COUNT(*) FROM analytics_events WHERE event = ? GROUP BY device",
        )
        .bind(event)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Count events other than the given name
    pub async fn count_events_except(&self, event: &str) -> Result<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM analytics_events WHERE event != ?")
                .bind(event)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }

    /// Count events per section
    pub async fn count_events_by_section(&self) -> Result<Vec<(String, i64)>> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            r#"
            SELECT section, COUNT(*) FROM analytics_events
            WHERE section IS NOT NULL
            GROUP BY section
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
