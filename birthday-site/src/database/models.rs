//! Database models
//!
//! Rust structs representing the persisted site entities.
//! Field names match the backend tables so rows decode directly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A gallery photo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Photo {
    pub id: String,
    pub url: String,
    pub caption: String,
    /// Display order; neither unique nor contiguous
    pub order_index: i64,
    /// Object store locator for uploaded files
    #[serde(default)]
    pub storage_path: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Insert photo request
#[derive(Debug, Clone, Serialize)]
pub struct NewPhoto {
    pub url: String,
    pub caption: String,
    pub order_index: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_path: Option<String>,
}

/// Partial photo update
#[derive(Debug, Clone, Default, Serialize)]
pub struct PhotoPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_index: Option<i64>,
}

/// A birthday wish left by a visitor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Wish {
    pub id: String,
    pub name: String,
    pub email: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// Insert wish request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewWish {
    pub name: String,
    pub email: String,
    pub message: String,
}

/// Site-wide key/value setting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct SiteSetting {
    pub key: String,
    pub value: String,
    pub updated_at: DateTime<Utc>,
}

/// Result of storing an uploaded object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Locator used to delete the object later
    pub path: String,
    /// Public URL the gallery can render
    pub url: String,
}
