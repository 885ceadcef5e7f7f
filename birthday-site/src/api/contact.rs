//! `/api/contact-form`

use super::success;
use crate::app::AppState;
use crate::error::Result;
use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ContactPayload {
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    message: String,
}

pub async fn submit(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ContactPayload>, JsonRejection>,
) -> Result<Json<serde_json::Value>> {
    let Json(payload) = payload?;

    state
        .inbox
        .submit(&payload.name, &payload.email, &payload.message)
        .await?;

    Ok(success(serde_json::json!({
        "message": "Thank you for your message! We'll get back to you soon.",
    })))
}
