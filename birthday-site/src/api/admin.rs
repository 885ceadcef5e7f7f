//! `/api/admin/login`

use super::success;
use crate::app::AppState;
use crate::error::Result;
use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct LoginPayload {
    #[serde(default)]
    password: String,
}

pub async fn login(
    State(state): State<AppState>,
    payload: std::result::Result<Json<LoginPayload>, JsonRejection>,
) -> Result<Json<serde_json::Value>> {
    let Json(payload) = payload?;

    state.admin.verify(&payload.password).await?;

    Ok(success(serde_json::json!({})))
}
