//! `/api/preferences`
//!
//! Bodies are bare preference objects, the same shape the preferences
//! resource reads and writes.

use crate::app::AppState;
use crate::error::Result;
use crate::preferences::{Preferences, PreferencesPatch};
use axum::{extract::rejection::JsonRejection, extract::State, Json};

pub async fn get(State(state): State<AppState>) -> Result<Json<Preferences>> {
    Ok(Json(state.preferences.get().await?))
}

/// PUT and POST: partial update
pub async fn update(
    State(state): State<AppState>,
    payload: std::result::Result<Json<PreferencesPatch>, JsonRejection>,
) -> Result<Json<Preferences>> {
    let Json(patch) = payload?;
    Ok(Json(state.preferences.update(&patch).await?))
}

pub async fn reset(State(state): State<AppState>) -> Result<Json<Preferences>> {
    Ok(Json(state.preferences.reset().await?))
}
