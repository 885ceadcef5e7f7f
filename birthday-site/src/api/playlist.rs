//! `/api/music-playlist`

use super::success;
use crate::app::AppState;
use crate::error::{AppError, Result};
use crate::services::NewTrack;
use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistPayload {
    #[serde(default)]
    action: String,
    #[serde(default)]
    track: Option<NewTrack>,
    #[serde(default)]
    track_name: Option<String>,
    #[serde(default)]
    ordered_track_names: Option<Vec<String>>,
}

pub async fn list(State(state): State<AppState>) -> Result<Json<serde_json::Value>> {
    let tracks = state.playlist.tracks().await?;
    Ok(Json(serde_json::json!({ "tracks": tracks })))
}

pub async fn update(
    State(state): State<AppState>,
    payload: std::result::Result<Json<PlaylistPayload>, JsonRejection>,
) -> Result<Json<serde_json::Value>> {
    let Json(payload) = payload?;

    let tracks = match payload.action.trim() {
        "add" => {
            let track = payload
                .track
                .ok_or_else(|| AppError::validation("Missing required field: track"))?;
            state.playlist.add(track).await?
        }
        "remove" => {
            let name = payload
                .track_name
                .filter(|n| !n.trim().is_empty())
                .ok_or_else(|| AppError::validation("Missing required field: trackName"))?;
            state.playlist.remove(&name).await?
        }
        "reorder" => {
            let names = payload.ordered_track_names.ok_or_else(|| {
                AppError::validation("Missing required field: orderedTrackNames")
            })?;
            state.playlist.reorder(&names).await?
        }
        "" => return Err(AppError::validation("Missing required field: action")),
        other => {
            return Err(AppError::validation(format!(
                "Unknown action {:?}, expected add, remove or reorder",
                other
            )));
        }
    };

    Ok(success(serde_json::json!({ "tracks": tracks })))
}
