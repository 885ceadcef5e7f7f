//! `/api/send-wish`

use super::success;
use crate::app::AppState;
use crate::error::Result;
use crate::services::email_relay::{WishEmail, DEFAULT_WISH_SUBJECT};
use crate::validation::validate_message_form;
use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct WishPayload {
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    subject: Option<String>,
}

pub async fn send(
    State(state): State<AppState>,
    payload: std::result::Result<Json<WishPayload>, JsonRejection>,
) -> Result<Json<serde_json::Value>> {
    let Json(payload) = payload?;
    validate_message_form(&payload.name, &payload.email, &payload.message)?;

    let wish = WishEmail {
        name: payload.name.trim().to_string(),
        email: payload.email.trim().to_string(),
        message: payload.message.trim().to_string(),
        subject: payload
            .subject
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_WISH_SUBJECT.to_string()),
    };

    // Relay failures answer 500 with a generic body; details stay in the log
    state.relay.send(&wish).await?;

    Ok(success(serde_json::json!({
        "message": "Your birthday wish has been sent!",
    })))
}
