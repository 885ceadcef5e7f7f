//! `/api/analytics`

use super::success;
use crate::app::AppState;
use crate::device::DeviceTier;
use crate::error::{AppError, Result};
use crate::services::{AnalyticsEvent, AnalyticsSummary};
use crate::validation::require_fields;
use axum::{extract::rejection::JsonRejection, extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct EventPayload {
    #[serde(default)]
    event: String,
    #[serde(default)]
    device: String,
    /// RFC 3339; the receive time is used when absent
    #[serde(default)]
    timestamp: Option<String>,
    #[serde(default)]
    section: Option<String>,
}

impl EventPayload {
    fn into_event(self) -> Result<AnalyticsEvent> {
        require_fields(&[("event", &self.event), ("device", &self.device)])?;

        let device: DeviceTier = self.device.trim().parse()?;

        let occurred_at = match self.timestamp.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => DateTime::parse_from_rfc3339(raw)
                .map(|t| t.with_timezone(&Utc))
                .map_err(|e| AppError::validation(format!("Invalid timestamp {:?}: {}", raw, e)))?,
            _ => Utc::now(),
        };

        Ok(AnalyticsEvent {
            event: self.event.trim().to_string(),
            device,
            section: self
                .section
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            occurred_at,
        })
    }
}

pub async fn record(
    State(state): State<AppState>,
    payload: std::result::Result<Json<EventPayload>, JsonRejection>,
) -> Result<Json<serde_json::Value>> {
    let Json(payload) = payload?;
    let event = payload.into_event()?;

    state.analytics.record(&event).await?;

    Ok(success(serde_json::json!({})))
}

pub async fn summary(State(state): State<AppState>) -> Result<Json<AnalyticsSummary>> {
    Ok(Json(state.analytics.summary().await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(event: &str, device: &str, timestamp: Option<&str>) -> EventPayload {
        EventPayload {
            event: event.to_string(),
            device: device.to_string(),
            timestamp: timestamp.map(str::to_string),
            section: Some("  ".to_string()),
        }
    }

    #[test]
    fn test_valid_event() {
        let event = payload("page_view", "tablet", Some("2024-06-01T10:00:00+02:00"))
            .into_event()
            .unwrap();

        assert_eq!(event.device, DeviceTier::Tablet);
        assert_eq!(event.occurred_at.to_rfc3339(), "2024-06-01T08:00:00+00:00");
        assert!(event.section.is_none());
    }

    #[test]
    fn test_rejections() {
        assert!(payload("", "mobile", None).into_event().is_err());
        assert!(payload("click", "", None).into_event().is_err());
        assert!(payload("click", "smartwatch", None).into_event().is_err());
        assert!(payload("click", "mobile", Some("yesterday")).into_event().is_err());
    }
}
