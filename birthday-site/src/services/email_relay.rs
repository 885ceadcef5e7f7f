//! Email relay for birthday wishes
//!
//! Wishes are forwarded to a form-to-email relay service as JSON. The
//! relay answers `{"success": bool, "message": ...}`.

use crate::config::{RelayConfig, REMOTE_REQUEST_TIMEOUT};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Subject used when the sender gives none
pub const DEFAULT_WISH_SUBJECT: &str = "New birthday wish";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WishEmail {
    pub name: String,
    pub email: String,
    pub message: String,
    pub subject: String,
}

#[async_trait]
pub trait EmailRelay: Send + Sync {
    async fn send(&self, wish: &WishEmail) -> Result<()>;
}

/// Relay over HTTP
pub struct HttpEmailRelay {
    client: reqwest::Client,
    config: RelayConfig,
}

#[derive(Serialize)]
struct RelayRequest<'a> {
    access_key: &'a str,
    from_name: &'a str,
    #[serde(flatten)]
    wish: &'a WishEmail,
}

#[derive(Deserialize)]
struct RelayResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    message: Option<String>,
}

impl HttpEmailRelay {
    pub fn new(config: RelayConfig) -> Result<Self> {
        let client = reqwest::ClientBuilder::new()
            .timeout(REMOTE_REQUEST_TIMEOUT)
            .build()?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl EmailRelay for HttpEmailRelay {
    async fn send(&self, wish: &WishEmail) -> Result<()> {
        let request = RelayRequest {
            access_key: &self.config.access_key,
            from_name: "Birthday Website",
            wish,
        };

        let response = self
            .client
            .post(&self.config.url)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;
        let parsed = serde_json::from_slice::<RelayResponse>(&body).ok();

        match parsed {
            Some(reply) if status.is_success() && reply.success => {
                tracing::info!("Wish from {} forwarded to relay", wish.name);
                Ok(())
            }
            Some(reply) => Err(AppError::Relay(
                reply
                    .message
                    .unwrap_or_else(|| format!("relay rejected the wish (HTTP {})", status)),
            )),
            None => Err(AppError::Relay(format!(
                "unexpected relay response (HTTP {})",
                status
            ))),
        }
    }
}

/// Stand-in used when no relay is configured; every send fails
pub struct UnconfiguredRelay;

#[async_trait]
impl EmailRelay for UnconfiguredRelay {
    async fn send(&self, _wish: &WishEmail) -> Result<()> {
        Err(AppError::Relay("email relay is not configured".to_string()))
    }
}
