//! Preferences endpoint client

use crate::config::REMOTE_REQUEST_TIMEOUT;
use crate::error::{AppError, Result};
use crate::preferences::{Preferences, PreferencesPatch};
use async_trait::async_trait;
use serde::de::DeserializeOwned;

/// Remote side of the preferences resource
#[async_trait]
pub trait PreferencesRemote: Send + Sync {
    async fn fetch(&self) -> Result<Preferences>;
    async fn save(&self, patch: &PreferencesPatch) -> Result<Preferences>;
    async fn reset(&self) -> Result<Preferences>;
}

/// Talks to `/api/preferences` on the site's own server
pub struct PreferencesClient {
    client: reqwest::Client,
    url: String,
}

impl PreferencesClient {
    pub fn new(site_base_url: &str) -> Result<Self> {
        let client = reqwest::ClientBuilder::new()
            .timeout(REMOTE_REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            url: format!("{}/api/preferences", site_base_url.trim_end_matches('/')),
        })
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let message = serde_json::from_slice::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
                .unwrap_or_else(|| format!("Preferences request failed with HTTP {}", status));
            return Err(AppError::Remote(message));
        }

        serde_json::from_slice(&body)
            .map_err(|e| AppError::Remote(format!("Invalid preferences response: {}", e)))
    }
}

#[async_trait]
impl PreferencesRemote for PreferencesClient {
    async fn fetch(&self) -> Result<Preferences> {
        let response = self.client.get(&self.url).send().await?;
        Self::decode(response).await
    }

    async fn save(&self, patch: &PreferencesPatch) -> Result<Preferences> {
        let response = self.client.put(&self.url).json(patch).send().await?;
        Self::decode(response).await
    }

    async fn reset(&self) -> Result<Preferences> {
        let response = self.client.delete(&self.url).send().await?;
        Self::decode(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::router;
    use crate::app::AppState;
    use crate::preferences::Theme;
    use tokio::net::TcpListener;

    async fn serve_site() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        let app = router(AppState::in_memory(None));
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", address)
    }

    #[tokio::test]
    async fn test_round_trip_against_site() {
        let client = PreferencesClient::new(&serve_site().await).unwrap();

        assert_eq!(client.fetch().await.unwrap(), Preferences::default());

        let saved = client
            .save(&PreferencesPatch {
                theme: Some("minimal".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(saved.theme, Theme::Minimal);
        assert_eq!(client.fetch().await.unwrap(), saved);

        assert_eq!(client.reset().await.unwrap(), Preferences::default());
    }

    #[tokio::test]
    async fn test_server_validation_message_is_kept() {
        let client = PreferencesClient::new(&serve_site().await).unwrap();

        let err = client
            .save(&PreferencesPatch {
                volume: Some(300),
                ..Default::default()
            })
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Volume must be between 0 and 100");
    }

    #[tokio::test]
    async fn test_out_of_range_response_is_rejected() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        let app = axum::Router::new().route(
            "/api/preferences",
            axum::routing::get(|| async { axum::Json(serde_json::json!({ "volume": 200 })) }),
        );
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let client = PreferencesClient::new(&format!("http://{}", address)).unwrap();
        let err = client.fetch().await.unwrap_err();

        assert!(matches!(err, AppError::Remote(_)));
        assert!(err.to_string().contains("Volume must be between 0 and 100"));
    }
}
