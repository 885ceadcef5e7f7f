//! Admin password gate
//!
//! The password comes from the `admin_password` site setting, falling
//! back to the `ADMIN_PASSWORD` environment variable. With neither set
//! the gate is closed: every login fails with `AdminNotConfigured`.

use crate::config::ADMIN_PASSWORD_SETTING;
use crate::error::{AppError, Result};
use crate::remote::RemoteDataClient;
use sha2::{Digest, Sha256};

pub struct AdminGate {
    client: RemoteDataClient,
    env_password: Option<String>,
}

impl AdminGate {
    pub fn new(client: RemoteDataClient, env_password: Option<String>) -> Self {
        Self {
            client,
            env_password: env_password.filter(|p| !p.is_empty()),
        }
    }

    async fn configured_password(&self) -> Option<String> {
        match self.client.get_setting(ADMIN_PASSWORD_SETTING).await {
            Ok(Some(password)) if !password.is_empty() => return Some(password),
            Ok(_) => {}
            Err(e) => tracing::warn!("Could not read admin password setting: {}", e),
        }
        self.env_password.clone()
    }

    pub async fn is_configured(&self) -> bool {
        self.configured_password().await.is_some()
    }

    pub async fn verify(&self, attempt: &str) -> Result<()> {
        let Some(expected) = self.configured_password().await else {
            tracing::warn!("Admin login attempted but no admin password is configured");
            return Err(AppError::AdminNotConfigured);
        };

        // Compare fixed-length digests so timing doesn't depend on where
        // the strings first differ
        let expected = Sha256::digest(expected.as_bytes());
        let attempt = Sha256::digest(attempt.as_bytes());
        let differing = expected
            .iter()
            .zip(attempt.iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b));

        if differing == 0 {
            tracing::info!("Admin login succeeded");
            Ok(())
        } else {
            tracing::warn!("Admin login failed");
            Err(AppError::Unauthorized)
        }
    }
}
