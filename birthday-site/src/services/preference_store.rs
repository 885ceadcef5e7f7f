//! Server-side preference store behind `/api/preferences`

use crate::error::Result;
use crate::preferences::{Preferences, PreferencesPatch};
use async_trait::async_trait;
use tokio::sync::RwLock;

#[async_trait]
pub trait PreferenceStore: Send + Sync {
    async fn get(&self) -> Result<Preferences>;
    /// Validate and merge a partial update; nothing changes on error
    async fn update(&self, patch: &PreferencesPatch) -> Result<Preferences>;
    async fn reset(&self) -> Result<Preferences>;
}

#[derive(Default)]
pub struct InMemoryPreferences {
    current: RwLock<Preferences>,
}

impl InMemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PreferenceStore for InMemoryPreferences {
    async fn get(&self) -> Result<Preferences> {
        Ok(self.current.read().await.clone())
    }

    async fn update(&self, patch: &PreferencesPatch) -> Result<Preferences> {
        let mut current = self.current.write().await;
        let merged = current.merged(patch)?;
        *current = merged.clone();
        tracing::debug!("Preferences updated: {:?}", merged);
        Ok(merged)
    }

    async fn reset(&self) -> Result<Preferences> {
        let mut current = self.current.write().await;
        *current = Preferences::default();
        tracing::info!("Preferences reset to defaults");
        Ok(current.clone())
    }
}
