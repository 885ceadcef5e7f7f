//! Application state and initialization
//!
//! All stores and gateways are built here from [`SiteConfig`] and shared
//! with the handlers through [`AppState`].

use crate::config::{BackendConfig, SiteConfig, DATABASE_FILE_NAME};
use crate::database::{create_pool, Repository};
use crate::error::Result;
use crate::remote::{RemoteDataClient, RestStore, SqliteStore};
use crate::services::{
    AdminGate, AnalyticsStore, ContactInbox, EmailRelay, HttpEmailRelay, InMemoryAnalytics,
    InMemoryInbox, InMemoryPlaylist, InMemoryPreferences, PlaylistStore, PreferenceStore,
    SqliteAnalytics, UnconfiguredRelay,
};
use crate::storage::BlobStore;
use std::sync::Arc;

/// Central application state holding all services
#[derive(Clone)]
pub struct AppState {
    pub remote: RemoteDataClient,
    /// Local media, only present with the SQLite backend
    pub blobs: Option<BlobStore>,
    pub analytics: Arc<dyn AnalyticsStore>,
    pub playlist: Arc<dyn PlaylistStore>,
    pub preferences: Arc<dyn PreferenceStore>,
    pub inbox: Arc<dyn ContactInbox>,
    pub relay: Arc<dyn EmailRelay>,
    pub admin: Arc<AdminGate>,
}

impl AppState {
    /// Everything in memory, no backend, no relay
    pub fn in_memory(admin_password: Option<String>) -> Self {
        let remote = RemoteDataClient::unconfigured();

        Self {
            admin: Arc::new(AdminGate::new(remote.clone(), admin_password)),
            remote,
            blobs: None,
            analytics: Arc::new(InMemoryAnalytics::new()),
            playlist: Arc::new(InMemoryPlaylist::default()),
            preferences: Arc::new(InMemoryPreferences::new()),
            inbox: Arc::new(InMemoryInbox::new()),
            relay: Arc::new(UnconfiguredRelay),
        }
    }

    /// Build state for the configured backend
    pub async fn from_config(config: &SiteConfig) -> Result<Self> {
        tracing::info!("Initializing application state");

        let mut state = Self::in_memory(config.admin_password.clone());

        match &config.backend {
            BackendConfig::Rest {
                url,
                anon_key,
                bucket,
            } => {
                let store = RestStore::new(url, anon_key, bucket)?;
                state.remote = RemoteDataClient::new(Arc::new(store));
            }
            BackendConfig::Sqlite { data_dir } => {
                tracing::info!("Using local backend in {:?}", data_dir);

                let pool = create_pool(&data_dir.join(DATABASE_FILE_NAME)).await?;
                let repo = Repository::new(pool);

                let blobs = BlobStore::new(data_dir.join("media"));
                blobs.initialize().await?;

                let media_base_url = format!("{}/media", config.public_base_url);
                let store = SqliteStore::new(repo.clone(), blobs.clone(), &media_base_url);

                state.remote = RemoteDataClient::new(Arc::new(store));
                state.blobs = Some(blobs);
                state.analytics = Arc::new(SqliteAnalytics::new(repo));
            }
            BackendConfig::Unconfigured => {}
        }

        if let Some(relay) = &config.relay {
            state.relay = Arc::new(HttpEmailRelay::new(relay.clone())?);
        }

        state.admin = Arc::new(AdminGate::new(
            state.remote.clone(),
            config.admin_password.clone(),
        ));

        tracing::info!("Application initialized successfully");

        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn config(backend: BackendConfig) -> SiteConfig {
        SiteConfig {
            port: 0,
            backend,
            admin_password: None,
            relay: None,
            public_base_url: "http://localhost:3000".to_string(),
        }
    }

    #[tokio::test]
    async fn test_unconfigured_backend() {
        let state = AppState::from_config(&config(BackendConfig::Unconfigured))
            .await
            .unwrap();

        assert!(!state.remote.is_configured());
        assert!(state.blobs.is_none());
        assert!(!state.admin.is_configured().await);
    }

    #[tokio::test]
    async fn test_sqlite_backend_creates_data_dir() {
        let temp = TempDir::new().unwrap();
        let data_dir: PathBuf = temp.path().join("site");

        let state = AppState::from_config(&config(BackendConfig::Sqlite {
            data_dir: data_dir.clone(),
        }))
        .await
        .unwrap();

        assert!(state.remote.is_configured());
        assert!(state.blobs.is_some());
        assert!(data_dir.join(DATABASE_FILE_NAME).exists());
        assert!(state.remote.fetch_photos().await.unwrap().is_empty());
    }
}
