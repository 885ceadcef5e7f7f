//! Site settings resource (admin only)

use super::resource::{LoadOutcome, Resource, ResourceState, SyncPolicy, WriteFailure};
use crate::database::SiteSetting;
use crate::error::{AppError, Result};
use crate::remote::RemoteDataClient;
use chrono::Utc;
use tokio::sync::watch;

pub struct SettingsResource {
    client: RemoteDataClient,
    resource: Resource<Vec<SiteSetting>>,
    policy: SyncPolicy,
}

impl SettingsResource {
    pub fn new(client: RemoteDataClient) -> Self {
        Self::with_policy(client, SyncPolicy::strict())
    }

    pub fn with_policy(client: RemoteDataClient, policy: SyncPolicy) -> Self {
        Self {
            client,
            resource: Resource::new("site_settings", Vec::new()),
            policy,
        }
    }

    pub fn state(&self) -> ResourceState<Vec<SiteSetting>> {
        self.resource.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<ResourceState<Vec<SiteSetting>>> {
        self.resource.subscribe()
    }

    /// Value of a loaded setting
    pub fn get(&self, key: &str) -> Option<String> {
        self.resource
            .data()
            .into_iter()
            .find(|s| s.key == key)
            .map(|s| s.value)
    }

    pub async fn load(&self) -> LoadOutcome {
        let ticket = self.resource.begin_load();

        match self.client.fetch_settings().await {
            Ok(settings) => self.resource.commit(ticket, settings, None),
            Err(e) => {
                tracing::warn!("Failed to load site settings: {}", e);
                self.resource.commit(
                    ticket,
                    Vec::new(),
                    Some(format!("Failed to load settings: {}", e)),
                )
            }
        }
    }

    pub async fn refetch(&self) -> LoadOutcome {
        self.load().await
    }

    pub fn cancel(&self) {
        self.resource.cancel();
    }

    /// Insert or overwrite a setting
    pub async fn save(&self, key: &str, value: &str) -> Result<Option<SiteSetting>> {
        let key = key.trim();
        if key.is_empty() {
            return Err(AppError::validation("Setting key must not be empty"));
        }

        match self.client.save_setting(key, value).await {
            Ok(Some(saved)) => {
                tracing::info!("Site setting saved: {}", saved.key);
                self.store_locally(saved.clone());
                Ok(Some(saved))
            }
            Ok(None) => Ok(None),
            Err(e) => match self.policy.on_write_failure {
                WriteFailure::ApplyLocally => {
                    tracing::warn!("Setting {} not saved remotely, kept locally: {}", key, e);
                    let local = SiteSetting {
                        key: key.to_string(),
                        value: value.to_string(),
                        updated_at: Utc::now(),
                    };
                    self.store_locally(local.clone());
                    Ok(Some(local))
                }
                WriteFailure::Surface => {
                    self.resource
                        .set_error(format!("Failed to save setting {}: {}", key, e));
                    Err(e)
                }
            },
        }
    }

    fn store_locally(&self, setting: SiteSetting) {
        self.resource.update(|settings| {
            match settings.iter_mut().find(|s| s.key == setting.key) {
                Some(existing) => *existing = setting,
                None => settings.push(setting),
            }
        });
    }
}
