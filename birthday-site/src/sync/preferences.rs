//! Preferences resource
//!
//! Remote first, then the local cache, then defaults for the current
//! device. By default a failed save still applies locally: the visitor
//! sees the change and the cache keeps it for the next visit.

use super::resource::{LoadOutcome, ReadFallback, Resource, ResourceState, SyncPolicy, WriteFailure};
use crate::device::DeviceContext;
use crate::error::{AppError, Result};
use crate::preferences::{Preferences, PreferencesPatch};
use crate::remote::PreferencesRemote;
use crate::services::PreferenceCache;
use std::sync::Arc;
use tokio::sync::watch;

pub struct PreferencesResource {
    remote: Option<Arc<dyn PreferencesRemote>>,
    cache: PreferenceCache,
    device: DeviceContext,
    resource: Resource<Preferences>,
    policy: SyncPolicy,
}

impl PreferencesResource {
    pub fn new(
        remote: Option<Arc<dyn PreferencesRemote>>,
        cache: PreferenceCache,
        device: DeviceContext,
    ) -> Self {
        Self::with_policy(remote, cache, device, SyncPolicy::optimistic())
    }

    pub fn with_policy(
        remote: Option<Arc<dyn PreferencesRemote>>,
        cache: PreferenceCache,
        device: DeviceContext,
        policy: SyncPolicy,
    ) -> Self {
        let initial = Preferences::for_device(&device);
        Self {
            remote,
            cache,
            device,
            resource: Resource::new("preferences", initial),
            policy,
        }
    }

    pub fn state(&self) -> ResourceState<Preferences> {
        self.resource.snapshot()
    }

    pub fn preferences(&self) -> Preferences {
        self.resource.data()
    }

    pub fn subscribe(&self) -> watch::Receiver<ResourceState<Preferences>> {
        self.resource.subscribe()
    }

    pub async fn load(&self) -> LoadOutcome {
        let ticket = self.resource.begin_load();

        let Some(remote) = &self.remote else {
            let prefs = self.cached_or_defaults().await;
            return self.resource.commit(ticket, prefs, None);
        };

        match remote.fetch().await {
            Ok(prefs) => {
                // A superseded load must not overwrite what a newer one cached
                let outcome = self.resource.commit(ticket, prefs.clone(), None);
                if outcome == LoadOutcome::Committed {
                    self.persist(&prefs).await;
                }
                outcome
            }
            Err(e) => {
                tracing::warn!("Failed to load preferences: {}", e);
                let prefs = match self.policy.on_read_failure {
                    ReadFallback::Degraded => self.cached_or_defaults().await,
                    ReadFallback::Empty => self.resource.data(),
                };
                self.resource
                    .commit(ticket, prefs, Some(format!("Failed to load preferences: {}", e)))
            }
        }
    }

    pub async fn refetch(&self) -> LoadOutcome {
        self.load().await
    }

    pub fn cancel(&self) {
        self.resource.cancel();
    }

    /// Apply a partial update. Invalid patches are rejected before the
    /// remote call and never fall back.
    pub async fn update(&self, patch: &PreferencesPatch) -> Result<Preferences> {
        let local = self.resource.data().merged(patch)?;

        let Some(remote) = &self.remote else {
            self.apply(local.clone()).await;
            return Ok(local);
        };

        match remote.save(patch).await {
            Ok(saved) => {
                self.apply(saved.clone()).await;
                Ok(saved)
            }
            Err(e) => self.write_failed(e, local).await,
        }
    }

    /// Back to the defaults for this device
    pub async fn reset(&self) -> Result<Preferences> {
        let defaults = Preferences::for_device(&self.device);

        let Some(remote) = &self.remote else {
            self.apply(defaults.clone()).await;
            return Ok(defaults);
        };

        match remote.reset().await {
            Ok(prefs) => {
                self.apply(prefs.clone()).await;
                Ok(prefs)
            }
            Err(e) => self.write_failed(e, defaults).await,
        }
    }

    async fn write_failed(&self, error: AppError, local: Preferences) -> Result<Preferences> {
        match self.policy.on_write_failure {
            WriteFailure::ApplyLocally => {
                tracing::warn!("Preferences not saved remotely, kept locally: {}", error);
                self.apply(local.clone()).await;
                Ok(local)
            }
            WriteFailure::Surface => {
                self.resource
                    .set_error(format!("Failed to save preferences: {}", error));
                Err(error)
            }
        }
    }

    async fn apply(&self, prefs: Preferences) {
        self.persist(&prefs).await;
        self.resource.update(|current| *current = prefs);
    }

    async fn persist(&self, prefs: &Preferences) {
        if let Err(e) = self.cache.save(prefs).await {
            tracing::warn!("Failed to cache preferences: {}", e);
        }
    }

    async fn cached_or_defaults(&self) -> Preferences {
        match self.cache.load().await {
            Ok(Some(prefs)) => prefs,
            Ok(None) => Preferences::for_device(&self.device),
            Err(e) => {
                tracing::warn!("Ignoring unreadable preferences cache: {}", e);
                Preferences::for_device(&self.device)
            }
        }
    }
}
