//! Wishes resource
//!
//! Visitors submit wishes; the admin panel lists them, toggles the read
//! flag and deletes them.

use super::resource::{LoadOutcome, ReadFallback, Resource, ResourceState, SyncPolicy, WriteFailure};
use crate::database::{NewWish, Wish};
use crate::error::Result;
use crate::remote::RemoteDataClient;
use crate::validation::validate_message_form;
use tokio::sync::watch;

pub struct WishResource {
    client: RemoteDataClient,
    resource: Resource<Vec<Wish>>,
    policy: SyncPolicy,
}

impl WishResource {
    pub fn new(client: RemoteDataClient) -> Self {
        Self::with_policy(client, SyncPolicy::strict())
    }

    pub fn with_policy(client: RemoteDataClient, policy: SyncPolicy) -> Self {
        Self {
            client,
            resource: Resource::new("wishes", Vec::new()),
            policy,
        }
    }

    pub fn state(&self) -> ResourceState<Vec<Wish>> {
        self.resource.snapshot()
    }

    pub fn wishes(&self) -> Vec<Wish> {
        self.resource.data()
    }

    pub fn subscribe(&self) -> watch::Receiver<ResourceState<Vec<Wish>>> {
        self.resource.subscribe()
    }

    pub fn unread_count(&self) -> usize {
        self.resource.data().iter().filter(|w| !w.is_read).count()
    }

    pub async fn load(&self) -> LoadOutcome {
        let ticket = self.resource.begin_load();

        match self.client.fetch_wishes().await {
            Ok(wishes) => {
                tracing::debug!("Loaded {} wishes", wishes.len());
                self.resource.commit(ticket, wishes, None)
            }
            Err(e) => {
                tracing::warn!("Failed to load wishes: {}", e);
                // No synthetic wishes, ever; the degraded copy is the last list shown
                let wishes = match self.policy.on_read_failure {
                    ReadFallback::Degraded => self.resource.data(),
                    ReadFallback::Empty => Vec::new(),
                };
                self.resource
                    .commit(ticket, wishes, Some(format!("Failed to load wishes: {}", e)))
            }
        }
    }

    pub async fn refetch(&self) -> LoadOutcome {
        self.load().await
    }

    pub fn cancel(&self) {
        self.resource.cancel();
    }

    /// Public submission. Validation failures never reach the backend.
    pub async fn submit(&self, name: &str, email: &str, message: &str) -> Result<Option<Wish>> {
        validate_message_form(name, email, message)?;

        let wish = NewWish {
            name: name.trim().to_string(),
            email: email.trim().to_string(),
            message: message.trim().to_string(),
        };

        let created = self.client.add_wish(&wish).await.map_err(|e| {
            self.resource.set_error(format!("Failed to send wish: {}", e));
            e
        })?;

        if let Some(created) = &created {
            tracing::info!("Wish submitted: {}", created.id);
            let created = created.clone();
            self.resource.update(|wishes| wishes.insert(0, created));
        }

        Ok(created)
    }

    pub async fn mark_read(&self, id: &str, is_read: bool) -> Result<()> {
        match self.client.set_wish_read(id, is_read).await {
            Ok(Some(updated)) => {
                self.resource.update(|wishes| {
                    if let Some(existing) = wishes.iter_mut().find(|w| w.id == updated.id) {
                        *existing = updated;
                    }
                });
                Ok(())
            }
            Ok(None) => Ok(()),
            Err(e) => self.write_failed(e, |wishes| {
                if let Some(existing) = wishes.iter_mut().find(|w| w.id == id) {
                    existing.is_read = is_read;
                }
            }),
        }
    }

    pub async fn remove(&self, id: &str) -> Result<()> {
        match self.client.delete_wish(id).await {
            Ok(true) => {
                self.resource.update(|wishes| wishes.retain(|w| w.id != id));
                Ok(())
            }
            Ok(false) => Ok(()),
            Err(e) => self.write_failed(e, |wishes| wishes.retain(|w| w.id != id)),
        }
    }

    fn write_failed(
        &self,
        error: crate::error::AppError,
        apply_locally: impl FnOnce(&mut Vec<Wish>),
    ) -> Result<()> {
        match self.policy.on_write_failure {
            WriteFailure::ApplyLocally => {
                tracing::warn!("Wish update failed remotely, applied locally: {}", error);
                self.resource.update(apply_locally);
                Ok(())
            }
            WriteFailure::Surface => {
                self.resource.set_error(format!("Wish update failed: {}", error));
                Err(error)
            }
        }
    }
}
