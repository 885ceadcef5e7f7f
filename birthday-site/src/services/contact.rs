//! Contact form inbox

use crate::error::Result;
use crate::validation::validate_message_form;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
    pub id: String,
    pub name: String,
    pub email: String,
    pub message: String,
    pub received_at: DateTime<Utc>,
}

#[async_trait]
pub trait ContactInbox: Send + Sync {
    /// Validate and store a message
    async fn submit(&self, name: &str, email: &str, message: &str) -> Result<ContactMessage>;
    async fn messages(&self) -> Result<Vec<ContactMessage>>;
}

#[derive(Default)]
pub struct InMemoryInbox {
    messages: RwLock<Vec<ContactMessage>>,
}

impl InMemoryInbox {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContactInbox for InMemoryInbox {
    async fn submit(&self, name: &str, email: &str, message: &str) -> Result<ContactMessage> {
        validate_message_form(name, email, message)?;

        let entry = ContactMessage {
            id: Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            email: email.trim().to_string(),
            message: message.trim().to_string(),
            received_at: Utc::now(),
        };

        self.messages.write().await.push(entry.clone());
        tracing::info!("Contact message received: {}", entry.id);

        Ok(entry)
    }

    async fn messages(&self) -> Result<Vec<ContactMessage>> {
        Ok(self.messages.read().await.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    #[tokio::test]
    async fn test_submit_stores_trimmed_message() {
        let inbox = InMemoryInbox::new();

        let stored = inbox
            .submit("Sam", " sam@example.com ", "See you at the party")
            .await
            .unwrap();

        assert_eq!(stored.email, "sam@example.com");
        assert_eq!(inbox.messages().await.unwrap(), vec![stored]);
    }

    #[tokio::test]
    async fn test_invalid_message_not_stored() {
        let inbox = InMemoryInbox::new();

        let missing = inbox.submit("Sam", "sam@example.com", "  ").await;
        let bad_email = inbox.submit("Sam", "sam@example", "Hi").await;

        assert!(matches!(missing, Err(AppError::Validation(_))));
        assert!(matches!(bad_email, Err(AppError::Validation(_))));
        assert!(inbox.messages().await.unwrap().is_empty());
    }
}
