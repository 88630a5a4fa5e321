use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use walk_model::{Participant, ParticipantId};

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Notification transport failed: {0}")]
    Transport(String),

    #[error("Notification rejected with status {0}")]
    Rejected(u16),
}

/// Message delivered to a single participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub recipient: ParticipantId,
    pub recipient_name: String,
    pub phone: String,
    pub message: String,
}

impl Notification {
    pub fn to(recipient: &Participant, message: impl Into<String>) -> Self {
        Self {
            recipient: recipient.id,
            recipient_name: recipient.name.clone(),
            phone: recipient.contact.phone.clone(),
            message: message.into(),
        }
    }
}

/// Best-effort outbound message sink.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError>;
}

/// Send on a detached task. Delivery failures are logged and dropped.
pub fn spawn_notification(
    notifier: Arc<dyn Notifier>,
    notification: Notification,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        match notifier.send(&notification).await {
            Ok(()) => debug!(recipient = %notification.recipient, "notification delivered"),
            Err(err) => warn!(
                recipient = %notification.recipient,
                error = %err,
                "failed to deliver notification"
            ),
        }
    })
}
