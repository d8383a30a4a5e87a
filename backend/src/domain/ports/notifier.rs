//! Driven port for delivering notifications.

use async_trait::async_trait;

use crate::domain::{Notification, NotificationBatch};

use super::define_port_error;

define_port_error! {
    /// Errors raised by notifier adapters.
    pub enum NotifierError {
        /// Delivery channel unavailable.
        Unavailable { message: String } =>
            "notifier unavailable: {message}",
        /// Delivery was attempted and failed.
        Delivery { message: String } =>
            "notification delivery failed: {message}",
    }
}

/// Port for notification delivery.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one notification.
    async fn notify(&self, notification: &Notification) -> Result<(), NotifierError>;

    /// Deliver every notification in the batch, stopping at the first failure.
    async fn notify_all(&self, batch: &NotificationBatch) -> Result<(), NotifierError> {
        for notification in batch.notifications() {
            self.notify(notification).await?;
        }
        Ok(())
    }
}
