//! Notifier that records notifications in the `notifications` table.
//!
//! Delivery to devices happens downstream of this table; storing the row is
//! the whole contract here.

use async_trait::async_trait;
use diesel_async::RunQueryDsl;
use tracing::debug;

use super::diesel_basic_error_mapping::map_diesel_error;
use super::models::NewNotificationRow;
use super::pool::DbPool;
use super::schema::notifications;
use crate::domain::ports::{Notifier, NotifierError, RepositoryError};
use crate::domain::{Notification, NotificationBatch};

/// Diesel-backed implementation of the `Notifier` port.
#[derive(Clone)]
pub struct DieselNotifier {
    pool: DbPool,
}

impl DieselNotifier {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn insert(&self, rows: &[NewNotificationRow<'_>]) -> Result<(), NotifierError> {
        if rows.is_empty() {
            return Ok(());
        }
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| NotifierError::unavailable(err.to_string()))?;
        diesel::insert_into(notifications::table)
            .values(rows)
            .execute(&mut conn)
            .await
            .map_err(|err| to_notifier_error(map_diesel_error(err)))?;
        debug!(count = rows.len(), "notifications stored");
        Ok(())
    }
}

fn to_notifier_error(error: RepositoryError) -> NotifierError {
    match error {
        RepositoryError::Connection { message } => NotifierError::unavailable(message),
        RepositoryError::Query { message } => NotifierError::delivery(message),
    }
}

fn to_row(notification: &Notification) -> NewNotificationRow<'_> {
    NewNotificationRow {
        recipient_id: *notification.recipient.as_uuid(),
        sender_id: notification.sender.as_ref().map(|sender| *sender.as_uuid()),
        hangout_id: notification.hangout_id.map(|id| id.get()),
        kind: notification.kind.as_str(),
        message: &notification.message,
    }
}

#[async_trait]
impl Notifier for DieselNotifier {
    async fn notify(&self, notification: &Notification) -> Result<(), NotifierError> {
        self.insert(&[to_row(notification)]).await
    }

    /// Stores the batch in a single insert, so either all rows land or none.
    async fn notify_all(&self, batch: &NotificationBatch) -> Result<(), NotifierError> {
        let rows: Vec<_> = batch.notifications().iter().map(to_row).collect();
        self.insert(&rows).await
    }
}
