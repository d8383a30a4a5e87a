//! Notification messages emitted on hangout milestones.

use serde::Serialize;

use super::{HangoutId, UserId};

/// Category stored alongside each notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NotificationKind {
    HangoutInvite,
    TimeVote,
    ConfirmTime,
    SelectPlaces,
    ConfirmMeetup,
    MeetupConfirmed,
    HangoutDeclined,
}

impl NotificationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::HangoutInvite => "hangout-invite",
            Self::TimeVote => "time-vote",
            Self::ConfirmTime => "confirm-time",
            Self::SelectPlaces => "select-places",
            Self::ConfirmMeetup => "confirm-meetup",
            Self::MeetupConfirmed => "meetup-confirmed",
            Self::HangoutDeclined => "hangout-declined",
        }
    }
}

/// A single message to one recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub recipient: UserId,
    pub sender: Option<UserId>,
    pub message: String,
    pub kind: NotificationKind,
    pub hangout_id: Option<HangoutId>,
}

/// Rejected notification batch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotificationBatchError {
    #[error("sender {0} cannot be among the recipients")]
    SenderIsRecipient(UserId),
    #[error("notification message must not be empty")]
    EmptyMessage,
}

/// The same message fanned out to several recipients.
///
/// # Examples
///
/// ```rust
/// use backend::domain::{HangoutId, NotificationBatch, NotificationKind, UserId};
///
/// let host = UserId::random();
/// let guest = UserId::random();
/// let batch = NotificationBatch::new(
///     Some(host.clone()),
///     vec![guest],
///     "Ada has invited you to a hangout",
///     NotificationKind::HangoutInvite,
///     Some(HangoutId::new(3)),
/// )?;
/// assert_eq!(batch.notifications().len(), 1);
/// assert!(NotificationBatch::new(
///     Some(host.clone()),
///     vec![host],
///     "hi",
///     NotificationKind::HangoutInvite,
///     None,
/// )
/// .is_err());
/// Ok::<(), backend::domain::NotificationBatchError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationBatch {
    notifications: Vec<Notification>,
}

impl NotificationBatch {
    pub fn new(
        sender: Option<UserId>,
        recipients: Vec<UserId>,
        message: impl Into<String>,
        kind: NotificationKind,
        hangout_id: Option<HangoutId>,
    ) -> Result<Self, NotificationBatchError> {
        let message = message.into();
        if message.trim().is_empty() {
            return Err(NotificationBatchError::EmptyMessage);
        }
        if let Some(sender) = sender.as_ref().filter(|s| recipients.contains(s)) {
            return Err(NotificationBatchError::SenderIsRecipient(sender.clone()));
        }

        let notifications = recipients
            .into_iter()
            .map(|recipient| Notification {
                recipient,
                sender: sender.clone(),
                message: message.clone(),
                kind,
                hangout_id,
            })
            .collect();
        Ok(Self { notifications })
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn is_empty(&self) -> bool {
        self.notifications.is_empty()
    }
}
