//! Port for hangout and participant persistence.

use async_trait::async_trait;

use crate::domain::{
    FlowStatus, Hangout, HangoutDraft, HangoutId, InviteStatus, LocationDetails, Participant,
    StatusChange, UserId,
};

use super::RepositoryError;

/// Port for reading and mutating hangouts and their participants.
///
/// Mutations addressing a single participant return `false` when the
/// participant row does not exist.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HangoutRepository: Send + Sync {
    /// Insert the hangout, the creator as an accepted participant at
    /// `pending-time-input`, and every invitee as pending, in one transaction.
    async fn create(&self, draft: &HangoutDraft) -> Result<Hangout, RepositoryError>;

    async fn find(&self, hangout_id: HangoutId) -> Result<Option<Hangout>, RepositoryError>;

    async fn participants(
        &self,
        hangout_id: HangoutId,
    ) -> Result<Vec<Participant>, RepositoryError>;

    async fn record_invite_response(
        &self,
        hangout_id: HangoutId,
        user_id: &UserId,
        invite: InviteStatus,
        flow: FlowStatus,
    ) -> Result<bool, RepositoryError>;

    async fn update_flow(
        &self,
        hangout_id: HangoutId,
        user_id: &UserId,
        flow: FlowStatus,
    ) -> Result<bool, RepositoryError>;

    /// Store location details and move the participant to `flow`.
    async fn save_location(
        &self,
        hangout_id: HangoutId,
        user_id: &UserId,
        details: &LocationDetails,
        flow: FlowStatus,
    ) -> Result<bool, RepositoryError>;

    /// Move every accepted participant to `flow`.
    async fn set_active_flow(
        &self,
        hangout_id: HangoutId,
        flow: FlowStatus,
    ) -> Result<(), RepositoryError>;

    async fn remove_participant(
        &self,
        hangout_id: HangoutId,
        user_id: &UserId,
    ) -> Result<bool, RepositoryError>;

    /// Apply `change` only if the hangout is still in `change.from()`.
    ///
    /// Returns `true` for the single caller whose update matched.
    async fn transition(&self, change: &StatusChange) -> Result<bool, RepositoryError>;

    /// Delete the hangout and everything it owns.
    async fn delete(&self, hangout_id: HangoutId) -> Result<bool, RepositoryError>;
}
