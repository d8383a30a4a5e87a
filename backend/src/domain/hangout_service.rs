//! Hangout creation, invitations, membership, and cancellation.

use tracing::info;

use crate::domain::service_support::{
    map_repository_error, require_hangout, require_participants,
};
use crate::domain::{
    Error, FlowStatus, Hangout, HangoutDraft, HangoutId, HangoutStatus, InviteStatus,
    NotificationKind, Participant, PhaseEngine, UserId,
};

/// Invite response submitted by a participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InviteResponse {
    Accept,
    Decline,
}

/// Hangout lifecycle service.
#[derive(Clone)]
pub struct HangoutService {
    engine: PhaseEngine,
}

impl HangoutService {
    pub fn new(engine: PhaseEngine) -> Self {
        Self { engine }
    }

    /// Create a hangout and invite everyone in `invitees`.
    pub async fn create_hangout(
        &self,
        creator: UserId,
        creator_name: &str,
        title: &str,
        invitees: Vec<UserId>,
    ) -> Result<Hangout, Error> {
        let draft = HangoutDraft::new(creator, creator_name, title, invitees)
            .map_err(|err| Error::invalid_request(err.to_string()))?;

        let hangout = self
            .engine
            .ports()
            .hangouts
            .create(&draft)
            .await
            .map_err(map_repository_error)?;
        info!(
            hangout_id = %hangout.id,
            user_id = %hangout.creator,
            invitees = draft.invitees().len(),
            "hangout created"
        );

        self.engine
            .deliver(
                &hangout,
                Some(draft.creator().clone()),
                draft.invitees().to_vec(),
                NotificationKind::HangoutInvite,
                format!("{} has invited you to a hangout", draft.creator_name()),
            )
            .await;
        Ok(hangout)
    }

    /// Accept or decline an invitation, then re-check the invitation gate.
    pub async fn respond_to_invite(
        &self,
        hangout_id: HangoutId,
        user_id: &UserId,
        response: InviteResponse,
    ) -> Result<Hangout, Error> {
        let hangouts = self.engine.ports().hangouts.as_ref();
        let hangout = require_hangout(hangouts, hangout_id).await?;
        if hangout.status != HangoutStatus::InvitesSent {
            return Err(Error::invalid_state(format!(
                "invitations for hangout {hangout_id} are closed ({})",
                hangout.status
            )));
        }

        let participants = require_participants(hangouts, hangout_id).await?;
        let participant = participants
            .iter()
            .find(|p| &p.user_id == user_id)
            .ok_or_else(|| Error::not_found(format!("user {user_id} was not invited")))?;
        if participant.invite != InviteStatus::Pending {
            return Err(Error::invalid_state(format!(
                "user {user_id} already answered with {}",
                participant.invite.as_str()
            )));
        }

        let (invite, flow) = match response {
            InviteResponse::Accept => (InviteStatus::Accepted, FlowStatus::PendingTimeVote),
            InviteResponse::Decline => (InviteStatus::Declined, participant.flow),
        };
        let updated = hangouts
            .record_invite_response(hangout_id, user_id, invite, flow)
            .await
            .map_err(map_repository_error)?;
        if !updated {
            return Err(Error::not_found(format!("user {user_id} was not invited")));
        }
        info!(hangout_id = %hangout_id, user_id = %user_id, invite = invite.as_str(), "invite answered");

        self.engine.evaluate(hangout_id).await?;
        require_hangout(hangouts, hangout_id).await
    }

    /// Remove a participant and re-check the gate of the current phase.
    ///
    /// The creator cannot leave; they cancel the hangout instead.
    pub async fn leave_hangout(
        &self,
        hangout_id: HangoutId,
        user_id: &UserId,
    ) -> Result<Hangout, Error> {
        let hangouts = self.engine.ports().hangouts.as_ref();
        let hangout = require_hangout(hangouts, hangout_id).await?;
        if &hangout.creator == user_id {
            return Err(Error::invalid_request(
                "the creator cannot leave a hangout; cancel it instead",
            ));
        }
        if hangout.status.is_terminal() {
            return Err(Error::invalid_state(format!(
                "hangout {hangout_id} is already {}",
                hangout.status
            )));
        }

        let removed = hangouts
            .remove_participant(hangout_id, user_id)
            .await
            .map_err(map_repository_error)?;
        if !removed {
            return Err(Error::not_found(format!(
                "user {user_id} is not part of hangout {hangout_id}"
            )));
        }
        info!(hangout_id = %hangout_id, user_id = %user_id, "participant left");

        self.engine.evaluate(hangout_id).await?;
        require_hangout(hangouts, hangout_id).await
    }

    /// Delete the hangout and everything it owns.
    pub async fn cancel_hangout(&self, hangout_id: HangoutId) -> Result<(), Error> {
        let deleted = self
            .engine
            .ports()
            .hangouts
            .delete(hangout_id)
            .await
            .map_err(map_repository_error)?;
        if !deleted {
            return Err(Error::not_found(format!("hangout {hangout_id} not found")));
        }
        info!(hangout_id = %hangout_id, "hangout cancelled");
        Ok(())
    }

    pub async fn get_hangout(&self, hangout_id: HangoutId) -> Result<Hangout, Error> {
        require_hangout(self.engine.ports().hangouts.as_ref(), hangout_id).await
    }

    pub async fn list_participants(&self, hangout_id: HangoutId) -> Result<Vec<Participant>, Error> {
        let hangouts = self.engine.ports().hangouts.as_ref();
        require_hangout(hangouts, hangout_id).await?;
        require_participants(hangouts, hangout_id).await
    }
}

#[cfg(test)]
#[path = "hangout_service_tests.rs"]
mod tests;
