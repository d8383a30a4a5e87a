//! Time poll creation and voting.

use serde::Serialize;
use tracing::{info, warn};

use crate::domain::ports::PollInsertOutcome;
use crate::domain::service_support::{
    map_repository_error, require_active, require_hangout, require_participants,
};
use crate::domain::{
    Ballot, Error, FlowStatus, Hangout, HangoutId, HangoutStatus, InviteStatus, NotificationKind,
    PhaseEngine, PollDraft, TimeOption, TimeOptionId, TimeWindow, UserId, Vote, resolve_winner,
};

/// Poll options with the votes cast so far.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PollSnapshot {
    pub options: Vec<TimeOption>,
    pub votes: Vec<Vote>,
    /// Option that would win if the poll closed now.
    pub leading: Option<TimeOptionId>,
}

/// Time poll service.
#[derive(Clone)]
pub struct PollService {
    engine: PhaseEngine,
}

impl PollService {
    pub fn new(engine: PhaseEngine) -> Self {
        Self { engine }
    }

    /// Store the creator's time options. A hangout has at most one poll.
    pub async fn create_poll(
        &self,
        hangout_id: HangoutId,
        user_id: &UserId,
        windows: Vec<TimeWindow>,
    ) -> Result<Vec<TimeOption>, Error> {
        let draft =
            PollDraft::new(hangout_id, windows).map_err(|err| Error::invalid_request(err.to_string()))?;

        let ports = self.engine.ports();
        let hangout = require_hangout(ports.hangouts.as_ref(), hangout_id).await?;
        if &hangout.creator != user_id {
            return Err(Error::invalid_request(
                "only the hangout creator can propose time options",
            ));
        }
        if !matches!(
            hangout.status,
            HangoutStatus::InvitesSent | HangoutStatus::FetchingAvailability
        ) {
            return Err(Error::invalid_state(format!(
                "time options cannot be proposed while hangout {hangout_id} is {}",
                hangout.status
            )));
        }

        let options = match ports
            .polls
            .create_options(&draft)
            .await
            .map_err(map_repository_error)?
        {
            PollInsertOutcome::Created(options) => options,
            PollInsertOutcome::AlreadyExists => {
                return Err(Error::invalid_state(format!(
                    "hangout {hangout_id} already has a poll"
                )));
            }
        };

        ports
            .hangouts
            .update_flow(hangout_id, user_id, FlowStatus::SubmittedTimeInput)
            .await
            .map_err(map_repository_error)?;
        info!(hangout_id = %hangout_id, options = options.len(), "poll created");

        self.announce(&hangout).await;
        Ok(options)
    }

    pub async fn get_poll(&self, hangout_id: HangoutId) -> Result<PollSnapshot, Error> {
        let ports = self.engine.ports();
        require_hangout(ports.hangouts.as_ref(), hangout_id).await?;
        let options = ports
            .polls
            .options(hangout_id)
            .await
            .map_err(map_repository_error)?;
        let votes = ports
            .polls
            .votes(hangout_id)
            .await
            .map_err(map_repository_error)?;
        let leading = if votes.is_empty() {
            None
        } else {
            resolve_winner(&options, &votes).map(|option| option.id)
        };
        Ok(PollSnapshot {
            options,
            votes,
            leading,
        })
    }

    /// Record votes for `option_ids`, then close the poll if everyone voted.
    ///
    /// A later ballot from the same participant replaces the earlier one.
    pub async fn cast_votes(
        &self,
        hangout_id: HangoutId,
        user_id: &UserId,
        option_ids: Vec<TimeOptionId>,
    ) -> Result<Hangout, Error> {
        let ballot = Ballot::new(option_ids).map_err(|err| Error::invalid_request(err.to_string()))?;

        let ports = self.engine.ports();
        let hangout = require_hangout(ports.hangouts.as_ref(), hangout_id).await?;
        match hangout.status {
            HangoutStatus::FetchingAvailability => {}
            HangoutStatus::InvitesSent => {
                return Err(Error::invalid_state(format!(
                    "hangout {hangout_id} is still waiting on invitations"
                )));
            }
            status => {
                return Err(Error::invalid_state(format!(
                    "the poll for hangout {hangout_id} has concluded ({status})"
                )));
            }
        }

        let participants = require_participants(ports.hangouts.as_ref(), hangout_id).await?;
        require_active(&participants, user_id)?;

        let options = ports
            .polls
            .options(hangout_id)
            .await
            .map_err(map_repository_error)?;
        if let Some(unknown) = ballot
            .options()
            .iter()
            .find(|id| !options.iter().any(|option| option.id == **id))
        {
            return Err(Error::not_found(format!(
                "time option {unknown} does not belong to hangout {hangout_id}"
            )));
        }

        ports
            .polls
            .replace_votes(hangout_id, user_id, &ballot)
            .await
            .map_err(map_repository_error)?;
        ports
            .hangouts
            .update_flow(hangout_id, user_id, FlowStatus::SubmittedTimeVote)
            .await
            .map_err(map_repository_error)?;
        info!(hangout_id = %hangout_id, user_id = %user_id, votes = ballot.options().len(), "votes cast");

        self.engine.evaluate(hangout_id).await?;
        require_hangout(ports.hangouts.as_ref(), hangout_id).await
    }

    async fn announce(&self, hangout: &Hangout) {
        let recipients = match require_participants(self.engine.ports().hangouts.as_ref(), hangout.id)
            .await
        {
            Ok(participants) => participants
                .into_iter()
                .filter(|p| p.invite != InviteStatus::Declined && p.user_id != hangout.creator)
                .map(|p| p.user_id)
                .collect(),
            Err(error) => {
                warn!(hangout_id = %hangout.id, %error, "could not load poll recipients");
                return;
            }
        };
        self.engine
            .deliver(
                hangout,
                Some(hangout.creator.clone()),
                recipients,
                NotificationKind::TimeVote,
                format!("Availability phase initiated for {}", hangout.title),
            )
            .await;
    }
}

#[cfg(test)]
#[path = "poll_service_tests.rs"]
mod tests;
