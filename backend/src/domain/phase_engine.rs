//! Gate evaluation and phase advancement for hangouts.
//!
//! Every service that changes participant state calls
//! [`PhaseEngine::evaluate`] after its own write. The engine reloads the
//! hangout, checks the gate guarding the current status, and applies the
//! transition as a conditional update. Follow-on work (scheduling, the
//! recommendation run, notifications) runs only for the caller whose update
//! matched, so concurrent last submissions never fire a phase twice.

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::flow_tracker::{
    active_ids, has_everyone_reached, has_everyone_voted, invites_settled, only_creator_remains,
};
use crate::domain::ports::{
    HangoutRepository, Notifier, PollRepository, RecommendationRepository,
};
use crate::domain::service_support::{map_repository_error, require_hangout, require_participants};
use crate::domain::{
    Error, FlowStatus, Hangout, HangoutId, HangoutStatus, NotificationBatch, NotificationKind,
    Participant, PlaceRecommendation, RecommendationService, StatusChange, UserId,
    distinct_voters, resolve_place, resolve_winner,
};

/// Storage and delivery collaborators shared by the hangout services.
#[derive(Clone)]
pub struct HangoutPorts {
    pub hangouts: Arc<dyn HangoutRepository>,
    pub polls: Arc<dyn PollRepository>,
    pub recommendations: Arc<dyn RecommendationRepository>,
    pub notifier: Arc<dyn Notifier>,
}

/// Applies phase gates and the work that follows each transition.
#[derive(Clone)]
pub struct PhaseEngine {
    ports: HangoutPorts,
    recommender: RecommendationService,
}

impl PhaseEngine {
    pub fn new(ports: HangoutPorts, recommender: RecommendationService) -> Self {
        Self { ports, recommender }
    }

    pub fn ports(&self) -> &HangoutPorts {
        &self.ports
    }

    /// Re-check the gate for the hangout's current status.
    ///
    /// Returns the new status when this call advanced the hangout.
    pub async fn evaluate(&self, hangout_id: HangoutId) -> Result<Option<HangoutStatus>, Error> {
        let hangout = require_hangout(self.ports.hangouts.as_ref(), hangout_id).await?;
        if hangout.status.is_terminal() {
            return Ok(None);
        }
        let participants = require_participants(self.ports.hangouts.as_ref(), hangout_id).await?;

        if hangout.status == HangoutStatus::InvitesSent {
            if !invites_settled(&participants) {
                return Ok(None);
            }
            if only_creator_remains(&participants, &hangout.creator) {
                return self.decline(&hangout, &participants).await;
            }
            return self.open_poll(&hangout).await;
        }

        if only_creator_remains(&participants, &hangout.creator) {
            return self.decline(&hangout, &participants).await;
        }

        match hangout.status {
            HangoutStatus::FetchingAvailability => self.close_poll(&hangout, &participants).await,
            HangoutStatus::ConfirmTime => {
                if !has_everyone_reached(&participants, FlowStatus::SubmittedConfirmTime) {
                    return Ok(None);
                }
                self.begin_location_search(&hangout).await
            }
            HangoutStatus::DeterminingLocation => {
                if !has_everyone_reached(&participants, FlowStatus::SubmittedLocationVote) {
                    return Ok(None);
                }
                self.choose_place(&hangout, &participants).await
            }
            HangoutStatus::ConfirmMeetup => {
                if !has_everyone_reached(&participants, FlowStatus::SubmittedConfirmLocation) {
                    return Ok(None);
                }
                self.confirm(&hangout).await
            }
            HangoutStatus::InvitesSent | HangoutStatus::Confirmed | HangoutStatus::Declined => {
                Ok(None)
            }
        }
    }

    /// Run the recommendation pipeline and open place voting.
    pub async fn open_place_voting(
        &self,
        hangout: &Hangout,
    ) -> Result<Vec<PlaceRecommendation>, Error> {
        let recommendations = self.recommender.recommend(hangout.id).await?;
        self.ports
            .hangouts
            .set_active_flow(hangout.id, FlowStatus::PendingLocationVote)
            .await
            .map_err(map_repository_error)?;
        self.notify_active(
            hangout,
            NotificationKind::SelectPlaces,
            format!("Pick your location soon for {}", hangout.title),
        )
        .await;
        Ok(recommendations)
    }

    /// Deliver `message` to every accepted participant. Failures are logged and
    /// never returned.
    pub async fn notify_active(&self, hangout: &Hangout, kind: NotificationKind, message: String) {
        match require_participants(self.ports.hangouts.as_ref(), hangout.id).await {
            Ok(participants) => {
                self.deliver(hangout, None, active_ids(&participants), kind, message)
                    .await;
            }
            Err(error) => {
                warn!(hangout_id = %hangout.id, %error, "could not load notification recipients");
            }
        }
    }

    pub async fn deliver(
        &self,
        hangout: &Hangout,
        sender: Option<UserId>,
        recipients: Vec<UserId>,
        kind: NotificationKind,
        message: String,
    ) {
        let batch = match NotificationBatch::new(sender, recipients, message, kind, Some(hangout.id))
        {
            Ok(batch) => batch,
            Err(error) => {
                warn!(hangout_id = %hangout.id, %error, "notification batch rejected");
                return;
            }
        };
        if batch.is_empty() {
            return;
        }
        if let Err(error) = self.ports.notifier.notify_all(&batch).await {
            warn!(
                hangout_id = %hangout.id,
                kind = kind.as_str(),
                %error,
                "notification delivery failed after transition"
            );
        }
    }

    async fn apply(&self, change: &StatusChange) -> Result<bool, Error> {
        let applied = self
            .ports
            .hangouts
            .transition(change)
            .await
            .map_err(map_repository_error)?;
        if applied {
            info!(
                hangout_id = %change.hangout_id(),
                from = %change.from(),
                to = %change.to(),
                "hangout advanced"
            );
        }
        Ok(applied)
    }

    fn change(hangout: &Hangout, to: HangoutStatus) -> Result<StatusChange, Error> {
        StatusChange::new(hangout.id, hangout.status, to)
            .map_err(|err| Error::internal(err.to_string()))
    }

    async fn decline(
        &self,
        hangout: &Hangout,
        participants: &[Participant],
    ) -> Result<Option<HangoutStatus>, Error> {
        if !self.apply(&Self::change(hangout, HangoutStatus::Declined)?).await? {
            return Ok(None);
        }
        self.deliver(
            hangout,
            None,
            active_ids(participants),
            NotificationKind::HangoutDeclined,
            format!("{} has been called off", hangout.title),
        )
        .await;
        Ok(Some(HangoutStatus::Declined))
    }

    async fn open_poll(&self, hangout: &Hangout) -> Result<Option<HangoutStatus>, Error> {
        let next = HangoutStatus::FetchingAvailability;
        if !self.apply(&Self::change(hangout, next)?).await? {
            return Ok(None);
        }
        Ok(Some(next))
    }

    async fn close_poll(
        &self,
        hangout: &Hangout,
        participants: &[Participant],
    ) -> Result<Option<HangoutStatus>, Error> {
        let active = active_ids(participants);
        let votes: Vec<_> = self
            .ports
            .polls
            .votes(hangout.id)
            .await
            .map_err(map_repository_error)?
            .into_iter()
            .filter(|vote| active.contains(&vote.user_id))
            .collect();
        if !has_everyone_voted(participants, distinct_voters(&votes)) {
            return Ok(None);
        }

        let options = self
            .ports
            .polls
            .options(hangout.id)
            .await
            .map_err(map_repository_error)?;
        let winner = resolve_winner(&options, &votes).ok_or_else(|| {
            Error::internal(format!("hangout {} has votes but no options", hangout.id))
        })?;

        let next = HangoutStatus::ConfirmTime;
        let change = Self::change(hangout, next)?.with_schedule(winner.window);
        if !self.apply(&change).await? {
            return Ok(None);
        }

        self.ports
            .hangouts
            .set_active_flow(hangout.id, FlowStatus::PendingConfirmTime)
            .await
            .map_err(map_repository_error)?;
        let window = winner.window;
        self.notify_active(
            hangout,
            NotificationKind::ConfirmTime,
            format!(
                "Meetup time has been chosen and set for {} at {} on {}",
                hangout.title,
                window.start().format("%H:%M"),
                window.date().format("%Y-%m-%d")
            ),
        )
        .await;
        Ok(Some(next))
    }

    async fn begin_location_search(
        &self,
        hangout: &Hangout,
    ) -> Result<Option<HangoutStatus>, Error> {
        let next = HangoutStatus::DeterminingLocation;
        if !self.apply(&Self::change(hangout, next)?).await? {
            return Ok(None);
        }
        let advanced = Hangout {
            status: next,
            ..hangout.clone()
        };
        self.open_place_voting(&advanced).await?;
        Ok(Some(next))
    }

    async fn choose_place(
        &self,
        hangout: &Hangout,
        participants: &[Participant],
    ) -> Result<Option<HangoutStatus>, Error> {
        let recommendations = self
            .ports
            .recommendations
            .list(hangout.id)
            .await
            .map_err(map_repository_error)?;
        // Rankings from participants who have since left no longer count.
        let active = active_ids(participants);
        let votes: Vec<_> = self
            .ports
            .recommendations
            .ranking_votes(hangout.id)
            .await
            .map_err(map_repository_error)?
            .into_iter()
            .filter(|vote| active.contains(&vote.user_id))
            .collect();
        let candidates: Vec<_> = recommendations.iter().map(|r| r.id).collect();
        let place_id = resolve_place(&candidates, &votes).ok_or_else(|| {
            Error::internal(format!("hangout {} has no recommendations to choose from", hangout.id))
        })?;

        let next = HangoutStatus::ConfirmMeetup;
        let change = Self::change(hangout, next)?.with_chosen_place(place_id);
        if !self.apply(&change).await? {
            return Ok(None);
        }

        self.ports
            .hangouts
            .set_active_flow(hangout.id, FlowStatus::PendingConfirmLocation)
            .await
            .map_err(map_repository_error)?;
        let place_name = recommendations
            .iter()
            .find(|r| r.id == place_id)
            .map_or("the chosen place", |r| r.name.as_str());
        self.notify_active(
            hangout,
            NotificationKind::ConfirmMeetup,
            format!("Confirm the meetup for {} at {place_name}", hangout.title),
        )
        .await;
        Ok(Some(next))
    }

    async fn confirm(&self, hangout: &Hangout) -> Result<Option<HangoutStatus>, Error> {
        let next = HangoutStatus::Confirmed;
        if !self.apply(&Self::change(hangout, next)?).await? {
            return Ok(None);
        }
        self.notify_active(
            hangout,
            NotificationKind::MeetupConfirmed,
            format!("{} is confirmed", hangout.title),
        )
        .await;
        Ok(Some(next))
    }
}
