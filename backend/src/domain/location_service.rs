//! Location details, place ranking, and final meetup confirmation.

use tracing::info;

use crate::domain::service_support::{
    map_repository_error, require_active, require_hangout, require_participants,
};
use crate::domain::{
    Error, FlowStatus, Hangout, HangoutId, HangoutStatus, LocationDetails, PhaseEngine,
    PlaceRanking, PlaceRecommendation, RecommendationId, UserId,
};

/// Location and meetup confirmation service.
#[derive(Clone)]
pub struct LocationService {
    engine: PhaseEngine,
}

impl LocationService {
    pub fn new(engine: PhaseEngine) -> Self {
        Self { engine }
    }

    /// Confirm the chosen time and submit travel constraints.
    ///
    /// The last active participant to confirm triggers the recommendation
    /// run. Its failures are returned to that caller and the hangout stays in
    /// `determining-location` until [`Self::rerun_recommendations`] succeeds.
    pub async fn confirm_time(
        &self,
        hangout_id: HangoutId,
        user_id: &UserId,
        details: LocationDetails,
    ) -> Result<Hangout, Error> {
        let details = LocationDetails::new(
            details.address,
            details.transport.as_str(),
            details.travel_minutes,
        )
        .map_err(|err| Error::invalid_request(err.to_string()))?;

        let hangouts = self.engine.ports().hangouts.as_ref();
        let hangout = require_hangout(hangouts, hangout_id).await?;
        expect_status(&hangout, HangoutStatus::ConfirmTime)?;
        let participants = require_participants(hangouts, hangout_id).await?;
        require_active(&participants, user_id)?;

        hangouts
            .save_location(hangout_id, user_id, &details, FlowStatus::SubmittedConfirmTime)
            .await
            .map_err(map_repository_error)?;
        info!(
            hangout_id = %hangout_id,
            user_id = %user_id,
            transport = %details.transport,
            minutes = details.travel_minutes,
            "time confirmed"
        );

        self.engine.evaluate(hangout_id).await?;
        require_hangout(hangouts, hangout_id).await
    }

    /// Retry the recommendation run for a hangout stuck in
    /// `determining-location`.
    pub async fn rerun_recommendations(
        &self,
        hangout_id: HangoutId,
    ) -> Result<Vec<PlaceRecommendation>, Error> {
        let hangout = require_hangout(self.engine.ports().hangouts.as_ref(), hangout_id).await?;
        self.engine.open_place_voting(&hangout).await
    }

    pub async fn get_recommendations(
        &self,
        hangout_id: HangoutId,
    ) -> Result<Vec<PlaceRecommendation>, Error> {
        let ports = self.engine.ports();
        require_hangout(ports.hangouts.as_ref(), hangout_id).await?;
        ports
            .recommendations
            .list(hangout_id)
            .await
            .map_err(map_repository_error)
    }

    /// Store a participant's ranking of the recommended places, replacing any
    /// ranking they submitted before.
    pub async fn submit_place_ranking(
        &self,
        hangout_id: HangoutId,
        user_id: &UserId,
        entries: Vec<(RecommendationId, u32)>,
    ) -> Result<Hangout, Error> {
        let ranking = PlaceRanking::new(entries).map_err(|err| Error::invalid_request(err.to_string()))?;

        let ports = self.engine.ports();
        let hangout = require_hangout(ports.hangouts.as_ref(), hangout_id).await?;
        expect_status(&hangout, HangoutStatus::DeterminingLocation)?;
        let participants = require_participants(ports.hangouts.as_ref(), hangout_id).await?;
        let participant = require_active(&participants, user_id)?;
        if !matches!(
            participant.flow,
            FlowStatus::PendingLocationVote | FlowStatus::SubmittedLocationVote
        ) {
            return Err(Error::invalid_state(format!(
                "place voting for hangout {hangout_id} has not opened"
            )));
        }

        let recommendations = ports
            .recommendations
            .list(hangout_id)
            .await
            .map_err(map_repository_error)?;
        if let Some(unknown) = ranking
            .places()
            .find(|id| !recommendations.iter().any(|r| r.id == *id))
        {
            return Err(Error::not_found(format!(
                "place {unknown} is not recommended for hangout {hangout_id}"
            )));
        }

        ports
            .recommendations
            .replace_ranking(hangout_id, user_id, &ranking)
            .await
            .map_err(map_repository_error)?;
        ports
            .hangouts
            .update_flow(hangout_id, user_id, FlowStatus::SubmittedLocationVote)
            .await
            .map_err(map_repository_error)?;
        info!(hangout_id = %hangout_id, user_id = %user_id, ranked = ranking.entries().len(), "places ranked");

        self.engine.evaluate(hangout_id).await?;
        require_hangout(ports.hangouts.as_ref(), hangout_id).await
    }

    /// Accept the chosen meetup, or decline and leave the hangout.
    pub async fn confirm_meetup(
        &self,
        hangout_id: HangoutId,
        user_id: &UserId,
        accept: bool,
    ) -> Result<Hangout, Error> {
        let hangouts = self.engine.ports().hangouts.as_ref();
        let hangout = require_hangout(hangouts, hangout_id).await?;
        expect_status(&hangout, HangoutStatus::ConfirmMeetup)?;
        let participants = require_participants(hangouts, hangout_id).await?;
        require_active(&participants, user_id)?;

        if accept {
            hangouts
                .update_flow(hangout_id, user_id, FlowStatus::SubmittedConfirmLocation)
                .await
                .map_err(map_repository_error)?;
        } else {
            if &hangout.creator == user_id {
                return Err(Error::invalid_request(
                    "the creator cannot decline the meetup; cancel the hangout instead",
                ));
            }
            hangouts
                .remove_participant(hangout_id, user_id)
                .await
                .map_err(map_repository_error)?;
        }
        info!(hangout_id = %hangout_id, user_id = %user_id, accept, "meetup answered");

        self.engine.evaluate(hangout_id).await?;
        require_hangout(hangouts, hangout_id).await
    }
}

fn expect_status(hangout: &Hangout, expected: HangoutStatus) -> Result<(), Error> {
    if hangout.status == expected {
        return Ok(());
    }
    Err(Error::invalid_state(format!(
        "hangout {} is {}, expected {expected}",
        hangout.id, hangout.status
    )))
}

#[cfg(test)]
#[path = "location_service_tests.rs"]
mod tests;
