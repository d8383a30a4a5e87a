//! Internal helpers shared by the hangout services.

use crate::domain::ports::{GeoProviderError, HangoutRepository, RepositoryError};
use crate::domain::{Error, Hangout, HangoutId, Participant, UserId};

pub(crate) fn map_repository_error(error: RepositoryError) -> Error {
    match error {
        RepositoryError::Connection { message } => {
            Error::service_unavailable(format!("hangout repository unavailable: {message}"))
        }
        RepositoryError::Query { message } => {
            Error::internal(format!("hangout repository error: {message}"))
        }
    }
}

pub(crate) fn map_provider_error(stage: &'static str, error: &GeoProviderError) -> Error {
    Error::external_service(format!("{stage} failed: {error}")).with_details(
        serde_json::json!({ "stage": stage, "transient": error.is_transient() }),
    )
}

pub(crate) async fn require_hangout(
    hangouts: &dyn HangoutRepository,
    hangout_id: HangoutId,
) -> Result<Hangout, Error> {
    hangouts
        .find(hangout_id)
        .await
        .map_err(map_repository_error)?
        .ok_or_else(|| Error::not_found(format!("hangout {hangout_id} not found")))
}

pub(crate) async fn require_participants(
    hangouts: &dyn HangoutRepository,
    hangout_id: HangoutId,
) -> Result<Vec<Participant>, Error> {
    hangouts
        .participants(hangout_id)
        .await
        .map_err(map_repository_error)
}

/// Find `user_id` among the accepted participants.
pub(crate) fn require_active<'a>(
    participants: &'a [Participant],
    user_id: &UserId,
) -> Result<&'a Participant, Error> {
    let participant = participants
        .iter()
        .find(|p| &p.user_id == user_id)
        .ok_or_else(|| Error::not_found(format!("user {user_id} is not part of this hangout")))?;
    if !participant.is_active() {
        return Err(Error::invalid_state(format!(
            "user {user_id} has not accepted the invitation"
        )));
    }
    Ok(participant)
}
