//! Port for place recommendation persistence.

use async_trait::async_trait;

use crate::domain::{HangoutId, PlaceRanking, PlaceRecommendation, RankedVote, UserId, Venue};

use super::RepositoryError;

/// Port for recommendations and ranked place votes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecommendationRepository: Send + Sync {
    /// Atomically swap the hangout's recommendations for `venues`, dropping
    /// votes cast on the previous set.
    async fn replace(
        &self,
        hangout_id: HangoutId,
        venues: &[Venue],
    ) -> Result<Vec<PlaceRecommendation>, RepositoryError>;

    /// Recommendations ordered by id.
    async fn list(
        &self,
        hangout_id: HangoutId,
    ) -> Result<Vec<PlaceRecommendation>, RepositoryError>;

    /// Replace the user's ranking across the hangout's recommendations in one
    /// transaction, so ranks stay `1..=n` and unique per user.
    async fn replace_ranking(
        &self,
        hangout_id: HangoutId,
        user_id: &UserId,
        ranking: &PlaceRanking,
    ) -> Result<(), RepositoryError>;

    async fn ranking_votes(&self, hangout_id: HangoutId)
    -> Result<Vec<RankedVote>, RepositoryError>;
}
