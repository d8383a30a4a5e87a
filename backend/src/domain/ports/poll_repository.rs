//! Port for time poll persistence.

use async_trait::async_trait;

use crate::domain::{Ballot, HangoutId, PollDraft, TimeOption, UserId, Vote};

use super::RepositoryError;

/// Outcome of an insert-if-absent poll creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollInsertOutcome {
    /// Options were stored with ids allocated in submission order.
    Created(Vec<TimeOption>),
    /// The hangout already has a poll; nothing was written.
    AlreadyExists,
}

/// Port for time options and votes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PollRepository: Send + Sync {
    async fn create_options(&self, draft: &PollDraft)
    -> Result<PollInsertOutcome, RepositoryError>;

    /// Options ordered by id.
    async fn options(&self, hangout_id: HangoutId) -> Result<Vec<TimeOption>, RepositoryError>;

    /// Replace the user's ballot for the hangout in one transaction. Options
    /// left out of `ballot` lose this user's vote.
    async fn replace_votes(
        &self,
        hangout_id: HangoutId,
        user_id: &UserId,
        ballot: &Ballot,
    ) -> Result<(), RepositoryError>;

    async fn votes(&self, hangout_id: HangoutId) -> Result<Vec<Vote>, RepositoryError>;
}
