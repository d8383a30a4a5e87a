//! In-memory storage and notifier for service tests.
//!
//! One mutex guards every table, so each port call is atomic in the same way a
//! single database transaction would be.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::domain::ports::{
    HangoutRepository, Notifier, NotifierError, PollInsertOutcome, PollRepository,
    RecommendationRepository, RepositoryError,
};
use crate::domain::{
    Ballot, FlowStatus, Hangout, HangoutDraft, HangoutId, HangoutStatus, InviteStatus,
    LocationDetails, Notification, Participant, PlaceRanking, PlaceRecommendation, PollDraft,
    RankedVote, RecommendationId, StatusChange, TimeOption, TimeOptionId, UserId, Venue, Vote,
};

#[derive(Default)]
struct Tables {
    next_id: i64,
    hangouts: BTreeMap<HangoutId, Hangout>,
    participants: Vec<Participant>,
    options: Vec<TimeOption>,
    votes: BTreeSet<(UserId, TimeOptionId)>,
    recommendations: Vec<PlaceRecommendation>,
    rankings: BTreeMap<(UserId, RecommendationId), u32>,
    notifications: Vec<Notification>,
}

impl Tables {
    fn allocate(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn participant_mut(&mut self, hangout_id: HangoutId, user_id: &UserId) -> Option<&mut Participant> {
        self.participants
            .iter_mut()
            .find(|p| p.hangout_id == hangout_id && &p.user_id == user_id)
    }

    fn option_ids(&self, hangout_id: HangoutId) -> BTreeSet<TimeOptionId> {
        self.options
            .iter()
            .filter(|o| o.hangout_id == hangout_id)
            .map(|o| o.id)
            .collect()
    }

    fn recommendation_ids(&self, hangout_id: HangoutId) -> BTreeSet<RecommendationId> {
        self.recommendations
            .iter()
            .filter(|r| r.hangout_id == hangout_id)
            .map(|r| r.id)
            .collect()
    }

    fn drop_recommendations(&mut self, hangout_id: HangoutId) {
        let stale = self.recommendation_ids(hangout_id);
        self.rankings.retain(|(_, id), _| !stale.contains(id));
        self.recommendations.retain(|r| r.hangout_id != hangout_id);
    }
}

/// In-memory implementation of every storage port plus the notifier.
#[derive(Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
    fail_notifications: AtomicBool,
}

impl InMemoryStore {
    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert a hangout and its participants directly, bypassing services.
    pub fn seed(&self, creator: &UserId, title: &str, status: HangoutStatus) -> HangoutId {
        let mut tables = self.tables();
        let id = HangoutId::new(tables.allocate());
        tables.hangouts.insert(
            id,
            Hangout {
                id,
                creator: creator.clone(),
                title: title.to_owned(),
                status,
                schedule: None,
                chosen_place: None,
            },
        );
        id
    }

    /// Add a participant row directly.
    pub fn seed_participant(
        &self,
        hangout_id: HangoutId,
        user_id: &UserId,
        invite: InviteStatus,
        flow: FlowStatus,
        location: Option<LocationDetails>,
    ) {
        self.tables().participants.push(Participant {
            hangout_id,
            user_id: user_id.clone(),
            invite,
            flow,
            location,
        });
    }

    /// Force the hangout status, bypassing the transition table.
    pub fn force_status(&self, hangout_id: HangoutId, status: HangoutStatus) {
        if let Some(hangout) = self.tables().hangouts.get_mut(&hangout_id) {
            hangout.status = status;
        }
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.tables().notifications.clone()
    }

    /// Stored time votes across all hangouts.
    pub fn vote_rows(&self) -> usize {
        self.tables().votes.len()
    }

    /// Make every subsequent notification fail.
    pub fn fail_notifications(&self, fail: bool) {
        self.fail_notifications.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl HangoutRepository for InMemoryStore {
    async fn create(&self, draft: &HangoutDraft) -> Result<Hangout, RepositoryError> {
        let mut tables = self.tables();
        let id = HangoutId::new(tables.allocate());
        let hangout = Hangout {
            id,
            creator: draft.creator().clone(),
            title: draft.title().to_owned(),
            status: HangoutStatus::InvitesSent,
            schedule: None,
            chosen_place: None,
        };
        tables.hangouts.insert(id, hangout.clone());
        tables.participants.push(Participant {
            hangout_id: id,
            user_id: draft.creator().clone(),
            invite: InviteStatus::Accepted,
            flow: FlowStatus::PendingTimeInput,
            location: None,
        });
        for invitee in draft.invitees() {
            tables.participants.push(Participant {
                hangout_id: id,
                user_id: invitee.clone(),
                invite: InviteStatus::Pending,
                flow: FlowStatus::PendingTimeInput,
                location: None,
            });
        }
        Ok(hangout)
    }

    async fn find(&self, hangout_id: HangoutId) -> Result<Option<Hangout>, RepositoryError> {
        Ok(self.tables().hangouts.get(&hangout_id).cloned())
    }

    async fn participants(
        &self,
        hangout_id: HangoutId,
    ) -> Result<Vec<Participant>, RepositoryError> {
        Ok(self
            .tables()
            .participants
            .iter()
            .filter(|p| p.hangout_id == hangout_id)
            .cloned()
            .collect())
    }

    async fn record_invite_response(
        &self,
        hangout_id: HangoutId,
        user_id: &UserId,
        invite: InviteStatus,
        flow: FlowStatus,
    ) -> Result<bool, RepositoryError> {
        let mut tables = self.tables();
        Ok(tables
            .participant_mut(hangout_id, user_id)
            .map(|p| {
                p.invite = invite;
                p.flow = flow;
            })
            .is_some())
    }

    async fn update_flow(
        &self,
        hangout_id: HangoutId,
        user_id: &UserId,
        flow: FlowStatus,
    ) -> Result<bool, RepositoryError> {
        let mut tables = self.tables();
        Ok(tables
            .participant_mut(hangout_id, user_id)
            .map(|p| p.flow = flow)
            .is_some())
    }

    async fn save_location(
        &self,
        hangout_id: HangoutId,
        user_id: &UserId,
        details: &LocationDetails,
        flow: FlowStatus,
    ) -> Result<bool, RepositoryError> {
        let mut tables = self.tables();
        Ok(tables
            .participant_mut(hangout_id, user_id)
            .map(|p| {
                p.location = Some(details.clone());
                p.flow = flow;
            })
            .is_some())
    }

    async fn set_active_flow(
        &self,
        hangout_id: HangoutId,
        flow: FlowStatus,
    ) -> Result<(), RepositoryError> {
        self.tables()
            .participants
            .iter_mut()
            .filter(|p| p.hangout_id == hangout_id && p.is_active())
            .for_each(|p| p.flow = flow);
        Ok(())
    }

    async fn remove_participant(
        &self,
        hangout_id: HangoutId,
        user_id: &UserId,
    ) -> Result<bool, RepositoryError> {
        let mut tables = self.tables();
        let before = tables.participants.len();
        tables
            .participants
            .retain(|p| !(p.hangout_id == hangout_id && &p.user_id == user_id));
        Ok(tables.participants.len() < before)
    }

    async fn transition(&self, change: &StatusChange) -> Result<bool, RepositoryError> {
        let mut tables = self.tables();
        let Some(hangout) = tables.hangouts.get_mut(&change.hangout_id()) else {
            return Ok(false);
        };
        if hangout.status != change.from() {
            return Ok(false);
        }
        hangout.status = change.to();
        if let Some(schedule) = change.schedule() {
            hangout.schedule = Some(*schedule);
        }
        if let Some(place) = change.chosen_place() {
            hangout.chosen_place = Some(place);
        }
        Ok(true)
    }

    async fn delete(&self, hangout_id: HangoutId) -> Result<bool, RepositoryError> {
        let mut tables = self.tables();
        if tables.hangouts.remove(&hangout_id).is_none() {
            return Ok(false);
        }
        let options = tables.option_ids(hangout_id);
        tables.votes.retain(|(_, option)| !options.contains(option));
        tables.options.retain(|o| o.hangout_id != hangout_id);
        tables.drop_recommendations(hangout_id);
        tables.participants.retain(|p| p.hangout_id != hangout_id);
        Ok(true)
    }
}

#[async_trait]
impl PollRepository for InMemoryStore {
    async fn create_options(&self, draft: &PollDraft) -> Result<PollInsertOutcome, RepositoryError> {
        let mut tables = self.tables();
        if !tables.option_ids(draft.hangout_id()).is_empty() {
            return Ok(PollInsertOutcome::AlreadyExists);
        }
        let mut created = Vec::with_capacity(draft.options().len());
        for window in draft.options() {
            let option = TimeOption {
                id: TimeOptionId::new(tables.allocate()),
                hangout_id: draft.hangout_id(),
                window: *window,
            };
            tables.options.push(option);
            created.push(option);
        }
        Ok(PollInsertOutcome::Created(created))
    }

    async fn options(&self, hangout_id: HangoutId) -> Result<Vec<TimeOption>, RepositoryError> {
        let mut options: Vec<TimeOption> = self
            .tables()
            .options
            .iter()
            .filter(|o| o.hangout_id == hangout_id)
            .copied()
            .collect();
        options.sort_by_key(|o| o.id);
        Ok(options)
    }

    async fn replace_votes(
        &self,
        hangout_id: HangoutId,
        user_id: &UserId,
        ballot: &Ballot,
    ) -> Result<(), RepositoryError> {
        let mut tables = self.tables();
        let options = tables.option_ids(hangout_id);
        tables
            .votes
            .retain(|(voter, option)| !(voter == user_id && options.contains(option)));
        for option in ballot.options() {
            tables.votes.insert((user_id.clone(), *option));
        }
        Ok(())
    }

    async fn votes(&self, hangout_id: HangoutId) -> Result<Vec<Vote>, RepositoryError> {
        let tables = self.tables();
        let options = tables.option_ids(hangout_id);
        Ok(tables
            .votes
            .iter()
            .filter(|(_, option)| options.contains(option))
            .map(|(user_id, option_id)| Vote {
                user_id: user_id.clone(),
                option_id: *option_id,
            })
            .collect())
    }
}

#[async_trait]
impl RecommendationRepository for InMemoryStore {
    async fn replace(
        &self,
        hangout_id: HangoutId,
        venues: &[Venue],
    ) -> Result<Vec<PlaceRecommendation>, RepositoryError> {
        let mut tables = self.tables();
        tables.drop_recommendations(hangout_id);
        let mut stored = Vec::with_capacity(venues.len());
        for venue in venues {
            let recommendation = PlaceRecommendation {
                id: RecommendationId::new(tables.allocate()),
                hangout_id,
                name: venue.name.clone(),
                address: venue.address.clone(),
                location: venue.location,
            };
            tables.recommendations.push(recommendation.clone());
            stored.push(recommendation);
        }
        Ok(stored)
    }

    async fn list(
        &self,
        hangout_id: HangoutId,
    ) -> Result<Vec<PlaceRecommendation>, RepositoryError> {
        let mut listed: Vec<PlaceRecommendation> = self
            .tables()
            .recommendations
            .iter()
            .filter(|r| r.hangout_id == hangout_id)
            .cloned()
            .collect();
        listed.sort_by_key(|r| r.id);
        Ok(listed)
    }

    async fn replace_ranking(
        &self,
        hangout_id: HangoutId,
        user_id: &UserId,
        ranking: &PlaceRanking,
    ) -> Result<(), RepositoryError> {
        let mut tables = self.tables();
        let places = tables.recommendation_ids(hangout_id);
        tables
            .rankings
            .retain(|(voter, place), _| !(voter == user_id && places.contains(place)));
        for &(place, rank) in ranking.entries() {
            tables.rankings.insert((user_id.clone(), place), rank);
        }
        Ok(())
    }

    async fn ranking_votes(
        &self,
        hangout_id: HangoutId,
    ) -> Result<Vec<RankedVote>, RepositoryError> {
        let tables = self.tables();
        let places = tables.recommendation_ids(hangout_id);
        Ok(tables
            .rankings
            .iter()
            .filter(|((_, place), _)| places.contains(place))
            .map(|((user_id, place), rank)| RankedVote {
                user_id: user_id.clone(),
                recommendation_id: *place,
                rank: *rank,
            })
            .collect())
    }
}

#[async_trait]
impl Notifier for InMemoryStore {
    async fn notify(&self, notification: &Notification) -> Result<(), NotifierError> {
        if self.fail_notifications.load(Ordering::SeqCst) {
            return Err(NotifierError::unavailable("notifications disabled"));
        }
        self.tables().notifications.push(notification.clone());
        Ok(())
    }
}
