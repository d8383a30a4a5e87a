//! Hangout aggregate and its lifecycle state machine.
//!
//! Every allowed status change is listed in [`HangoutStatus::can_transition_to`].
//! Services never compare status strings; they build a [`StatusChange`] which
//! refuses transitions outside that table.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{HangoutId, RecommendationId, TimeWindow, UserId};

/// Hangout lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HangoutStatus {
    InvitesSent,
    FetchingAvailability,
    ConfirmTime,
    DeterminingLocation,
    ConfirmMeetup,
    Confirmed,
    Declined,
}

impl HangoutStatus {
    pub const ALL: [Self; 7] = [
        Self::InvitesSent,
        Self::FetchingAvailability,
        Self::ConfirmTime,
        Self::DeterminingLocation,
        Self::ConfirmMeetup,
        Self::Confirmed,
        Self::Declined,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvitesSent => "invites-sent",
            Self::FetchingAvailability => "fetching-availability",
            Self::ConfirmTime => "confirm-time",
            Self::DeterminingLocation => "determining-location",
            Self::ConfirmMeetup => "confirm-meetup",
            Self::Confirmed => "confirmed",
            Self::Declined => "declined",
        }
    }

    /// Whether the hangout has left the planning flow for good.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Confirmed | Self::Declined)
    }

    /// Status reached when the gate guarding this status passes.
    pub fn successor(self) -> Option<Self> {
        match self {
            Self::InvitesSent => Some(Self::FetchingAvailability),
            Self::FetchingAvailability => Some(Self::ConfirmTime),
            Self::ConfirmTime => Some(Self::DeterminingLocation),
            Self::DeterminingLocation => Some(Self::ConfirmMeetup),
            Self::ConfirmMeetup => Some(Self::Confirmed),
            Self::Confirmed | Self::Declined => None,
        }
    }

    /// The transition table.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use backend::domain::HangoutStatus;
    ///
    /// assert!(HangoutStatus::ConfirmTime.can_transition_to(HangoutStatus::DeterminingLocation));
    /// assert!(!HangoutStatus::ConfirmTime.can_transition_to(HangoutStatus::Confirmed));
    /// assert!(HangoutStatus::ConfirmMeetup.can_transition_to(HangoutStatus::Declined));
    /// assert!(!HangoutStatus::Confirmed.can_transition_to(HangoutStatus::Declined));
    /// ```
    pub fn can_transition_to(self, next: Self) -> bool {
        if next == Self::Declined {
            return !self.is_terminal();
        }
        self.successor() == Some(next)
    }
}

impl fmt::Display for HangoutStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognised status text read from storage.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown status: {0}")]
pub struct ParseStatusError(pub String);

impl FromStr for HangoutStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ParseStatusError(s.to_owned()))
    }
}

/// Persisted hangout.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Hangout {
    pub id: HangoutId,
    pub creator: UserId,
    pub title: String,
    pub status: HangoutStatus,
    /// Winning time window once the poll resolves.
    pub schedule: Option<TimeWindow>,
    /// Winning place once location voting resolves.
    pub chosen_place: Option<RecommendationId>,
}

/// Validation failures for [`HangoutDraft`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HangoutValidationError {
    #[error("hangout title must not be empty")]
    EmptyTitle,
    #[error("creator name must not be empty")]
    EmptyCreatorName,
    #[error("a hangout needs at least one invitee")]
    NoInvitees,
    #[error("the creator cannot invite themselves")]
    CreatorInvited,
}

/// Validated request to create a hangout and invite people to it.
///
/// Duplicate invitees are collapsed, keeping first-seen order.
#[derive(Debug, Clone, PartialEq)]
pub struct HangoutDraft {
    creator: UserId,
    creator_name: String,
    title: String,
    invitees: Vec<UserId>,
}

impl HangoutDraft {
    pub fn new(
        creator: UserId,
        creator_name: impl Into<String>,
        title: impl Into<String>,
        invitees: Vec<UserId>,
    ) -> Result<Self, HangoutValidationError> {
        let title = title.into().trim().to_owned();
        if title.is_empty() {
            return Err(HangoutValidationError::EmptyTitle);
        }
        let creator_name = creator_name.into().trim().to_owned();
        if creator_name.is_empty() {
            return Err(HangoutValidationError::EmptyCreatorName);
        }

        let mut unique: Vec<UserId> = Vec::with_capacity(invitees.len());
        for invitee in invitees {
            if invitee == creator {
                return Err(HangoutValidationError::CreatorInvited);
            }
            if !unique.contains(&invitee) {
                unique.push(invitee);
            }
        }
        if unique.is_empty() {
            return Err(HangoutValidationError::NoInvitees);
        }

        Ok(Self {
            creator,
            creator_name,
            title,
            invitees: unique,
        })
    }

    pub fn creator(&self) -> &UserId {
        &self.creator
    }

    pub fn creator_name(&self) -> &str {
        &self.creator_name
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn invitees(&self) -> &[UserId] {
        &self.invitees
    }
}

/// Rejected status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("hangout cannot move from {from} to {to}")]
pub struct TransitionError {
    pub from: HangoutStatus,
    pub to: HangoutStatus,
}

/// Conditional status update applied only while the hangout is still `from`.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusChange {
    hangout_id: HangoutId,
    from: HangoutStatus,
    to: HangoutStatus,
    schedule: Option<TimeWindow>,
    chosen_place: Option<RecommendationId>,
}

impl StatusChange {
    pub fn new(
        hangout_id: HangoutId,
        from: HangoutStatus,
        to: HangoutStatus,
    ) -> Result<Self, TransitionError> {
        if !from.can_transition_to(to) {
            return Err(TransitionError { from, to });
        }
        Ok(Self {
            hangout_id,
            from,
            to,
            schedule: None,
            chosen_place: None,
        })
    }

    /// Record the winning time window alongside the status change.
    #[must_use]
    pub fn with_schedule(mut self, schedule: TimeWindow) -> Self {
        self.schedule = Some(schedule);
        self
    }

    /// Record the winning place alongside the status change.
    #[must_use]
    pub fn with_chosen_place(mut self, place: RecommendationId) -> Self {
        self.chosen_place = Some(place);
        self
    }

    pub fn hangout_id(&self) -> HangoutId {
        self.hangout_id
    }

    pub fn from(&self) -> HangoutStatus {
        self.from
    }

    pub fn to(&self) -> HangoutStatus {
        self.to
    }

    pub fn schedule(&self) -> Option<&TimeWindow> {
        self.schedule.as_ref()
    }

    pub fn chosen_place(&self) -> Option<RecommendationId> {
        self.chosen_place
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(HangoutStatus::InvitesSent, HangoutStatus::FetchingAvailability)]
    #[case(HangoutStatus::FetchingAvailability, HangoutStatus::ConfirmTime)]
    #[case(HangoutStatus::ConfirmTime, HangoutStatus::DeterminingLocation)]
    #[case(HangoutStatus::DeterminingLocation, HangoutStatus::ConfirmMeetup)]
    #[case(HangoutStatus::ConfirmMeetup, HangoutStatus::Confirmed)]
    fn forward_transitions_follow_the_phase_order(
        #[case] from: HangoutStatus,
        #[case] to: HangoutStatus,
    ) {
        assert!(from.can_transition_to(to));
        assert!(!to.can_transition_to(from));
    }

    #[rstest]
    fn no_phase_can_be_skipped() {
        assert!(!HangoutStatus::InvitesSent.can_transition_to(HangoutStatus::ConfirmTime));
        assert!(
            !HangoutStatus::FetchingAvailability
                .can_transition_to(HangoutStatus::DeterminingLocation)
        );
    }

    #[rstest]
    fn declined_is_reachable_from_every_open_status() {
        for status in HangoutStatus::ALL {
            assert_eq!(
                status.can_transition_to(HangoutStatus::Declined),
                !status.is_terminal(),
                "{status}"
            );
        }
    }

    #[rstest]
    fn status_text_round_trips() {
        for status in HangoutStatus::ALL {
            assert_eq!(status.as_str().parse::<HangoutStatus>(), Ok(status));
        }
        assert!("pending".parse::<HangoutStatus>().is_err());
    }

    #[rstest]
    fn status_change_rejects_transitions_outside_the_table() {
        let err = StatusChange::new(
            HangoutId::new(1),
            HangoutStatus::ConfirmTime,
            HangoutStatus::Confirmed,
        )
        .expect_err("skips phases");
        assert_eq!(err.to, HangoutStatus::Confirmed);
    }

    #[rstest]
    fn draft_collapses_duplicate_invitees() {
        let creator = UserId::random();
        let friend = UserId::random();
        let draft = HangoutDraft::new(
            creator,
            "Ada",
            "  Friday dinner ",
            vec![friend.clone(), friend.clone()],
        )
        .expect("valid draft");
        assert_eq!(draft.invitees(), &[friend]);
        assert_eq!(draft.title(), "Friday dinner");
    }

    #[rstest]
    fn draft_rejects_self_invites() {
        let creator = UserId::random();
        let result = HangoutDraft::new(creator.clone(), "Ada", "Lunch", vec![creator]);
        assert_eq!(result, Err(HangoutValidationError::CreatorInvited));
    }

    #[rstest]
    #[case("", "Ada", HangoutValidationError::EmptyTitle)]
    #[case("Lunch", " ", HangoutValidationError::EmptyCreatorName)]
    fn draft_rejects_blank_fields(
        #[case] title: &str,
        #[case] name: &str,
        #[case] expected: HangoutValidationError,
    ) {
        let result = HangoutDraft::new(UserId::random(), name, title, vec![UserId::random()]);
        assert_eq!(result, Err(expected));
    }

    #[rstest]
    fn draft_requires_an_invitee() {
        let result = HangoutDraft::new(UserId::random(), "Ada", "Lunch", Vec::new());
        assert_eq!(result, Err(HangoutValidationError::NoInvitees));
    }
}
