//! Hangout participants, invite status, and per-phase flow status.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::geo::{GeoValidationError, TransportMode, TravelBudget};
use super::{HangoutId, ParseStatusError, UserId};

/// Response to a hangout invitation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InviteStatus {
    Pending,
    Accepted,
    Declined,
}

impl InviteStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Declined => "declined",
        }
    }
}

impl FromStr for InviteStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "declined" => Ok(Self::Declined),
            other => Err(ParseStatusError(other.to_owned())),
        }
    }
}

/// Progress of one participant through the current phase.
///
/// Only meaningful while the invite is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FlowStatus {
    PendingTimeInput,
    SubmittedTimeInput,
    PendingTimeVote,
    SubmittedTimeVote,
    PendingConfirmTime,
    SubmittedConfirmTime,
    PendingLocationVote,
    SubmittedLocationVote,
    PendingConfirmLocation,
    SubmittedConfirmLocation,
}

impl FlowStatus {
    pub const ALL: [Self; 10] = [
        Self::PendingTimeInput,
        Self::SubmittedTimeInput,
        Self::PendingTimeVote,
        Self::SubmittedTimeVote,
        Self::PendingConfirmTime,
        Self::SubmittedConfirmTime,
        Self::PendingLocationVote,
        Self::SubmittedLocationVote,
        Self::PendingConfirmLocation,
        Self::SubmittedConfirmLocation,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::PendingTimeInput => "pending-time-input",
            Self::SubmittedTimeInput => "submitted-time-input",
            Self::PendingTimeVote => "pending-time-vote",
            Self::SubmittedTimeVote => "submitted-time-vote",
            Self::PendingConfirmTime => "pending-confirm-time",
            Self::SubmittedConfirmTime => "submitted-confirm-time",
            Self::PendingLocationVote => "pending-location-vote",
            Self::SubmittedLocationVote => "submitted-location-vote",
            Self::PendingConfirmLocation => "pending-confirm-location",
            Self::SubmittedConfirmLocation => "submitted-confirm-location",
        }
    }
}

impl fmt::Display for FlowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FlowStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|flow| flow.as_str() == s)
            .ok_or_else(|| ParseStatusError(s.to_owned()))
    }
}

/// Start address and travel constraints submitted when confirming the time.
///
/// Stored rows are not re-validated on read. Use [`LocationDetails::new`] for
/// caller input and check [`LocationDetails::budget`] before any provider call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationDetails {
    pub address: String,
    pub transport: TransportMode,
    pub travel_minutes: u32,
}

/// Validation failures for [`LocationDetails`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LocationValidationError {
    #[error("start address must not be empty")]
    EmptyAddress,
    #[error(transparent)]
    Geo(#[from] GeoValidationError),
}

impl LocationDetails {
    pub fn new(
        address: impl Into<String>,
        transport: &str,
        travel_minutes: u32,
    ) -> Result<Self, LocationValidationError> {
        let address = address.into().trim().to_owned();
        if address.is_empty() {
            return Err(LocationValidationError::EmptyAddress);
        }
        let transport = TransportMode::new(transport)?;
        TravelBudget::new(travel_minutes)?;
        Ok(Self {
            address,
            transport,
            travel_minutes,
        })
    }

    /// Validated travel budget.
    pub fn budget(&self) -> Result<TravelBudget, GeoValidationError> {
        TravelBudget::new(self.travel_minutes)
    }
}

/// One user's membership in a hangout.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub hangout_id: HangoutId,
    pub user_id: UserId,
    pub invite: InviteStatus,
    pub flow: FlowStatus,
    pub location: Option<LocationDetails>,
}

impl Participant {
    /// Accepted participants are the only ones counted by phase gates.
    pub fn is_active(&self) -> bool {
        self.invite == InviteStatus::Accepted
    }
}
