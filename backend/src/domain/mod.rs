//! Domain primitives, aggregates, and services.
//!
//! Purpose: Define the hangout lifecycle, time polls, place voting, and the
//! isochrone-based location pipeline independently of storage and providers.
//! Outbound adapters implement the traits in [`ports`].
//!
//! Public surface:
//! - Error (alias to `error::Error`): transport-agnostic error payload.
//! - HangoutStatus: the hangout state machine.
//! - FlowStatus: per-participant progress within a phase.
//! - HangoutService, PollService, LocationService: driving operations.
//! - RecommendationService: the location pipeline.

pub mod error;
pub mod flow_tracker;
pub mod geo;
mod hangout;
mod hangout_service;
mod ids;
mod location_service;
mod notification;
mod participant;
mod phase_engine;
mod place_vote;
mod poll;
mod poll_service;
pub mod ports;
mod recommendation;
mod recommendation_service;
mod service_support;

pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::flow_tracker::has_everyone_reached;
pub use self::hangout::{
    Hangout, HangoutDraft, HangoutStatus, HangoutValidationError, ParseStatusError, StatusChange,
    TransitionError,
};
pub use self::hangout_service::{HangoutService, InviteResponse};
pub use self::ids::{HangoutId, RecommendationId, TimeOptionId, UserId, UserIdError};
pub use self::location_service::LocationService;
pub use self::notification::{
    Notification, NotificationBatch, NotificationBatchError, NotificationKind,
};
pub use self::participant::{
    FlowStatus, InviteStatus, LocationDetails, LocationValidationError, Participant,
};
pub use self::phase_engine::{HangoutPorts, PhaseEngine};
pub use self::place_vote::{PlaceRanking, RankedVote, RankingValidationError, resolve_place};
pub use self::poll::{
    Ballot, MAX_POLL_OPTIONS, PollDraft, PollValidationError, TimeOption, TimeWindow, Vote,
    distinct_voters, resolve_winner,
};
pub use self::poll_service::{PollService, PollSnapshot};
pub use self::recommendation::{PlaceRecommendation, Venue};
pub use self::recommendation_service::{
    DEFAULT_MAX_VENUES, DEFAULT_VENUE_CATEGORY, GeoPorts, RecommendationService, VenueQuery,
};
