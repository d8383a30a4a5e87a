//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Conversions into domain types live here so
//! that every repository reports malformed rows the same way.

use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{
    hangout_participants, hangouts, notifications, place_recommendations, place_votes,
    time_options, time_votes,
};
use crate::domain::geo::{Coordinate, TransportMode};
use crate::domain::ports::RepositoryError;
use crate::domain::{
    FlowStatus, Hangout, HangoutId, HangoutStatus, InviteStatus, LocationDetails, Participant,
    PlaceRecommendation, RankedVote, RecommendationId, TimeOption, TimeOptionId, TimeWindow,
    UserId, Vote,
};

fn corrupt(what: &str, detail: impl std::fmt::Display) -> RepositoryError {
    RepositoryError::query(format!("stored {what} is malformed: {detail}"))
}

fn parse<T>(what: &str, raw: &str) -> Result<T, RepositoryError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse().map_err(|err| corrupt(what, err))
}

// ---------------------------------------------------------------------------
// Hangouts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = hangouts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct HangoutRow {
    pub id: i64,
    pub creator_id: Uuid,
    pub title: String,
    pub status: String,
    pub scheduled_date: Option<NaiveDate>,
    pub scheduled_start: Option<NaiveTime>,
    pub scheduled_end: Option<NaiveTime>,
    pub chosen_place_id: Option<i64>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = hangouts)]
pub(crate) struct NewHangoutRow<'a> {
    pub creator_id: Uuid,
    pub title: &'a str,
    pub status: &'a str,
}

/// Status change plus the data that arrives with it. `None` columns are left
/// untouched.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = hangouts)]
pub(crate) struct HangoutTransitionUpdate<'a> {
    pub status: &'a str,
    pub scheduled_date: Option<NaiveDate>,
    pub scheduled_start: Option<NaiveTime>,
    pub scheduled_end: Option<NaiveTime>,
    pub chosen_place_id: Option<i64>,
}

impl TryFrom<HangoutRow> for Hangout {
    type Error = RepositoryError;

    fn try_from(row: HangoutRow) -> Result<Self, Self::Error> {
        let schedule = match (row.scheduled_date, row.scheduled_start, row.scheduled_end) {
            (Some(date), Some(start), Some(end)) => {
                Some(TimeWindow::new(date, start, end).map_err(|err| corrupt("schedule", err))?)
            }
            (None, None, None) => None,
            _ => return Err(corrupt("schedule", "partially set")),
        };
        Ok(Self {
            id: HangoutId::new(row.id),
            creator: UserId::from(row.creator_id),
            title: row.title,
            status: parse::<HangoutStatus>("hangout status", &row.status)?,
            schedule,
            chosen_place: row.chosen_place_id.map(RecommendationId::new),
        })
    }
}

// ---------------------------------------------------------------------------
// Participants
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = hangout_participants)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ParticipantRow {
    pub hangout_id: i64,
    pub user_id: Uuid,
    pub invite_status: String,
    pub flow_status: String,
    pub start_address: Option<String>,
    pub transport_mode: Option<String>,
    pub travel_minutes: Option<i32>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = hangout_participants)]
pub(crate) struct NewParticipantRow {
    pub hangout_id: i64,
    pub user_id: Uuid,
    pub invite_status: &'static str,
    pub flow_status: &'static str,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = hangout_participants)]
pub(crate) struct ParticipantLocationUpdate<'a> {
    pub start_address: &'a str,
    pub transport_mode: &'a str,
    pub travel_minutes: i32,
    pub flow_status: &'a str,
}

impl TryFrom<ParticipantRow> for Participant {
    type Error = RepositoryError;

    fn try_from(row: ParticipantRow) -> Result<Self, Self::Error> {
        let location = match (row.start_address, row.transport_mode, row.travel_minutes) {
            (Some(address), Some(mode), Some(minutes)) => Some(LocationDetails {
                address,
                transport: TransportMode::new(mode).map_err(|err| corrupt("transport", err))?,
                travel_minutes: u32::try_from(minutes)
                    .map_err(|err| corrupt("travel minutes", err))?,
            }),
            (None, None, None) => None,
            _ => return Err(corrupt("location", "partially set")),
        };
        Ok(Self {
            hangout_id: HangoutId::new(row.hangout_id),
            user_id: UserId::from(row.user_id),
            invite: parse::<InviteStatus>("invite status", &row.invite_status)?,
            flow: parse::<FlowStatus>("flow status", &row.flow_status)?,
            location,
        })
    }
}

// ---------------------------------------------------------------------------
// Time poll
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = time_options)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct TimeOptionRow {
    pub id: i64,
    pub hangout_id: i64,
    pub option_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = time_options)]
pub(crate) struct NewTimeOptionRow {
    pub hangout_id: i64,
    pub option_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = time_votes)]
pub(crate) struct NewTimeVoteRow {
    pub user_id: Uuid,
    pub time_option_id: i64,
}

impl TryFrom<TimeOptionRow> for TimeOption {
    type Error = RepositoryError;

    fn try_from(row: TimeOptionRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: TimeOptionId::new(row.id),
            hangout_id: HangoutId::new(row.hangout_id),
            window: TimeWindow::new(row.option_date, row.start_time, row.end_time)
                .map_err(|err| corrupt("time option", err))?,
        })
    }
}

pub(crate) fn vote_from_row((user_id, option_id): (Uuid, i64)) -> Vote {
    Vote {
        user_id: UserId::from(user_id),
        option_id: TimeOptionId::new(option_id),
    }
}

// ---------------------------------------------------------------------------
// Place recommendations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = place_recommendations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PlaceRecommendationRow {
    pub id: i64,
    pub hangout_id: i64,
    pub name: String,
    pub address: String,
    pub longitude: f64,
    pub latitude: f64,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = place_recommendations)]
pub(crate) struct NewPlaceRecommendationRow<'a> {
    pub hangout_id: i64,
    pub name: &'a str,
    pub address: &'a str,
    pub longitude: f64,
    pub latitude: f64,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = place_votes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PlaceVoteRow {
    pub user_id: Uuid,
    pub recommendation_id: i64,
    pub place_rank: i32,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = place_votes)]
pub(crate) struct NewPlaceVoteRow {
    pub user_id: Uuid,
    pub recommendation_id: i64,
    pub place_rank: i32,
}

impl TryFrom<PlaceRecommendationRow> for PlaceRecommendation {
    type Error = RepositoryError;

    fn try_from(row: PlaceRecommendationRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: RecommendationId::new(row.id),
            hangout_id: HangoutId::new(row.hangout_id),
            name: row.name,
            address: row.address,
            location: Coordinate::new(row.longitude, row.latitude)
                .map_err(|err| corrupt("place location", err))?,
        })
    }
}

impl TryFrom<PlaceVoteRow> for RankedVote {
    type Error = RepositoryError;

    fn try_from(row: PlaceVoteRow) -> Result<Self, Self::Error> {
        Ok(Self {
            user_id: UserId::from(row.user_id),
            recommendation_id: RecommendationId::new(row.recommendation_id),
            rank: u32::try_from(row.place_rank).map_err(|err| corrupt("place rank", err))?,
        })
    }
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = notifications)]
pub(crate) struct NewNotificationRow<'a> {
    pub recipient_id: Uuid,
    pub sender_id: Option<Uuid>,
    pub hangout_id: Option<i64>,
    pub kind: &'a str,
    pub message: &'a str,
}

/// Convert a collection of rows, failing on the first malformed one.
pub(crate) fn convert_all<R, T>(rows: Vec<R>) -> Result<Vec<T>, RepositoryError>
where
    T: TryFrom<R, Error = RepositoryError>,
{
    rows.into_iter().map(T::try_from).collect()
}
