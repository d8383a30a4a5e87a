//! PostgreSQL-backed `HangoutRepository` implementation using Diesel ORM.
//!
//! Status transitions are conditional updates on the current status, so two
//! callers racing on the same gate see exactly one affected row between them.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use super::diesel_basic_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{
    HangoutRow, HangoutTransitionUpdate, NewHangoutRow, NewParticipantRow,
    ParticipantLocationUpdate, ParticipantRow, convert_all,
};
use super::pool::DbPool;
use super::schema::{hangout_participants, hangouts};
use crate::domain::ports::{HangoutRepository, RepositoryError};
use crate::domain::{
    FlowStatus, Hangout, HangoutDraft, HangoutId, HangoutStatus, InviteStatus, LocationDetails,
    Participant, RecommendationId, StatusChange, UserId,
};

/// Diesel-backed implementation of the `HangoutRepository` port.
#[derive(Clone)]
pub struct DieselHangoutRepository {
    pool: DbPool,
}

impl DieselHangoutRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HangoutRepository for DieselHangoutRepository {
    async fn create(&self, draft: &HangoutDraft) -> Result<Hangout, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = conn
            .transaction::<_, diesel::result::Error, _>(|conn| {
                async move {
                    let row: HangoutRow = diesel::insert_into(hangouts::table)
                        .values(&NewHangoutRow {
                            creator_id: *draft.creator().as_uuid(),
                            title: draft.title(),
                            status: HangoutStatus::InvitesSent.as_str(),
                        })
                        .returning(HangoutRow::as_returning())
                        .get_result(conn)
                        .await?;

                    let creator = NewParticipantRow {
                        hangout_id: row.id,
                        user_id: *draft.creator().as_uuid(),
                        invite_status: InviteStatus::Accepted.as_str(),
                        flow_status: FlowStatus::PendingTimeInput.as_str(),
                    };
                    let members: Vec<NewParticipantRow> = std::iter::once(creator)
                        .chain(draft.invitees().iter().map(|invitee| NewParticipantRow {
                            hangout_id: row.id,
                            user_id: *invitee.as_uuid(),
                            invite_status: InviteStatus::Pending.as_str(),
                            flow_status: FlowStatus::PendingTimeInput.as_str(),
                        }))
                        .collect();
                    diesel::insert_into(hangout_participants::table)
                        .values(&members)
                        .execute(conn)
                        .await?;
                    Ok(row)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        Hangout::try_from(row)
    }

    async fn find(&self, hangout_id: HangoutId) -> Result<Option<Hangout>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = hangouts::table
            .find(hangout_id.get())
            .select(HangoutRow::as_select())
            .first::<HangoutRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(Hangout::try_from).transpose()
    }

    async fn participants(
        &self,
        hangout_id: HangoutId,
    ) -> Result<Vec<Participant>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = hangout_participants::table
            .filter(hangout_participants::hangout_id.eq(hangout_id.get()))
            .order(hangout_participants::user_id.asc())
            .select(ParticipantRow::as_select())
            .load::<ParticipantRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        convert_all(rows)
    }

    async fn record_invite_response(
        &self,
        hangout_id: HangoutId,
        user_id: &UserId,
        invite: InviteStatus,
        flow: FlowStatus,
    ) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(
            hangout_participants::table.find((hangout_id.get(), *user_id.as_uuid())),
        )
        .set((
            hangout_participants::invite_status.eq(invite.as_str()),
            hangout_participants::flow_status.eq(flow.as_str()),
        ))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(updated > 0)
    }

    async fn update_flow(
        &self,
        hangout_id: HangoutId,
        user_id: &UserId,
        flow: FlowStatus,
    ) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(
            hangout_participants::table.find((hangout_id.get(), *user_id.as_uuid())),
        )
        .set(hangout_participants::flow_status.eq(flow.as_str()))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(updated > 0)
    }

    async fn save_location(
        &self,
        hangout_id: HangoutId,
        user_id: &UserId,
        details: &LocationDetails,
        flow: FlowStatus,
    ) -> Result<bool, RepositoryError> {
        let travel_minutes = i32::try_from(details.travel_minutes)
            .map_err(|err| RepositoryError::query(format!("travel minutes: {err}")))?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(
            hangout_participants::table.find((hangout_id.get(), *user_id.as_uuid())),
        )
        .set(&ParticipantLocationUpdate {
            start_address: &details.address,
            transport_mode: details.transport.as_str(),
            travel_minutes,
            flow_status: flow.as_str(),
        })
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(updated > 0)
    }

    async fn set_active_flow(
        &self,
        hangout_id: HangoutId,
        flow: FlowStatus,
    ) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(
            hangout_participants::table.filter(
                hangout_participants::hangout_id
                    .eq(hangout_id.get())
                    .and(hangout_participants::invite_status.eq(InviteStatus::Accepted.as_str())),
            ),
        )
        .set(hangout_participants::flow_status.eq(flow.as_str()))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn remove_participant(
        &self,
        hangout_id: HangoutId,
        user_id: &UserId,
    ) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(
            hangout_participants::table.find((hangout_id.get(), *user_id.as_uuid())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }

    async fn transition(&self, change: &StatusChange) -> Result<bool, RepositoryError> {
        let schedule = change.schedule();
        let update = HangoutTransitionUpdate {
            status: change.to().as_str(),
            scheduled_date: schedule.map(|window| window.date()),
            scheduled_start: schedule.map(|window| window.start()),
            scheduled_end: schedule.map(|window| window.end()),
            chosen_place_id: change.chosen_place().map(RecommendationId::get),
        };

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(
            hangouts::table.filter(
                hangouts::id
                    .eq(change.hangout_id().get())
                    .and(hangouts::status.eq(change.from().as_str())),
            ),
        )
        .set(&update)
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(updated > 0)
    }

    async fn delete(&self, hangout_id: HangoutId) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(hangouts::table.find(hangout_id.get()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }
}
