//! PostgreSQL-backed `PollRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use super::diesel_basic_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{NewTimeOptionRow, NewTimeVoteRow, TimeOptionRow, convert_all, vote_from_row};
use super::pool::DbPool;
use super::schema::{hangouts, time_options, time_votes};
use crate::domain::ports::{PollInsertOutcome, PollRepository, RepositoryError};
use crate::domain::{Ballot, HangoutId, PollDraft, TimeOption, UserId, Vote};

/// Diesel-backed implementation of the `PollRepository` port.
#[derive(Clone)]
pub struct DieselPollRepository {
    pool: DbPool,
}

impl DieselPollRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PollRepository for DieselPollRepository {
    async fn create_options(
        &self,
        draft: &PollDraft,
    ) -> Result<PollInsertOutcome, RepositoryError> {
        let hangout_id = draft.hangout_id().get();
        let rows: Vec<NewTimeOptionRow> = draft
            .options()
            .iter()
            .map(|window| NewTimeOptionRow {
                hangout_id,
                option_date: window.date(),
                start_time: window.start(),
                end_time: window.end(),
            })
            .collect();

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let created = conn
            .transaction::<_, diesel::result::Error, _>(|conn| {
                async move {
                    // Serialises concurrent poll creation for the same hangout.
                    hangouts::table
                        .find(hangout_id)
                        .select(hangouts::id)
                        .for_update()
                        .first::<i64>(conn)
                        .await?;

                    let existing: i64 = time_options::table
                        .filter(time_options::hangout_id.eq(hangout_id))
                        .count()
                        .get_result(conn)
                        .await?;
                    if existing > 0 {
                        return Ok(None);
                    }

                    let inserted = diesel::insert_into(time_options::table)
                        .values(&rows)
                        .returning(TimeOptionRow::as_returning())
                        .get_results::<TimeOptionRow>(conn)
                        .await?;
                    Ok(Some(inserted))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        match created {
            Some(mut rows) => {
                rows.sort_by_key(|row| row.id);
                Ok(PollInsertOutcome::Created(convert_all(rows)?))
            }
            None => Ok(PollInsertOutcome::AlreadyExists),
        }
    }

    async fn options(&self, hangout_id: HangoutId) -> Result<Vec<TimeOption>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = time_options::table
            .filter(time_options::hangout_id.eq(hangout_id.get()))
            .order(time_options::id.asc())
            .select(TimeOptionRow::as_select())
            .load::<TimeOptionRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        convert_all(rows)
    }

    async fn replace_votes(
        &self,
        hangout_id: HangoutId,
        user_id: &UserId,
        ballot: &Ballot,
    ) -> Result<(), RepositoryError> {
        let hangout = hangout_id.get();
        let voter = *user_id.as_uuid();
        let rows: Vec<NewTimeVoteRow> = ballot
            .options()
            .iter()
            .map(|option_id| NewTimeVoteRow {
                user_id: voter,
                time_option_id: option_id.get(),
            })
            .collect();

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            async move {
                let hangout_options = time_options::table
                    .filter(time_options::hangout_id.eq(hangout))
                    .select(time_options::id);
                diesel::delete(
                    time_votes::table
                        .filter(time_votes::user_id.eq(voter))
                        .filter(time_votes::time_option_id.eq_any(hangout_options)),
                )
                .execute(conn)
                .await?;

                if rows.is_empty() {
                    return Ok(());
                }
                diesel::insert_into(time_votes::table)
                    .values(&rows)
                    .on_conflict((time_votes::user_id, time_votes::time_option_id))
                    .do_nothing()
                    .execute(conn)
                    .await?;
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn votes(&self, hangout_id: HangoutId) -> Result<Vec<Vote>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = time_votes::table
            .inner_join(time_options::table)
            .filter(time_options::hangout_id.eq(hangout_id.get()))
            .order((time_votes::time_option_id.asc(), time_votes::user_id.asc()))
            .select((time_votes::user_id, time_votes::time_option_id))
            .load::<(uuid::Uuid, i64)>(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(vote_from_row).collect())
    }
}
