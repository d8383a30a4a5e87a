//! PostgreSQL-backed `RecommendationRepository` implementation using Diesel ORM.
//!
//! `place_votes` cascades from `place_recommendations`, so replacing a
//! hangout's recommendations also clears every ranking cast on them.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use super::diesel_basic_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{
    NewPlaceRecommendationRow, NewPlaceVoteRow, PlaceRecommendationRow, PlaceVoteRow,
    convert_all,
};
use super::pool::DbPool;
use super::schema::{place_recommendations, place_votes};
use crate::domain::ports::{RecommendationRepository, RepositoryError};
use crate::domain::{HangoutId, PlaceRanking, PlaceRecommendation, RankedVote, UserId, Venue};

/// Diesel-backed implementation of the `RecommendationRepository` port.
#[derive(Clone)]
pub struct DieselRecommendationRepository {
    pool: DbPool,
}

impl DieselRecommendationRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecommendationRepository for DieselRecommendationRepository {
    async fn replace(
        &self,
        hangout_id: HangoutId,
        venues: &[Venue],
    ) -> Result<Vec<PlaceRecommendation>, RepositoryError> {
        let hangout = hangout_id.get();
        let rows: Vec<NewPlaceRecommendationRow<'_>> = venues
            .iter()
            .map(|venue| NewPlaceRecommendationRow {
                hangout_id: hangout,
                name: &venue.name,
                address: &venue.address,
                longitude: venue.location.longitude(),
                latitude: venue.location.latitude(),
            })
            .collect();

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut stored = conn
            .transaction::<_, diesel::result::Error, _>(|conn| {
                async move {
                    diesel::delete(
                        place_recommendations::table
                            .filter(place_recommendations::hangout_id.eq(hangout)),
                    )
                    .execute(conn)
                    .await?;

                    if rows.is_empty() {
                        return Ok(Vec::new());
                    }
                    diesel::insert_into(place_recommendations::table)
                        .values(&rows)
                        .returning(PlaceRecommendationRow::as_returning())
                        .get_results::<PlaceRecommendationRow>(conn)
                        .await
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        stored.sort_by_key(|row| row.id);
        convert_all(stored)
    }

    async fn list(
        &self,
        hangout_id: HangoutId,
    ) -> Result<Vec<PlaceRecommendation>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = place_recommendations::table
            .filter(place_recommendations::hangout_id.eq(hangout_id.get()))
            .order(place_recommendations::id.asc())
            .select(PlaceRecommendationRow::as_select())
            .load::<PlaceRecommendationRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        convert_all(rows)
    }

    async fn replace_ranking(
        &self,
        hangout_id: HangoutId,
        user_id: &UserId,
        ranking: &PlaceRanking,
    ) -> Result<(), RepositoryError> {
        let hangout = hangout_id.get();
        let voter = *user_id.as_uuid();
        let rows = ranking
            .entries()
            .iter()
            .map(|(recommendation_id, rank)| {
                let place_rank = i32::try_from(*rank)
                    .map_err(|err| RepositoryError::query(format!("place rank: {err}")))?;
                Ok(NewPlaceVoteRow {
                    user_id: voter,
                    recommendation_id: recommendation_id.get(),
                    place_rank,
                })
            })
            .collect::<Result<Vec<_>, RepositoryError>>()?;

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            async move {
                let hangout_places = place_recommendations::table
                    .filter(place_recommendations::hangout_id.eq(hangout))
                    .select(place_recommendations::id);
                diesel::delete(
                    place_votes::table
                        .filter(place_votes::user_id.eq(voter))
                        .filter(place_votes::recommendation_id.eq_any(hangout_places)),
                )
                .execute(conn)
                .await?;

                if rows.is_empty() {
                    return Ok(());
                }
                diesel::insert_into(place_votes::table)
                    .values(&rows)
                    .on_conflict((place_votes::user_id, place_votes::recommendation_id))
                    .do_update()
                    .set(place_votes::place_rank.eq(excluded(place_votes::place_rank)))
                    .execute(conn)
                    .await?;
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn ranking_votes(
        &self,
        hangout_id: HangoutId,
    ) -> Result<Vec<RankedVote>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = place_votes::table
            .inner_join(place_recommendations::table)
            .filter(place_recommendations::hangout_id.eq(hangout_id.get()))
            .order((place_votes::recommendation_id.asc(), place_votes::user_id.asc()))
            .select(PlaceVoteRow::as_select())
            .load::<PlaceVoteRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        convert_all(rows)
    }
}
