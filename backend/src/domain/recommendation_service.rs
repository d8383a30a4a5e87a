//! Meetup location recommendations from intersecting isochrones.
//!
//! The pipeline is fail-fast: geocode every start address, fetch one isochrone
//! per participant, intersect them, search for venues in a circle around the
//! largest overlapping area, and keep the venues inside the overlap. Geocoding
//! and isochrone calls fan out concurrently; the first failure drops the
//! remaining in-flight calls.

use std::sync::Arc;

use futures_util::future::try_join_all;
use geo::MultiPolygon;
use serde_json::json;
use tracing::{debug, info};

use crate::domain::geo::{
    Coordinate, TransportMode, TravelBudget, enclosing_circle, intersect_all, is_empty_region,
    venues_within,
};
use crate::domain::ports::{
    Geocoder, HangoutRepository, IsochroneRequest, IsochroneSource, RecommendationRepository,
    VenueSearchRequest, VenueSource,
};
use crate::domain::service_support::{
    map_provider_error, map_repository_error, require_hangout, require_participants,
};
use crate::domain::{Error, HangoutId, HangoutStatus, Participant, PlaceRecommendation, Venue};

/// Default venue category searched for.
pub const DEFAULT_VENUE_CATEGORY: &str = "restaurant";
/// Default cap on venues kept per recommendation run.
pub const DEFAULT_MAX_VENUES: usize = 10;
/// Candidates requested per kept venue. Providers return venues in no useful
/// order, so the cap applies only after the overlap filter.
const CANDIDATES_PER_VENUE: usize = 5;

/// External geospatial collaborators.
#[derive(Clone)]
pub struct GeoPorts {
    pub geocoder: Arc<dyn Geocoder>,
    pub isochrones: Arc<dyn IsochroneSource>,
    pub venues: Arc<dyn VenueSource>,
}

/// Venue search parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VenueQuery {
    pub category: String,
    pub max_results: usize,
}

impl Default for VenueQuery {
    fn default() -> Self {
        Self {
            category: DEFAULT_VENUE_CATEGORY.to_owned(),
            max_results: DEFAULT_MAX_VENUES,
        }
    }
}

struct TravelInput {
    address: String,
    budget: TravelBudget,
    transport: TransportMode,
}

/// Orchestrates one recommendation run for a hangout.
#[derive(Clone)]
pub struct RecommendationService {
    hangouts: Arc<dyn HangoutRepository>,
    recommendations: Arc<dyn RecommendationRepository>,
    geo: GeoPorts,
    query: VenueQuery,
}

impl RecommendationService {
    pub fn new(
        hangouts: Arc<dyn HangoutRepository>,
        recommendations: Arc<dyn RecommendationRepository>,
        geo: GeoPorts,
        query: VenueQuery,
    ) -> Self {
        Self {
            hangouts,
            recommendations,
            geo,
            query,
        }
    }

    /// Compute and store recommendations, replacing any earlier run.
    ///
    /// Requires the hangout to be `determining-location`; otherwise nothing is
    /// read from providers or written.
    pub async fn recommend(&self, hangout_id: HangoutId) -> Result<Vec<PlaceRecommendation>, Error> {
        let hangout = require_hangout(self.hangouts.as_ref(), hangout_id).await?;
        if hangout.status != HangoutStatus::DeterminingLocation {
            return Err(Error::invalid_state(format!(
                "recommendations need status {}, hangout {hangout_id} is {}",
                HangoutStatus::DeterminingLocation,
                hangout.status
            )));
        }

        let participants = require_participants(self.hangouts.as_ref(), hangout_id).await?;
        let inputs = gather_inputs(&participants)?;
        let addresses: Vec<&str> = inputs.iter().map(|i| i.address.as_str()).collect();

        let origins = self.geocode_all(&inputs).await?;
        let areas = self.isochrones_for(&inputs, &origins).await?;

        let overlap = intersect_all(&areas);
        if is_empty_region(&overlap) {
            return Err(no_overlap(&addresses));
        }

        let venues = self.venues_in(&overlap, &addresses).await?;
        let stored = self
            .recommendations
            .replace(hangout_id, &venues)
            .await
            .map_err(map_repository_error)?;

        info!(
            hangout_id = %hangout_id,
            participants = inputs.len(),
            recommendations = stored.len(),
            "stored place recommendations"
        );
        Ok(stored)
    }

    async fn geocode_all(&self, inputs: &[TravelInput]) -> Result<Vec<Coordinate>, Error> {
        let lookups = inputs.iter().map(|input| async move {
            let address = input.address.as_str();
            debug!(address, "geocoding start address");
            self.geo
                .geocoder
                .geocode(address)
                .await
                .map_err(|err| map_provider_error("geocoding", &err))?
                .ok_or_else(|| {
                    Error::invalid_request(format!("address could not be resolved: {address}"))
                        .with_details(json!({ "address": address }))
                })
        });
        try_join_all(lookups).await
    }

    async fn isochrones_for(
        &self,
        inputs: &[TravelInput],
        origins: &[Coordinate],
    ) -> Result<Vec<MultiPolygon<f64>>, Error> {
        if inputs.len() != origins.len() {
            return Err(Error::internal(format!(
                "geocoded {} of {} start addresses",
                origins.len(),
                inputs.len()
            )));
        }

        let requests = inputs.iter().zip(origins).map(|(input, origin)| async move {
            let request = IsochroneRequest {
                origin: *origin,
                budget: input.budget,
                transport: input.transport.clone(),
            };
            debug!(
                minutes = request.budget.minutes(),
                transport = %request.transport,
                "requesting isochrone"
            );
            self.geo
                .isochrones
                .isochrone(&request)
                .await
                .map_err(|err| map_provider_error("isochrone", &err))
        });
        try_join_all(requests).await
    }

    async fn venues_in(
        &self,
        overlap: &MultiPolygon<f64>,
        addresses: &[&str],
    ) -> Result<Vec<Venue>, Error> {
        let circle = enclosing_circle(overlap)
            .map_err(|err| Error::internal(format!("overlap centroid is invalid: {err}")))?
            .ok_or_else(|| no_overlap(addresses))?;

        let request = VenueSearchRequest {
            center: circle.center,
            radius_meters: circle.radius_meters,
            category: self.query.category.clone(),
            max_results: self.query.max_results.saturating_mul(CANDIDATES_PER_VENUE),
        };
        debug!(
            radius_meters = request.radius_meters,
            category = %request.category,
            "searching venues"
        );

        let candidates = self
            .geo
            .venues
            .nearby(&request)
            .await
            .map_err(|err| map_provider_error("venue search", &err))?;
        let candidate_count = candidates.len();

        let mut inside = venues_within(overlap, candidates);
        if inside.is_empty() {
            return Err(Error::no_result("no venues found inside the shared area").with_details(
                json!({
                    "addresses": addresses,
                    "radiusMeters": circle.radius_meters,
                    "candidates": candidate_count,
                }),
            ));
        }
        inside.truncate(self.query.max_results);
        Ok(inside)
    }
}

fn gather_inputs(participants: &[Participant]) -> Result<Vec<TravelInput>, Error> {
    let inputs = participants
        .iter()
        .filter(|p| p.is_active())
        .map(|p| {
            let details = p.location.as_ref().ok_or_else(|| {
                Error::invalid_request(format!(
                    "user {} has not submitted location details",
                    p.user_id
                ))
            })?;
            let budget = details.budget().map_err(|err| {
                Error::invalid_request(format!("user {}: {err}", p.user_id))
                    .with_details(json!({ "travelMinutes": details.travel_minutes }))
            })?;
            Ok(TravelInput {
                address: details.address.clone(),
                budget,
                transport: details.transport.clone(),
            })
        })
        .collect::<Result<Vec<_>, Error>>()?;

    if inputs.is_empty() {
        return Err(Error::invalid_state("no active participants to plan for"));
    }
    Ok(inputs)
}

fn no_overlap(addresses: &[&str]) -> Error {
    Error::no_result("no overlap between participant isochrones")
        .with_details(json!({ "addresses": addresses }))
}

#[cfg(test)]
#[path = "recommendation_service_tests.rs"]
mod tests;
