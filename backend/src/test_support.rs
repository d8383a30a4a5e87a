//! Test utilities for the backend crate.
//!
//! This module provides shared helpers for both unit tests (in `src/`) and
//! integration tests (in `tests/`). It is compiled for tests and behind the
//! `test-support` feature.

pub mod geo_doubles;
pub mod memory_store;

use std::sync::Arc;

use crate::domain::{
    GeoPorts, HangoutPorts, HangoutService, LocationService, PhaseEngine, PollService,
    RecommendationService, VenueQuery,
};

pub use geo_doubles::{ScriptedGeocoder, ScriptedIsochrones, ScriptedVenues, square_around};
pub use memory_store::InMemoryStore;

/// Services wired to one in-memory store and scripted providers.
pub struct Harness {
    pub store: Arc<InMemoryStore>,
    pub geocoder: Arc<ScriptedGeocoder>,
    pub isochrones: Arc<ScriptedIsochrones>,
    pub venues: Arc<ScriptedVenues>,
    pub hangouts: HangoutService,
    pub polls: PollService,
    pub locations: LocationService,
}

impl Harness {
    pub fn new(
        geocoder: ScriptedGeocoder,
        isochrones: ScriptedIsochrones,
        venues: ScriptedVenues,
    ) -> Self {
        let store = Arc::new(InMemoryStore::default());
        let geocoder = Arc::new(geocoder);
        let isochrones = Arc::new(isochrones);
        let venues = Arc::new(venues);

        let ports = HangoutPorts {
            hangouts: store.clone(),
            polls: store.clone(),
            recommendations: store.clone(),
            notifier: store.clone(),
        };
        let recommender = RecommendationService::new(
            store.clone(),
            store.clone(),
            GeoPorts {
                geocoder: geocoder.clone(),
                isochrones: isochrones.clone(),
                venues: venues.clone(),
            },
            VenueQuery::default(),
        );
        let engine = PhaseEngine::new(ports, recommender);

        Self {
            store,
            geocoder,
            isochrones,
            venues,
            hangouts: HangoutService::new(engine.clone()),
            polls: PollService::new(engine.clone()),
            locations: LocationService::new(engine),
        }
    }

    /// Harness whose providers are never expected to be called.
    pub fn without_geo() -> Self {
        Self::new(
            ScriptedGeocoder::default(),
            ScriptedIsochrones::default(),
            ScriptedVenues::default(),
        )
    }
}
