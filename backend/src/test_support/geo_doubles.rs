//! Scripted geocoding, isochrone, and venue providers.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use geo::{MultiPolygon, Rect, coord};

use crate::domain::Venue;
use crate::domain::geo::Coordinate;
use crate::domain::ports::{
    GeoProviderError, Geocoder, IsochroneRequest, IsochroneSource, VenueSearchRequest, VenueSource,
};

/// Axis-aligned square of half-width `half_degrees` around `center`.
pub fn square_around(center: Coordinate, half_degrees: f64) -> MultiPolygon<f64> {
    let (x, y) = (center.longitude(), center.latitude());
    let rect = Rect::new(
        coord! { x: x - half_degrees, y: y - half_degrees },
        coord! { x: x + half_degrees, y: y + half_degrees },
    );
    MultiPolygon::new(vec![rect.to_polygon()])
}

/// Geocoder answering from a fixed address book.
#[derive(Default)]
pub struct ScriptedGeocoder {
    known: HashMap<String, Coordinate>,
    calls: AtomicUsize,
}

impl ScriptedGeocoder {
    #[must_use]
    pub fn with(mut self, address: &str, at: Coordinate) -> Self {
        self.known.insert(address.to_owned(), at);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Geocoder for ScriptedGeocoder {
    async fn geocode(&self, address: &str) -> Result<Option<Coordinate>, GeoProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.known.get(address).copied())
    }
}

/// Isochrone source returning a fixed area per origin.
#[derive(Default)]
pub struct ScriptedIsochrones {
    areas: Vec<(Coordinate, MultiPolygon<f64>)>,
    calls: AtomicUsize,
}

impl ScriptedIsochrones {
    #[must_use]
    pub fn with(mut self, origin: Coordinate, area: MultiPolygon<f64>) -> Self {
        self.areas.push((origin, area));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IsochroneSource for ScriptedIsochrones {
    async fn isochrone(
        &self,
        request: &IsochroneRequest,
    ) -> Result<MultiPolygon<f64>, GeoProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.areas
            .iter()
            .find(|(origin, _)| *origin == request.origin)
            .map(|(_, area)| area.clone())
            .ok_or_else(|| GeoProviderError::invalid_request("no isochrone scripted for origin"))
    }
}

/// Venue source returning the same venues for every search.
#[derive(Default)]
pub struct ScriptedVenues {
    venues: Vec<Venue>,
    calls: AtomicUsize,
}

impl ScriptedVenues {
    #[must_use]
    pub fn with(mut self, venue: Venue) -> Self {
        self.venues.push(venue);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VenueSource for ScriptedVenues {
    async fn nearby(&self, request: &VenueSearchRequest) -> Result<Vec<Venue>, GeoProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.venues.iter().take(request.max_results).cloned().collect())
    }
}
