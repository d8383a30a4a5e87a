//! Driven port for nearby venue search.

use async_trait::async_trait;

use crate::domain::Venue;
use crate::domain::geo::Coordinate;

use super::GeoProviderError;

/// Circle search for venues of one category.
#[derive(Debug, Clone, PartialEq)]
pub struct VenueSearchRequest {
    pub center: Coordinate,
    pub radius_meters: f64,
    /// Provider-neutral category, e.g. `restaurant`.
    pub category: String,
    /// Upper bound on candidates returned. Callers filter and cap further.
    pub max_results: usize,
}

/// Port for venue providers.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VenueSource: Send + Sync {
    async fn nearby(&self, request: &VenueSearchRequest) -> Result<Vec<Venue>, GeoProviderError>;
}
