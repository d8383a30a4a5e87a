//! Driven port for reachable-area polygons.

use async_trait::async_trait;
use geo::MultiPolygon;

use crate::domain::geo::{Coordinate, TransportMode, TravelBudget};

use super::GeoProviderError;

/// Reachable area request for one participant.
#[derive(Debug, Clone, PartialEq)]
pub struct IsochroneRequest {
    pub origin: Coordinate,
    pub budget: TravelBudget,
    pub transport: TransportMode,
}

/// Port for isochrone providers.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IsochroneSource: Send + Sync {
    /// Area reachable from the origin within the budget, as WGS84 polygons.
    async fn isochrone(
        &self,
        request: &IsochroneRequest,
    ) -> Result<MultiPolygon<f64>, GeoProviderError>;
}
