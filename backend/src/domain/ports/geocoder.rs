//! Driven port for resolving street addresses.

use async_trait::async_trait;

use crate::domain::geo::Coordinate;

use super::GeoProviderError;

/// Port for forward geocoding.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Resolve `address` to its best match, or `None` when nothing matches.
    async fn geocode(&self, address: &str) -> Result<Option<Coordinate>, GeoProviderError>;
}
