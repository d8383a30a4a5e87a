//! DTOs for decoding Mapbox geocoding responses.

use serde::Deserialize;

use crate::domain::geo::Coordinate;

#[derive(Debug, Deserialize)]
pub(super) struct FeatureCollectionDto {
    #[serde(default)]
    pub(super) features: Vec<FeatureDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct FeatureDto {
    pub(super) geometry: GeometryDto,
}

#[derive(Debug, Deserialize)]
pub(super) struct GeometryDto {
    /// `[longitude, latitude]`.
    pub(super) coordinates: Vec<f64>,
}

/// Error payload returned with non-success statuses.
#[derive(Debug, Deserialize)]
pub(super) struct MapboxErrorDto {
    pub(super) message: Option<String>,
}

impl FeatureCollectionDto {
    /// Coordinate of the best match, if any.
    pub(super) fn into_best_match(self) -> Result<Option<Coordinate>, String> {
        let Some(feature) = self.features.into_iter().next() else {
            return Ok(None);
        };
        match feature.geometry.coordinates.as_slice() {
            [longitude, latitude, ..] => Coordinate::new(*longitude, *latitude)
                .map(Some)
                .map_err(|error| format!("feature geometry out of range: {error}")),
            other => Err(format!(
                "feature geometry needs two coordinates, got {}",
                other.len()
            )),
        }
    }
}
