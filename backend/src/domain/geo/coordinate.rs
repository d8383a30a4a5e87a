//! WGS84 coordinate value object.

use geo::Point;
use serde::{Deserialize, Serialize};

use super::GeoValidationError;

/// Fixed degrees-to-meters conversion used for search radii.
pub const METERS_PER_DEGREE: f64 = 111_320.0;

/// Validated longitude/latitude pair.
///
/// # Examples
///
/// ```rust
/// let point = backend::domain::geo::Coordinate::new(-0.1276, 51.5072)?;
/// assert_eq!(point.longitude(), -0.1276);
/// assert!(backend::domain::geo::Coordinate::new(0.0, 91.0).is_err());
/// Ok::<(), backend::domain::geo::GeoValidationError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coordinate {
    longitude: f64,
    latitude: f64,
}

impl Coordinate {
    /// Creates a validated coordinate.
    pub fn new(longitude: f64, latitude: f64) -> Result<Self, GeoValidationError> {
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(GeoValidationError::OutOfRange {
                field: "longitude",
                value: longitude,
            });
        }
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(GeoValidationError::OutOfRange {
                field: "latitude",
                value: latitude,
            });
        }
        Ok(Self {
            longitude,
            latitude,
        })
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Planar point with longitude on the x axis.
    pub fn to_point(self) -> Point<f64> {
        Point::new(self.longitude, self.latitude)
    }
}

impl TryFrom<Point<f64>> for Coordinate {
    type Error = GeoValidationError;

    fn try_from(value: Point<f64>) -> Result<Self, Self::Error> {
        Self::new(value.x(), value.y())
    }
}
