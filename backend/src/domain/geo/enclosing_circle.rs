//! Search circle around the feasible meetup region.

use geo::{Area, Centroid, MultiPolygon, Polygon};

use super::{Coordinate, GeoValidationError, METERS_PER_DEGREE};

/// Circle used to scope the venue search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnclosingCircle {
    pub center: Coordinate,
    /// Radius in degrees on the planar approximation.
    pub radius_degrees: f64,
    /// Radius converted with [`METERS_PER_DEGREE`].
    pub radius_meters: f64,
}

/// Circle centred on the centroid of the largest sub-polygon, reaching its
/// furthest exterior vertex.
///
/// Returns `Ok(None)` for an empty region.
pub fn enclosing_circle(
    region: &MultiPolygon<f64>,
) -> Result<Option<EnclosingCircle>, GeoValidationError> {
    let Some(largest) = largest_polygon(region) else {
        return Ok(None);
    };
    let Some(centroid) = largest.centroid() else {
        return Ok(None);
    };

    let radius_degrees = largest
        .exterior()
        .coords()
        .map(|vertex| (vertex.x - centroid.x()).hypot(vertex.y - centroid.y()))
        .fold(0.0_f64, f64::max);

    Ok(Some(EnclosingCircle {
        center: Coordinate::try_from(centroid)?,
        radius_degrees,
        radius_meters: radius_degrees * METERS_PER_DEGREE,
    }))
}

fn largest_polygon(region: &MultiPolygon<f64>) -> Option<&Polygon<f64>> {
    region
        .0
        .iter()
        .max_by(|a, b| a.unsigned_area().total_cmp(&b.unsigned_area()))
}
