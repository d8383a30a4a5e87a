//! Planar geometry for meetup-location recommendations.
//!
//! Isochrones arrive as WGS84 multi-polygons. Every operation here treats
//! longitude and latitude as planar axes, which is adequate at city scale.

mod containment;
mod coordinate;
mod enclosing_circle;
mod overlap;
mod travel;

pub use containment::venues_within;
pub use coordinate::{Coordinate, METERS_PER_DEGREE};
pub use enclosing_circle::{EnclosingCircle, enclosing_circle};
pub use overlap::{intersect_all, is_empty_region};
pub use travel::{MAX_TRAVEL_MINUTES, TransportMode, TravelBudget};

/// Validation errors for geographic value objects.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeoValidationError {
    #[error("{field} must be a finite value within range, got {value}")]
    OutOfRange { field: &'static str, value: f64 },
    #[error("travel time must be between 1 and {max} minutes, got {minutes}")]
    TravelTime { minutes: u32, max: u32 },
    #[error("transport mode must not be empty")]
    EmptyTransportMode,
}

#[cfg(test)]
mod tests;
