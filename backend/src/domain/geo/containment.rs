//! Authoritative venue filter against the feasible region.

use geo::{Contains, MultiPolygon};

use crate::domain::Venue;

/// Keep venues strictly inside `region`. Points on the boundary are dropped.
pub fn venues_within(region: &MultiPolygon<f64>, venues: Vec<Venue>) -> Vec<Venue> {
    venues
        .into_iter()
        .filter(|venue| region.contains(&venue.location.to_point()))
        .collect()
}
