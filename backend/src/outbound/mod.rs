//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed repositories and notifier using Diesel
//! - **mapbox**: address geocoding
//! - **traveltime**: isochrone polygons
//! - **overpass**: venue search around a point
//!
//! Adapters are thin translators that convert between domain types and
//! infrastructure-specific representations. They contain no business logic.

pub(crate) mod http_errors;
pub mod mapbox;
pub mod overpass;
pub mod persistence;
pub mod traveltime;
