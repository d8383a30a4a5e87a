//! Mapbox outbound adapters.
//!
//! This module provides a thin HTTP implementation of the `Geocoder` port on
//! top of the Mapbox v6 forward geocoding endpoint.

mod dto;
mod http_geocoder;

pub use http_geocoder::MapboxGeocoder;
