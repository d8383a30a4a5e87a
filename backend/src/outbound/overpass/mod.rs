//! Overpass outbound adapters.
//!
//! This module provides a thin HTTP implementation of the `VenueSource` port
//! using an `around:` radius query.

mod dto;
mod http_source;

pub use http_source::{OverpassHttpIdentity, OverpassVenues};
