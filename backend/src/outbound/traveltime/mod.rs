//! TravelTime outbound adapters.
//!
//! This module provides a thin HTTP implementation of the `IsochroneSource`
//! port on top of the TravelTime `time-map/fast` endpoint.

mod dto;
mod http_source;

pub use http_source::{TravelTimeCredentials, TravelTimeIsochrones};
