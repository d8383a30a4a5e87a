//! Venues and the place recommendations produced from them.

use serde::{Deserialize, Serialize};

use super::geo::Coordinate;
use super::{HangoutId, RecommendationId};

/// Point of interest returned by a venue provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Venue {
    pub name: String,
    pub address: String,
    pub location: Coordinate,
}

/// Stored recommendation for a hangout.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceRecommendation {
    pub id: RecommendationId,
    pub hangout_id: HangoutId,
    pub name: String,
    pub address: String,
    pub location: Coordinate,
}
