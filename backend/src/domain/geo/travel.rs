//! Per-participant travel constraints.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::GeoValidationError;

/// Longest travel budget an isochrone may be requested for.
pub const MAX_TRAVEL_MINUTES: u32 = 180;

/// Travel-time budget in whole minutes, `1..=MAX_TRAVEL_MINUTES`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct TravelBudget(u32);

impl TravelBudget {
    pub fn new(minutes: u32) -> Result<Self, GeoValidationError> {
        if minutes == 0 || minutes > MAX_TRAVEL_MINUTES {
            return Err(GeoValidationError::TravelTime {
                minutes,
                max: MAX_TRAVEL_MINUTES,
            });
        }
        Ok(Self(minutes))
    }

    pub fn minutes(self) -> u32 {
        self.0
    }

    /// Budget expressed in seconds, the unit isochrone providers expect.
    pub fn seconds(self) -> u32 {
        self.0 * 60
    }
}

impl TryFrom<u32> for TravelBudget {
    type Error = GeoValidationError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TravelBudget> for u32 {
    fn from(value: TravelBudget) -> Self {
        value.0
    }
}

/// Transport mode in the isochrone provider's vocabulary, e.g. `walking`,
/// `driving`, `public_transport`, or `cycling`. Passed through verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TransportMode(String);

impl TransportMode {
    pub fn new(mode: impl Into<String>) -> Result<Self, GeoValidationError> {
        let mode = mode.into();
        let trimmed = mode.trim();
        if trimmed.is_empty() {
            return Err(GeoValidationError::EmptyTransportMode);
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for TransportMode {
    type Error = GeoValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TransportMode> for String {
    fn from(value: TransportMode) -> Self {
        value.0
    }
}
