//! DTOs for decoding Overpass JSON responses.
//!
//! The adapter decodes into these transport DTOs first, then maps named
//! elements into domain venues in one pass.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::domain::Venue;
use crate::domain::geo::Coordinate;

#[derive(Debug, Deserialize)]
pub(super) struct OverpassResponseDto {
    #[serde(default)]
    pub(super) elements: Vec<OverpassElementDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct OverpassElementDto {
    #[serde(rename = "type")]
    pub(super) element_type: String,
    pub(super) id: i64,
    pub(super) lon: Option<f64>,
    pub(super) lat: Option<f64>,
    pub(super) center: Option<OverpassElementCenterDto>,
    #[serde(default)]
    pub(super) tags: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct OverpassElementCenterDto {
    pub(super) lon: f64,
    pub(super) lat: f64,
}

impl OverpassResponseDto {
    /// Named elements as venues, in response order. Unnamed elements are
    /// skipped.
    pub(super) fn into_venues(self) -> Result<Vec<Venue>, String> {
        self.elements
            .into_iter()
            .filter_map(OverpassElementDto::into_venue)
            .collect()
    }
}

impl OverpassElementDto {
    fn into_venue(self) -> Option<Result<Venue, String>> {
        let name = self.tags.get("name")?.trim().to_owned();
        if name.is_empty() {
            return None;
        }
        Some(self.located(name))
    }

    fn located(&self, name: String) -> Result<Venue, String> {
        let (longitude, latitude) = self.coordinates().ok_or_else(|| {
            format!(
                "element {} ({}) missing coordinates",
                self.id, self.element_type
            )
        })?;
        let location = Coordinate::new(longitude, latitude).map_err(|error| {
            format!("element {} ({}) {error}", self.id, self.element_type)
        })?;
        let address = self
            .address()
            .unwrap_or_else(|| format!("{latitude:.5}, {longitude:.5}"));
        Ok(Venue {
            name,
            address,
            location,
        })
    }

    fn coordinates(&self) -> Option<(f64, f64)> {
        if let (Some(longitude), Some(latitude)) = (self.lon, self.lat) {
            return Some((longitude, latitude));
        }
        self.center.as_ref().map(|center| (center.lon, center.lat))
    }

    /// `addr:*` tags joined as "12 High Street, London, N1 9GU".
    fn address(&self) -> Option<String> {
        let tag = |key: &str| {
            self.tags
                .get(key)
                .map(|value| value.trim())
                .filter(|value| !value.is_empty())
        };
        let street = match (tag("addr:housenumber"), tag("addr:street")) {
            (Some(number), Some(street)) => Some(format!("{number} {street}")),
            (None, Some(street)) => Some(street.to_owned()),
            _ => None,
        };
        let parts: Vec<String> = street
            .into_iter()
            .chain(
                [tag("addr:city"), tag("addr:postcode")]
                    .into_iter()
                    .flatten()
                    .map(str::to_owned),
            )
            .collect();
        (!parts.is_empty()).then(|| parts.join(", "))
    }
}
