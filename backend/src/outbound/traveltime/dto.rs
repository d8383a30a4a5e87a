//! Request and response DTOs for the TravelTime `time-map/fast` endpoint.

use geo::{LineString, MultiPolygon, Polygon};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub(super) struct TimeMapRequestDto<'a> {
    pub(super) arrival_searches: ArrivalSearchesDto<'a>,
}

#[derive(Debug, Serialize)]
pub(super) struct ArrivalSearchesDto<'a> {
    pub(super) one_to_many: Vec<SearchDto<'a>>,
}

#[derive(Debug, Serialize)]
pub(super) struct SearchDto<'a> {
    pub(super) id: &'a str,
    pub(super) coords: CoordsDto,
    pub(super) transportation: TransportationDto<'a>,
    /// Seconds.
    pub(super) travel_time: u32,
    pub(super) arrival_time_period: &'a str,
    pub(super) level_of_detail: LevelOfDetailDto<'a>,
    pub(super) no_holes: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub(super) struct CoordsDto {
    pub(super) lat: f64,
    pub(super) lng: f64,
}

#[derive(Debug, Serialize)]
pub(super) struct TransportationDto<'a> {
    #[serde(rename = "type")]
    pub(super) kind: &'a str,
}

#[derive(Debug, Serialize)]
pub(super) struct LevelOfDetailDto<'a> {
    pub(super) scale_type: &'a str,
    pub(super) level: &'a str,
}

#[derive(Debug, Deserialize)]
pub(super) struct TimeMapResponseDto {
    #[serde(default)]
    pub(super) results: Vec<SearchResultDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct SearchResultDto {
    pub(super) search_id: String,
    #[serde(default)]
    pub(super) shapes: Vec<ShapeDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ShapeDto {
    pub(super) shell: Vec<CoordsDto>,
    #[serde(default)]
    pub(super) holes: Vec<Vec<CoordsDto>>,
}

/// Error payload returned with non-success statuses.
#[derive(Debug, Deserialize)]
pub(super) struct TravelTimeErrorDto {
    pub(super) error_code: Option<i64>,
    pub(super) description: Option<String>,
}

impl TravelTimeErrorDto {
    pub(super) fn summary(self) -> Option<String> {
        match (self.error_code, self.description) {
            (Some(code), Some(description)) => Some(format!("error {code}: {description}")),
            (None, Some(description)) => Some(description),
            (Some(code), None) => Some(format!("error {code}")),
            (None, None) => None,
        }
    }
}

impl TimeMapResponseDto {
    /// Shapes for `search_id` as one multi-polygon.
    pub(super) fn into_area(self, search_id: &str) -> Result<MultiPolygon<f64>, String> {
        let result = self
            .results
            .into_iter()
            .find(|result| result.search_id == search_id)
            .ok_or_else(|| format!("response has no result for search {search_id}"))?;
        let polygons = result
            .shapes
            .into_iter()
            .map(ShapeDto::into_polygon)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(MultiPolygon::new(polygons))
    }
}

impl ShapeDto {
    fn into_polygon(self) -> Result<Polygon<f64>, String> {
        if self.shell.len() < 3 {
            return Err(format!(
                "shape shell needs at least three points, got {}",
                self.shell.len()
            ));
        }
        let holes = self.holes.into_iter().map(ring).collect();
        Ok(Polygon::new(ring(self.shell), holes))
    }
}

fn ring(points: Vec<CoordsDto>) -> LineString<f64> {
    points
        .into_iter()
        .map(|point| (point.lng, point.lat))
        .collect::<Vec<_>>()
        .into()
}
