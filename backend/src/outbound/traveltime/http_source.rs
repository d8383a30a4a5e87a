//! Reqwest-backed TravelTime isochrone adapter.
//!
//! Each port call posts a single arrival search and decodes its shapes into
//! one multi-polygon with longitude on the x axis.

use std::time::Duration;

use async_trait::async_trait;
use geo::MultiPolygon;
use reqwest::{Client, Url};
use tracing::debug;

use super::dto::{
    ArrivalSearchesDto, CoordsDto, LevelOfDetailDto, SearchDto, TimeMapRequestDto,
    TimeMapResponseDto, TransportationDto, TravelTimeErrorDto,
};
use crate::domain::ports::{GeoProviderError, IsochroneRequest, IsochroneSource};
use crate::outbound::http_errors::{map_status_error, map_transport_error};

const PROVIDER: &str = "traveltime";
const SEARCH_ID: &str = "isochrone-0";
const ARRIVAL_TIME_PERIOD: &str = "weekday_morning";
const DETAIL_SCALE: &str = "simple";
const DETAIL_LEVEL: &str = "medium";

/// Application id and key sent with every request.
#[derive(Debug, Clone)]
pub struct TravelTimeCredentials {
    pub application_id: String,
    pub api_key: String,
}

/// Isochrone source backed by `time-map/fast`.
pub struct TravelTimeIsochrones {
    client: Client,
    endpoint: Url,
    credentials: TravelTimeCredentials,
}

impl TravelTimeIsochrones {
    /// Build an adapter against `endpoint`, normally
    /// `https://api.traveltimeapp.com/v4/time-map/fast`.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        endpoint: Url,
        credentials: TravelTimeCredentials,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            credentials,
        })
    }
}

fn build_request(request: &IsochroneRequest) -> TimeMapRequestDto<'_> {
    TimeMapRequestDto {
        arrival_searches: ArrivalSearchesDto {
            one_to_many: vec![SearchDto {
                id: SEARCH_ID,
                coords: CoordsDto {
                    lat: request.origin.latitude(),
                    lng: request.origin.longitude(),
                },
                transportation: TransportationDto {
                    kind: request.transport.as_str(),
                },
                travel_time: request.budget.seconds(),
                arrival_time_period: ARRIVAL_TIME_PERIOD,
                level_of_detail: LevelOfDetailDto {
                    scale_type: DETAIL_SCALE,
                    level: DETAIL_LEVEL,
                },
                no_holes: false,
            }],
        },
    }
}

fn parse_area(body: &[u8]) -> Result<MultiPolygon<f64>, GeoProviderError> {
    let decoded: TimeMapResponseDto = serde_json::from_slice(body).map_err(|error| {
        GeoProviderError::decode(format!("invalid TravelTime JSON payload: {error}"))
    })?;
    decoded
        .into_area(SEARCH_ID)
        .map_err(GeoProviderError::decode)
}

#[async_trait]
impl IsochroneSource for TravelTimeIsochrones {
    async fn isochrone(
        &self,
        request: &IsochroneRequest,
    ) -> Result<MultiPolygon<f64>, GeoProviderError> {
        debug!(
            provider = PROVIDER,
            transport = %request.transport,
            minutes = request.budget.minutes(),
            "requesting isochrone"
        );
        let response = self
            .client
            .post(self.endpoint.clone())
            .header("X-Application-Id", self.credentials.application_id.as_str())
            .header("X-Api-Key", self.credentials.api_key.as_str())
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&build_request(request))
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            let detail = serde_json::from_slice::<TravelTimeErrorDto>(&body)
                .ok()
                .and_then(TravelTimeErrorDto::summary);
            return Err(map_status_error(PROVIDER, status, &body, detail));
        }
        parse_area(&body)
    }
}

#[cfg(test)]
mod tests {
    use geo::Area;
    use serde_json::json;

    use super::*;
    use crate::domain::geo::{Coordinate, TransportMode, TravelBudget};

    fn request() -> IsochroneRequest {
        IsochroneRequest {
            origin: Coordinate::new(-0.1276, 51.5072).expect("coordinate"),
            budget: TravelBudget::new(45).expect("budget"),
            transport: TransportMode::new("public_transport").expect("mode"),
        }
    }

    #[test]
    fn request_body_uses_seconds_and_lat_lng_order() {
        let request = request();

        let body = serde_json::to_value(build_request(&request)).expect("serialises");

        assert_eq!(
            body,
            json!({
                "arrival_searches": {
                    "one_to_many": [{
                        "id": "isochrone-0",
                        "coords": { "lat": 51.5072, "lng": -0.1276 },
                        "transportation": { "type": "public_transport" },
                        "travel_time": 2700,
                        "arrival_time_period": "weekday_morning",
                        "level_of_detail": { "scale_type": "simple", "level": "medium" },
                        "no_holes": false
                    }]
                }
            })
        );
    }

    #[test]
    fn shapes_decode_into_one_area_with_holes() {
        let body = json!({
            "results": [{
                "search_id": "isochrone-0",
                "shapes": [
                    {
                        "shell": [
                            { "lat": 0.0, "lng": 0.0 },
                            { "lat": 0.0, "lng": 4.0 },
                            { "lat": 4.0, "lng": 4.0 },
                            { "lat": 4.0, "lng": 0.0 }
                        ],
                        "holes": [[
                            { "lat": 1.0, "lng": 1.0 },
                            { "lat": 1.0, "lng": 2.0 },
                            { "lat": 2.0, "lng": 2.0 },
                            { "lat": 2.0, "lng": 1.0 }
                        ]]
                    },
                    {
                        "shell": [
                            { "lat": 10.0, "lng": 10.0 },
                            { "lat": 10.0, "lng": 11.0 },
                            { "lat": 11.0, "lng": 11.0 }
                        ]
                    }
                ]
            }]
        })
        .to_string();

        let area = parse_area(body.as_bytes()).expect("decodes");

        assert_eq!(area.0.len(), 2);
        assert!((area.unsigned_area() - 15.5).abs() < 1e-9);
    }

    #[test]
    fn missing_result_is_a_decode_error() {
        let error = parse_area(br#"{"results":[]}"#).expect_err("no result");

        assert!(matches!(error, GeoProviderError::Decode { .. }));
    }

    #[test]
    fn degenerate_shells_are_rejected() {
        let body = br#"{"results":[{"search_id":"isochrone-0","shapes":[{"shell":[{"lat":0,"lng":0}]}]}]}"#;

        let error = parse_area(body).expect_err("degenerate shell");

        assert!(matches!(error, GeoProviderError::Decode { .. }));
    }

    #[test]
    fn error_payload_is_summarised() {
        let dto: TravelTimeErrorDto = serde_json::from_str(
            r#"{"http_status":422,"error_code":4,"description":"travel_time must be at most 14400"}"#,
        )
        .expect("decodes");

        assert_eq!(
            dto.summary().as_deref(),
            Some("error 4: travel_time must be at most 14400")
        );
    }
}
