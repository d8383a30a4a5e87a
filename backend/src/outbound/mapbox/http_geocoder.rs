//! Reqwest-backed Mapbox forward geocoder.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use tracing::debug;

use super::dto::{FeatureCollectionDto, MapboxErrorDto};
use crate::domain::geo::Coordinate;
use crate::domain::ports::{GeoProviderError, Geocoder};
use crate::outbound::http_errors::{map_status_error, map_transport_error};

const PROVIDER: &str = "mapbox";

/// Geocoder that resolves one street address per request.
pub struct MapboxGeocoder {
    client: Client,
    endpoint: Url,
    access_token: String,
}

impl MapboxGeocoder {
    /// Build a geocoder against `endpoint`, normally
    /// `https://api.mapbox.com/search/geocode/v6/forward`.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        endpoint: Url,
        access_token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            access_token: access_token.into(),
        })
    }
}

#[async_trait]
impl Geocoder for MapboxGeocoder {
    async fn geocode(&self, address: &str) -> Result<Option<Coordinate>, GeoProviderError> {
        let query = address.trim();
        if query.is_empty() {
            return Err(GeoProviderError::invalid_request(
                "address must not be blank",
            ));
        }

        debug!(provider = PROVIDER, "geocoding address");
        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&[
                ("q", query),
                ("types", "address"),
                ("limit", "1"),
                ("access_token", self.access_token.as_str()),
            ])
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            let detail = serde_json::from_slice::<MapboxErrorDto>(&body)
                .ok()
                .and_then(|error| error.message);
            return Err(map_status_error(PROVIDER, status, &body, detail));
        }
        parse_best_match(&body)
    }
}

fn parse_best_match(body: &[u8]) -> Result<Option<Coordinate>, GeoProviderError> {
    let decoded: FeatureCollectionDto = serde_json::from_slice(body).map_err(|error| {
        GeoProviderError::decode(format!("invalid Mapbox JSON payload: {error}"))
    })?;
    decoded.into_best_match().map_err(GeoProviderError::decode)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_feature_wins() {
        let body = r#"{
            "type": "FeatureCollection",
            "features": [
                { "type": "Feature", "geometry": { "type": "Point", "coordinates": [-0.1276, 51.5072] } },
                { "type": "Feature", "geometry": { "type": "Point", "coordinates": [2.35, 48.85] } }
            ]
        }"#;

        let found = parse_best_match(body.as_bytes())
            .expect("decodes")
            .expect("match");

        assert_eq!(found.longitude(), -0.1276);
        assert_eq!(found.latitude(), 51.5072);
    }

    #[test]
    fn no_features_means_no_match() {
        let found = parse_best_match(br#"{"type":"FeatureCollection","features":[]}"#)
            .expect("decodes");

        assert_eq!(found, None);
    }

    #[test]
    fn short_geometry_is_a_decode_error() {
        let body = br#"{"features":[{"geometry":{"coordinates":[1.0]}}]}"#;

        let error = parse_best_match(body).expect_err("decode should fail");

        assert!(matches!(error, GeoProviderError::Decode { .. }));
    }

    #[test]
    fn out_of_range_geometry_is_a_decode_error() {
        let body = br#"{"features":[{"geometry":{"coordinates":[10.0, 95.0]}}]}"#;

        let error = parse_best_match(body).expect_err("decode should fail");

        assert!(matches!(error, GeoProviderError::Decode { .. }));
    }

    #[tokio::test]
    async fn blank_addresses_are_rejected_before_any_request() {
        let endpoint = Url::parse("http://127.0.0.1:9/forward").expect("url");
        let geocoder =
            MapboxGeocoder::new(endpoint, "token", Duration::from_millis(50)).expect("client");

        let error = geocoder.geocode("   ").await.expect_err("blank address");

        assert!(matches!(error, GeoProviderError::InvalidRequest { .. }));
    }
}
