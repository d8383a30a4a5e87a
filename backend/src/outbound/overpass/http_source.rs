//! Reqwest-backed Overpass venue source.
//!
//! This adapter owns transport details only: query construction, timeout and
//! HTTP error mapping, and JSON decoding into domain venues.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use tracing::debug;

use super::dto::OverpassResponseDto;
use crate::domain::Venue;
use crate::domain::ports::{GeoProviderError, VenueSearchRequest, VenueSource};
use crate::outbound::http_errors::{map_status_error, map_transport_error};

const PROVIDER: &str = "overpass";
const DEFAULT_OVERPASS_QUERY_TIMEOUT_SECONDS: u32 = 25;
const DEFAULT_USER_AGENT: &str = "meetsync-venue-search/0.1";
const DEFAULT_CONTACT: &str = "ops@meetsync.invalid";
/// Tag key used for categories given without one.
const DEFAULT_CATEGORY_KEY: &str = "amenity";

/// Outbound identity and query timeout settings for Overpass requests.
#[derive(Debug, Clone)]
pub struct OverpassHttpIdentity {
    /// HTTP user-agent sent to Overpass.
    pub user_agent: String,
    /// Contact header value sent to Overpass.
    pub contact: String,
    /// Timeout directive embedded in Overpass query text.
    pub query_timeout_seconds: u32,
}

impl Default for OverpassHttpIdentity {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            contact: DEFAULT_CONTACT.to_owned(),
            query_timeout_seconds: DEFAULT_OVERPASS_QUERY_TIMEOUT_SECONDS,
        }
    }
}

/// Venue source that performs HTTP POST requests against one Overpass endpoint.
pub struct OverpassVenues {
    client: Client,
    endpoint: Url,
    identity: OverpassHttpIdentity,
}

impl OverpassVenues {
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        endpoint: Url,
        timeout: Duration,
        identity: OverpassHttpIdentity,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            identity: OverpassHttpIdentity {
                query_timeout_seconds: identity.query_timeout_seconds.max(1),
                ..identity
            },
        })
    }
}

#[async_trait]
impl VenueSource for OverpassVenues {
    async fn nearby(&self, request: &VenueSearchRequest) -> Result<Vec<Venue>, GeoProviderError> {
        let query = build_overpass_query(request, self.identity.query_timeout_seconds)?;
        debug!(
            provider = PROVIDER,
            category = request.category.as_str(),
            radius_meters = request.radius_meters,
            "searching venues"
        );
        let response = self
            .client
            .post(self.endpoint.clone())
            .header(reqwest::header::USER_AGENT, self.identity.user_agent.as_str())
            .header("Contact", self.identity.contact.as_str())
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&[("data", query)])
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(PROVIDER, status, body.as_ref(), None));
        }

        let mut venues = parse_venues(body.as_ref())?;
        venues.truncate(request.max_results);
        Ok(venues)
    }
}

fn parse_venues(body: &[u8]) -> Result<Vec<Venue>, GeoProviderError> {
    let decoded: OverpassResponseDto = serde_json::from_slice(body).map_err(|error| {
        GeoProviderError::decode(format!("invalid Overpass JSON payload: {error}"))
    })?;
    decoded.into_venues().map_err(GeoProviderError::decode)
}

fn build_overpass_query(
    request: &VenueSearchRequest,
    query_timeout_seconds: u32,
) -> Result<String, GeoProviderError> {
    if !request.radius_meters.is_finite() || request.radius_meters <= 0.0 {
        return Err(GeoProviderError::invalid_request(
            "search radius must be a positive distance",
        ));
    }
    if request.max_results == 0 {
        return Err(GeoProviderError::invalid_request(
            "max results must be at least one",
        ));
    }
    let selector = build_tag_selector(&request.category)?;
    let around = format!(
        "(around:{radius:.1},{lat},{lng})",
        radius = request.radius_meters,
        lat = request.center.latitude(),
        lng = request.center.longitude(),
    );

    let lines = ["node", "way", "relation"]
        .into_iter()
        .map(|element_type| format!("  {element_type}{selector}[\"name\"]{around};"))
        .collect::<Vec<_>>();

    Ok(format!(
        "[out:json][timeout:{query_timeout_seconds}];\n(\n{query_lines}\n);\nout center tags {limit};",
        limit = request.max_results,
        query_lines = lines.join("\n")
    ))
}

/// `restaurant` selects `amenity=restaurant`; `key=value` is used verbatim.
fn build_tag_selector(category: &str) -> Result<String, GeoProviderError> {
    let trimmed = category.trim();
    if trimmed.is_empty() {
        return Err(GeoProviderError::invalid_request(
            "venue category must not be blank",
        ));
    }

    let (key, value) = match trimmed.split_once('=') {
        Some((key, value)) => (key.trim(), value.trim()),
        None => (DEFAULT_CATEGORY_KEY, trimmed),
    };
    if key.is_empty() || value.is_empty() {
        return Err(GeoProviderError::invalid_request(
            "venue category must be `value` or `key=value`",
        ));
    }
    Ok(format!(
        "[\"{}\"=\"{}\"]",
        escape_quoted(key),
        escape_quoted(value)
    ))
}

fn escape_quoted(raw: &str) -> String {
    raw.replace('\\', r"\\").replace('"', "\\\"")
}
