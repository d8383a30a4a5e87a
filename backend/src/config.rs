//! Runtime settings loaded via OrthoConfig.
//!
//! Every value can come from `MEETSYNC_*` environment variables or a
//! configuration file. Unset values fall back to the public provider endpoints
//! and the defaults below.

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

use crate::domain::{DEFAULT_MAX_VENUES, DEFAULT_VENUE_CATEGORY, VenueQuery};
use crate::outbound::persistence::PoolConfig;

const DEFAULT_MAPBOX_ENDPOINT: &str = "https://api.mapbox.com/search/geocode/v6/forward";
const DEFAULT_TRAVELTIME_ENDPOINT: &str = "https://api.traveltimeapp.com/v4/time-map/fast";
const DEFAULT_OVERPASS_ENDPOINT: &str = "https://overpass-api.de/api/interpreter";
const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 15;
const DEFAULT_POOL_MAX_SIZE: u32 = 10;

/// Settings that are missing or unusable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("{name} must be set")]
    Missing { name: &'static str },

    #[error("{name} is not a valid URL: {message}")]
    InvalidUrl { name: &'static str, message: String },
}

/// Database, provider, and venue search settings.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "MEETSYNC")]
pub struct MeetsyncSettings {
    /// PostgreSQL connection URL.
    pub database_url: Option<String>,
    /// Upper bound on pooled database connections.
    pub pool_max_size: Option<u32>,
    /// Mapbox forward geocoding endpoint.
    pub mapbox_endpoint: Option<String>,
    /// Mapbox access token.
    pub mapbox_token: Option<String>,
    /// TravelTime `time-map/fast` endpoint.
    pub traveltime_endpoint: Option<String>,
    pub traveltime_app_id: Option<String>,
    pub traveltime_api_key: Option<String>,
    /// Overpass interpreter endpoint.
    pub overpass_endpoint: Option<String>,
    /// Per-request HTTP timeout for every provider, in seconds.
    pub provider_timeout_secs: Option<u64>,
    /// Venue category searched around the meeting area.
    pub venue_category: Option<String>,
    /// Maximum number of venues kept per recommendation run.
    pub max_venues: Option<usize>,
}

impl MeetsyncSettings {
    /// # Errors
    ///
    /// Returns [`SettingsError::Missing`] when no database URL is configured.
    pub fn pool_config(&self) -> Result<PoolConfig, SettingsError> {
        let url = required("MEETSYNC_DATABASE_URL", self.database_url.as_deref())?;
        Ok(PoolConfig::new(url)
            .with_max_size(self.pool_max_size.unwrap_or(DEFAULT_POOL_MAX_SIZE)))
    }

    /// # Errors
    ///
    /// Returns [`SettingsError::Missing`] when no database URL is configured.
    pub fn database_url(&self) -> Result<&str, SettingsError> {
        required("MEETSYNC_DATABASE_URL", self.database_url.as_deref())
    }

    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidUrl`] for a malformed override.
    pub fn mapbox_endpoint(&self) -> Result<Url, SettingsError> {
        endpoint(
            "MEETSYNC_MAPBOX_ENDPOINT",
            self.mapbox_endpoint.as_deref(),
            DEFAULT_MAPBOX_ENDPOINT,
        )
    }

    /// # Errors
    ///
    /// Returns [`SettingsError::Missing`] when no token is configured.
    pub fn mapbox_token(&self) -> Result<&str, SettingsError> {
        required("MEETSYNC_MAPBOX_TOKEN", self.mapbox_token.as_deref())
    }

    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidUrl`] for a malformed override.
    pub fn traveltime_endpoint(&self) -> Result<Url, SettingsError> {
        endpoint(
            "MEETSYNC_TRAVELTIME_ENDPOINT",
            self.traveltime_endpoint.as_deref(),
            DEFAULT_TRAVELTIME_ENDPOINT,
        )
    }

    /// Application id and API key, both required.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Missing`] naming the first absent value.
    pub fn traveltime_credentials(&self) -> Result<(&str, &str), SettingsError> {
        Ok((
            required("MEETSYNC_TRAVELTIME_APP_ID", self.traveltime_app_id.as_deref())?,
            required("MEETSYNC_TRAVELTIME_API_KEY", self.traveltime_api_key.as_deref())?,
        ))
    }

    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidUrl`] for a malformed override.
    pub fn overpass_endpoint(&self) -> Result<Url, SettingsError> {
        endpoint(
            "MEETSYNC_OVERPASS_ENDPOINT",
            self.overpass_endpoint.as_deref(),
            DEFAULT_OVERPASS_ENDPOINT,
        )
    }

    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(
            self.provider_timeout_secs
                .filter(|secs| *secs > 0)
                .unwrap_or(DEFAULT_PROVIDER_TIMEOUT_SECS),
        )
    }

    pub fn venue_query(&self) -> VenueQuery {
        VenueQuery {
            category: self
                .venue_category
                .as_deref()
                .map(str::trim)
                .filter(|category| !category.is_empty())
                .unwrap_or(DEFAULT_VENUE_CATEGORY)
                .to_owned(),
            max_results: self
                .max_venues
                .filter(|max| *max > 0)
                .unwrap_or(DEFAULT_MAX_VENUES),
        }
    }
}

fn required<'a>(name: &'static str, value: Option<&'a str>) -> Result<&'a str, SettingsError> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or(SettingsError::Missing { name })
}

fn endpoint(
    name: &'static str,
    configured: Option<&str>,
    default: &str,
) -> Result<Url, SettingsError> {
    let raw = configured
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(default);
    Url::parse(raw).map_err(|err| SettingsError::InvalidUrl {
        name,
        message: err.to_string(),
    })
}
