//! Error shared by the geocoding, isochrone, and venue provider ports.

use super::define_port_error;

define_port_error! {
    /// Errors surfaced while calling an external geospatial provider.
    pub enum GeoProviderError {
        /// Network transport failed before receiving a response.
        Transport { message: String } =>
            "provider transport failed: {message}",
        /// Provider call exceeded its timeout.
        Timeout { message: String } =>
            "provider timeout: {message}",
        /// Provider rate-limited the request.
        RateLimited { message: String } =>
            "provider rate limited request: {message}",
        /// Provider response could not be decoded.
        Decode { message: String } =>
            "provider response decode failed: {message}",
        /// Provider or adapter rejected the request.
        InvalidRequest { message: String } =>
            "provider request invalid: {message}",
    }
}

impl GeoProviderError {
    /// Whether a caller-initiated retry could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. } | Self::Timeout { .. } | Self::RateLimited { .. }
        )
    }
}
