//! Status and transport error mapping shared by the HTTP provider adapters.

use reqwest::StatusCode;

use crate::domain::ports::GeoProviderError;

const PREVIEW_CHAR_LIMIT: usize = 160;

pub(crate) fn map_transport_error(error: reqwest::Error) -> GeoProviderError {
    if error.is_timeout() {
        GeoProviderError::timeout(error.to_string())
    } else if error.is_decode() {
        GeoProviderError::decode(error.to_string())
    } else {
        GeoProviderError::transport(error.to_string())
    }
}

/// Map a non-success status to a provider error. `detail` replaces the raw
/// body preview when the adapter could decode the provider's error payload.
pub(crate) fn map_status_error(
    provider: &str,
    status: StatusCode,
    body: &[u8],
    detail: Option<String>,
) -> GeoProviderError {
    let detail = detail.unwrap_or_else(|| body_preview(body));
    let message = if detail.is_empty() {
        format!("{provider} status {}", status.as_u16())
    } else {
        format!("{provider} status {}: {detail}", status.as_u16())
    };

    match status {
        StatusCode::TOO_MANY_REQUESTS => GeoProviderError::rate_limited(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            GeoProviderError::timeout(message)
        }
        _ if status.is_client_error() => GeoProviderError::invalid_request(message),
        _ => GeoProviderError::transport(message),
    }
}

/// Whitespace-collapsed prefix of a response body.
pub(crate) fn body_preview(body: &[u8]) -> String {
    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::rate_limited(StatusCode::TOO_MANY_REQUESTS, true)]
    #[case::request_timeout(StatusCode::REQUEST_TIMEOUT, true)]
    #[case::gateway_timeout(StatusCode::GATEWAY_TIMEOUT, true)]
    #[case::bad_request(StatusCode::BAD_REQUEST, false)]
    #[case::unauthorised(StatusCode::UNAUTHORIZED, false)]
    #[case::server_error(StatusCode::INTERNAL_SERVER_ERROR, true)]
    fn statuses_map_to_provider_errors(#[case] status: StatusCode, #[case] transient: bool) {
        let error = map_status_error("mapbox", status, b"{\"message\":\"nope\"}", None);

        assert_eq!(error.is_transient(), transient);
        match status {
            StatusCode::TOO_MANY_REQUESTS => {
                assert!(matches!(error, GeoProviderError::RateLimited { .. }));
            }
            StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
                assert!(matches!(error, GeoProviderError::Timeout { .. }));
            }
            StatusCode::INTERNAL_SERVER_ERROR => {
                assert!(matches!(error, GeoProviderError::Transport { .. }));
            }
            _ => assert!(matches!(error, GeoProviderError::InvalidRequest { .. })),
        }
    }

    #[test]
    fn decoded_detail_replaces_body_preview() {
        let error = map_status_error(
            "traveltime",
            StatusCode::UNPROCESSABLE_ENTITY,
            b"{\"error_code\":15}",
            Some("error 15: travel_time too large".to_owned()),
        );

        assert_eq!(
            error.to_string(),
            "provider request invalid: traveltime status 422: error 15: travel_time too large"
        );
    }

    #[test]
    fn empty_bodies_report_the_status_only() {
        let error = map_status_error("overpass", StatusCode::BAD_GATEWAY, b"  \n ", None);

        assert_eq!(
            error.to_string(),
            "provider transport failed: overpass status 502"
        );
    }

    #[test]
    fn long_bodies_are_truncated() {
        let body = "x ".repeat(200);

        let preview = body_preview(body.as_bytes());

        assert!(preview.ends_with("..."));
        assert_eq!(preview.chars().count(), PREVIEW_CHAR_LIMIT + 3);
    }
}
