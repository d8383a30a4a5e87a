//! Tests for the recommendation pipeline.

use std::sync::Arc;

use geo::{MultiPolygon, Rect, coord};
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{
    GeoProviderError, MockGeocoder, MockHangoutRepository, MockIsochroneSource,
    MockRecommendationRepository, MockVenueSource,
};
use crate::domain::{
    ErrorCode, FlowStatus, Hangout, InviteStatus, LocationDetails, RecommendationId, UserId,
};

const BASE_LNG: f64 = -0.1276;
const BASE_LAT: f64 = 51.5072;

fn hangout(status: HangoutStatus) -> Hangout {
    Hangout {
        id: HangoutId::new(5),
        creator: UserId::random(),
        title: "Friday dinner".to_owned(),
        status,
        schedule: None,
        chosen_place: None,
    }
}

fn participant(address: &str, minutes: u32) -> Participant {
    Participant {
        hangout_id: HangoutId::new(5),
        user_id: UserId::random(),
        invite: InviteStatus::Accepted,
        flow: FlowStatus::SubmittedConfirmTime,
        location: Some(LocationDetails {
            address: address.to_owned(),
            transport: TransportMode::new("walking").expect("mode"),
            travel_minutes: minutes,
        }),
    }
}

/// Square of half-width `half` degrees centred on the base point plus offset.
fn area_around(dx: f64, dy: f64, half: f64) -> MultiPolygon<f64> {
    let (x, y) = (BASE_LNG + dx, BASE_LAT + dy);
    MultiPolygon::new(vec![
        Rect::new(
            coord! { x: x - half, y: y - half },
            coord! { x: x + half, y: y + half },
        )
        .to_polygon(),
    ])
}

fn offset(dx: f64, dy: f64) -> Coordinate {
    Coordinate::new(BASE_LNG + dx, BASE_LAT + dy).expect("valid coordinate")
}

fn venue(name: &str, at: Coordinate) -> Venue {
    Venue {
        name: name.to_owned(),
        address: format!("{name}, London"),
        location: at,
    }
}

#[fixture]
fn group() -> Vec<Participant> {
    vec![
        participant("1 West Rd", 30),
        participant("2 East Rd", 45),
        participant("3 North Rd", 20),
    ]
}

/// Geocoder mapping each of the three group addresses to a distinct offset.
fn geocoder() -> MockGeocoder {
    let mut geocoder = MockGeocoder::new();
    geocoder.expect_geocode().returning(|address| {
        Ok(match address {
            "1 West Rd" => Some(offset(-0.003, 0.0)),
            "2 East Rd" => Some(offset(0.003, 0.0)),
            "3 North Rd" => Some(offset(0.0, 0.003)),
            _ => None,
        })
    });
    geocoder
}

/// Isochrones centred on each origin with the given half-width.
fn isochrones(half: f64) -> MockIsochroneSource {
    let mut source = MockIsochroneSource::new();
    source.expect_isochrone().returning(move |request| {
        let dx = request.origin.longitude() - BASE_LNG;
        let dy = request.origin.latitude() - BASE_LAT;
        Ok(area_around(dx, dy, half))
    });
    source
}

fn hangouts_with(hangout: Hangout, participants: Vec<Participant>) -> MockHangoutRepository {
    let mut repo = MockHangoutRepository::new();
    repo.expect_find().return_once(move |_| Ok(Some(hangout)));
    repo.expect_participants()
        .return_once(move |_| Ok(participants));
    repo
}

fn stored_from(hangout_id: HangoutId, venues: &[Venue]) -> Vec<PlaceRecommendation> {
    venues
        .iter()
        .zip(1..)
        .map(|(venue, id)| PlaceRecommendation {
            id: RecommendationId::new(id),
            hangout_id,
            name: venue.name.clone(),
            address: venue.address.clone(),
            location: venue.location,
        })
        .collect()
}

fn service(
    hangouts: MockHangoutRepository,
    recommendations: MockRecommendationRepository,
    geocoder: MockGeocoder,
    isochrones: MockIsochroneSource,
    venues: MockVenueSource,
) -> RecommendationService {
    service_with_query(
        hangouts,
        recommendations,
        geocoder,
        isochrones,
        venues,
        VenueQuery::default(),
    )
}

fn service_with_query(
    hangouts: MockHangoutRepository,
    recommendations: MockRecommendationRepository,
    geocoder: MockGeocoder,
    isochrones: MockIsochroneSource,
    venues: MockVenueSource,
    query: VenueQuery,
) -> RecommendationService {
    RecommendationService::new(
        Arc::new(hangouts),
        Arc::new(recommendations),
        GeoPorts {
            geocoder: Arc::new(geocoder),
            isochrones: Arc::new(isochrones),
            venues: Arc::new(venues),
        },
        query,
    )
}

#[rstest]
#[tokio::test]
async fn overlapping_areas_yield_the_single_venue_inside(group: Vec<Participant>) {
    let inside = venue("Corner Bistro", offset(0.0, 0.001));
    let outside = venue("Harbour Grill", offset(0.005, 0.0));

    let mut venues = MockVenueSource::new();
    let candidates = vec![inside.clone(), outside];
    venues
        .expect_nearby()
        .withf(|request| {
            request.category == "restaurant"
                && request.max_results == 50
                && request.radius_meters > 0.0
                && request.radius_meters < 1_000.0
        })
        .times(1)
        .return_once(move |_| Ok(candidates));

    let mut recommendations = MockRecommendationRepository::new();
    recommendations
        .expect_replace()
        .withf(|_, venues| venues.len() == 1 && venues[0].name == "Corner Bistro")
        .times(1)
        .returning(|hangout_id, venues| Ok(stored_from(hangout_id, venues)));

    let service = service(
        hangouts_with(hangout(HangoutStatus::DeterminingLocation), group),
        recommendations,
        geocoder(),
        isochrones(0.004),
        venues,
    );

    let stored = service
        .recommend(HangoutId::new(5))
        .await
        .expect("recommendations stored");

    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].name, inside.name);
    assert_eq!(stored[0].location, inside.location);
}

#[rstest]
#[tokio::test]
async fn disjoint_areas_report_no_overlap_with_addresses(group: Vec<Participant>) {
    let mut venues = MockVenueSource::new();
    venues.expect_nearby().times(0);
    let mut recommendations = MockRecommendationRepository::new();
    recommendations.expect_replace().times(0);

    let service = service(
        hangouts_with(hangout(HangoutStatus::DeterminingLocation), group),
        recommendations,
        geocoder(),
        isochrones(0.001),
        venues,
    );

    let error = service
        .recommend(HangoutId::new(5))
        .await
        .expect_err("no overlap");

    assert_eq!(error.code(), ErrorCode::NoResult);
    assert!(error.message().contains("no overlap"));
    let details = error.details().expect("details present");
    assert_eq!(details["addresses"][2], "3 North Rd");
}

#[rstest]
#[tokio::test]
async fn travel_time_over_cap_fails_before_any_provider_call(mut group: Vec<Participant>) {
    if let Some(details) = group[1].location.as_mut() {
        details.travel_minutes = 181;
    }

    let mut geocoder = MockGeocoder::new();
    geocoder.expect_geocode().times(0);
    let mut isochrones = MockIsochroneSource::new();
    isochrones.expect_isochrone().times(0);
    let mut venues = MockVenueSource::new();
    venues.expect_nearby().times(0);
    let mut recommendations = MockRecommendationRepository::new();
    recommendations.expect_replace().times(0);

    let service = service(
        hangouts_with(hangout(HangoutStatus::DeterminingLocation), group),
        recommendations,
        geocoder,
        isochrones,
        venues,
    );

    let error = service
        .recommend(HangoutId::new(5))
        .await
        .expect_err("travel time rejected");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[case::confirm_time(HangoutStatus::ConfirmTime)]
#[case::confirm_meetup(HangoutStatus::ConfirmMeetup)]
#[tokio::test]
async fn wrong_status_is_rejected_without_writes(#[case] status: HangoutStatus) {
    let mut hangouts = MockHangoutRepository::new();
    hangouts
        .expect_find()
        .return_once(move |_| Ok(Some(hangout(status))));
    hangouts.expect_participants().times(0);
    let mut geocoder = MockGeocoder::new();
    geocoder.expect_geocode().times(0);
    let mut recommendations = MockRecommendationRepository::new();
    recommendations.expect_replace().times(0);

    let service = service(
        hangouts,
        recommendations,
        geocoder,
        MockIsochroneSource::new(),
        MockVenueSource::new(),
    );

    let error = service
        .recommend(HangoutId::new(5))
        .await
        .expect_err("state error");

    assert_eq!(error.code(), ErrorCode::InvalidState);
}

#[rstest]
#[tokio::test]
async fn unresolvable_address_is_a_validation_error(mut group: Vec<Participant>) {
    if let Some(details) = group[0].location.as_mut() {
        details.address = "Nowhere Lane".to_owned();
    }
    let mut recommendations = MockRecommendationRepository::new();
    recommendations.expect_replace().times(0);

    let service = service(
        hangouts_with(hangout(HangoutStatus::DeterminingLocation), group),
        recommendations,
        geocoder(),
        isochrones(0.004),
        MockVenueSource::new(),
    );

    let error = service
        .recommend(HangoutId::new(5))
        .await
        .expect_err("address unresolved");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    assert!(error.message().contains("Nowhere Lane"));
}

#[rstest]
#[tokio::test]
async fn provider_failures_surface_as_external_service_errors(group: Vec<Participant>) {
    let mut isochrones = MockIsochroneSource::new();
    isochrones
        .expect_isochrone()
        .returning(|_| Err(GeoProviderError::rate_limited("slow down")));

    let service = service(
        hangouts_with(hangout(HangoutStatus::DeterminingLocation), group),
        MockRecommendationRepository::new(),
        geocoder(),
        isochrones,
        MockVenueSource::new(),
    );

    let error = service
        .recommend(HangoutId::new(5))
        .await
        .expect_err("provider failure");

    assert_eq!(error.code(), ErrorCode::ExternalService);
    assert_eq!(error.details().expect("details")["transient"], true);
}

#[rstest]
#[tokio::test]
async fn venues_outside_the_overlap_count_as_no_result(group: Vec<Participant>) {
    let mut venues = MockVenueSource::new();
    venues
        .expect_nearby()
        .return_once(|_| Ok(vec![venue("Harbour Grill", offset(0.005, 0.0))]));
    let mut recommendations = MockRecommendationRepository::new();
    recommendations.expect_replace().times(0);

    let service = service(
        hangouts_with(hangout(HangoutStatus::DeterminingLocation), group),
        recommendations,
        geocoder(),
        isochrones(0.004),
        venues,
    );

    let error = service
        .recommend(HangoutId::new(5))
        .await
        .expect_err("no venues");

    assert_eq!(error.code(), ErrorCode::NoResult);
    assert!(error.message().contains("no venues"));
}

#[rstest]
#[tokio::test]
async fn the_venue_cap_applies_after_the_overlap_filter(group: Vec<Participant>) {
    let candidates = vec![
        venue("Harbour Grill", offset(0.005, 0.0)),
        venue("Quay Noodles", offset(-0.005, 0.0)),
        venue("Corner Bistro", offset(0.0, 0.001)),
        venue("Square Cafe", offset(0.0005, 0.0005)),
    ];
    let mut venues = MockVenueSource::new();
    venues
        .expect_nearby()
        .withf(|request| request.max_results == 5)
        .times(1)
        .return_once(move |_| Ok(candidates));

    let mut recommendations = MockRecommendationRepository::new();
    recommendations
        .expect_replace()
        .withf(|_, venues| venues.len() == 1 && venues[0].name == "Corner Bistro")
        .times(1)
        .returning(|hangout_id, venues| Ok(stored_from(hangout_id, venues)));

    let service = service_with_query(
        hangouts_with(hangout(HangoutStatus::DeterminingLocation), group),
        recommendations,
        geocoder(),
        isochrones(0.004),
        venues,
        VenueQuery {
            category: DEFAULT_VENUE_CATEGORY.to_owned(),
            max_results: 1,
        },
    );

    let stored = service
        .recommend(HangoutId::new(5))
        .await
        .expect("recommendations stored");

    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].name, "Corner Bistro");
}

#[rstest]
#[tokio::test]
async fn missing_location_details_are_rejected(mut group: Vec<Participant>) {
    group[2].location = None;
    let mut geocoder = MockGeocoder::new();
    geocoder.expect_geocode().times(0);

    let service = service(
        hangouts_with(hangout(HangoutStatus::DeterminingLocation), group),
        MockRecommendationRepository::new(),
        geocoder,
        MockIsochroneSource::new(),
        MockVenueSource::new(),
    );

    let error = service
        .recommend(HangoutId::new(5))
        .await
        .expect_err("missing details");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}
