//! Geometry regression coverage.

use geo::{Area, Coord, LineString, MultiPolygon, Polygon, Rect, coord};
use rstest::rstest;

use super::*;
use crate::domain::Venue;

fn square(min_x: f64, min_y: f64, size: f64) -> MultiPolygon<f64> {
    let rect = Rect::new(
        coord! { x: min_x, y: min_y },
        coord! { x: min_x + size, y: min_y + size },
    );
    MultiPolygon::new(vec![rect.to_polygon()])
}

fn triangle(points: [(f64, f64); 3]) -> Polygon<f64> {
    let ring: Vec<Coord<f64>> = points.iter().map(|&(x, y)| coord! { x: x, y: y }).collect();
    Polygon::new(LineString::from(ring), Vec::new())
}

fn venue(name: &str, longitude: f64, latitude: f64) -> Venue {
    Venue {
        name: name.to_owned(),
        address: format!("{name} street"),
        location: Coordinate::new(longitude, latitude).expect("valid coordinate"),
    }
}

#[rstest]
fn intersection_of_nothing_is_empty() {
    assert!(is_empty_region(&intersect_all(&[])));
}

#[rstest]
fn intersection_is_order_independent() {
    let a = square(0.0, 0.0, 4.0);
    let b = square(1.0, 1.0, 4.0);
    let c = square(2.0, 0.5, 4.0);

    let forward = intersect_all(&[a.clone(), b.clone(), c.clone()]);
    let rotated = intersect_all(&[c, a, b]);

    assert!((forward.unsigned_area() - 6.0).abs() < 1e-9);
    assert!((forward.unsigned_area() - rotated.unsigned_area()).abs() < 1e-9);
}

#[rstest]
fn self_intersection_keeps_the_region() {
    let a = square(-0.05, 51.5, 0.02);
    let result = intersect_all(&[a.clone(), a.clone()]);
    assert!((result.unsigned_area() - a.unsigned_area()).abs() < 1e-12);
}

#[rstest]
fn disjoint_regions_have_no_overlap() {
    let result = intersect_all(&[
        square(0.0, 0.0, 1.0),
        square(5.0, 5.0, 1.0),
        square(0.5, 0.5, 1.0),
    ]);
    assert!(is_empty_region(&result));
    assert!(result.0.is_empty());
}

#[rstest]
fn edge_sharing_regions_count_as_empty() {
    let result = intersect_all(&[square(0.0, 0.0, 1.0), square(1.0, 0.0, 1.0)]);
    assert!(is_empty_region(&result));
}

#[rstest]
#[case::square(square(0.0, 0.0, 2.0))]
#[case::narrow_triangle(MultiPolygon::new(vec![triangle([(0.0, 0.0), (6.0, 0.5), (0.2, 1.0)])]))]
#[case::city_block(square(-0.129, 51.507, 0.004))]
fn enclosing_circle_reaches_every_vertex(#[case] region: MultiPolygon<f64>) {
    let circle = enclosing_circle(&region)
        .expect("valid centroid")
        .expect("non-empty region");

    for polygon in &region.0 {
        for vertex in polygon.exterior().coords() {
            let distance = (vertex.x - circle.center.longitude())
                .hypot(vertex.y - circle.center.latitude());
            assert!(distance <= circle.radius_degrees + 1e-9);
        }
    }
    assert!((circle.radius_meters - circle.radius_degrees * METERS_PER_DEGREE).abs() < 1e-6);
}

#[rstest]
fn enclosing_circle_uses_the_largest_part() {
    let small = square(10.0, 10.0, 0.5).0.remove(0);
    let large = square(0.0, 0.0, 2.0).0.remove(0);
    let region = MultiPolygon::new(vec![small, large]);

    let circle = enclosing_circle(&region)
        .expect("valid centroid")
        .expect("non-empty region");

    assert!((circle.center.longitude() - 1.0).abs() < 1e-9);
    assert!((circle.center.latitude() - 1.0).abs() < 1e-9);
    assert!((circle.radius_degrees - 2.0_f64.sqrt()).abs() < 1e-9);
}

#[rstest]
fn enclosing_circle_of_empty_region_is_none() {
    let circle = enclosing_circle(&MultiPolygon::new(Vec::new())).expect("no validation error");
    assert!(circle.is_none());
}

#[rstest]
fn venue_filter_keeps_only_interior_points() {
    let region = square(0.0, 0.0, 1.0);
    let kept = venues_within(
        &region,
        vec![
            venue("inside", 0.5, 0.5),
            venue("outside", 1.5, 0.5),
            venue("boundary", 1.0, 0.5),
        ],
    );

    let names: Vec<&str> = kept.iter().map(|v| v.name.as_str()).collect();
    assert_eq!(names, vec!["inside"]);
}

#[rstest]
#[case(1, true)]
#[case(180, true)]
#[case(0, false)]
#[case(181, false)]
fn travel_budget_bounds(#[case] minutes: u32, #[case] accepted: bool) {
    assert_eq!(TravelBudget::new(minutes).is_ok(), accepted);
}

#[rstest]
fn travel_budget_converts_to_seconds() {
    let budget = TravelBudget::new(45).expect("within range");
    assert_eq!(budget.seconds(), 2_700);
}

#[rstest]
#[case("")]
#[case("   ")]
fn transport_mode_rejects_blank_values(#[case] raw: &str) {
    assert_eq!(
        TransportMode::new(raw),
        Err(GeoValidationError::EmptyTransportMode)
    );
}

#[rstest]
fn transport_mode_is_passed_through_verbatim() {
    let mode = TransportMode::new("public_transport").expect("non-empty");
    assert_eq!(mode.as_str(), "public_transport");
}

#[rstest]
#[case(181.0, 0.0)]
#[case(0.0, -90.5)]
#[case(f64::NAN, 0.0)]
fn coordinate_rejects_out_of_range_values(#[case] longitude: f64, #[case] latitude: f64) {
    assert!(Coordinate::new(longitude, latitude).is_err());
}
