//! Intersection of per-participant reachable areas.

use geo::{Area, BooleanOps, MultiPolygon};

/// Areas at or below this many square degrees are treated as empty. Clipping
/// two shapes that only share an edge can leave sliver rings behind.
const EMPTY_AREA_EPSILON: f64 = 1e-12;

/// Intersect every region, folding pairwise from the left.
///
/// Returns an empty multi-polygon for empty input and as soon as the running
/// intersection becomes empty.
///
/// # Examples
///
/// ```rust
/// use backend::domain::geo::{intersect_all, is_empty_region};
/// use geo::{MultiPolygon, Rect, coord};
///
/// let a = MultiPolygon::new(vec![Rect::new(coord! { x: 0.0, y: 0.0 }, coord! { x: 2.0, y: 2.0 }).to_polygon()]);
/// let b = MultiPolygon::new(vec![Rect::new(coord! { x: 1.0, y: 1.0 }, coord! { x: 3.0, y: 3.0 }).to_polygon()]);
/// assert!(!is_empty_region(&intersect_all(&[a, b])));
/// assert!(is_empty_region(&intersect_all(&[])));
/// ```
pub fn intersect_all(regions: &[MultiPolygon<f64>]) -> MultiPolygon<f64> {
    let Some((first, rest)) = regions.split_first() else {
        return MultiPolygon::new(Vec::new());
    };

    let mut acc = first.clone();
    for region in rest {
        if is_empty_region(&acc) {
            break;
        }
        acc = acc.intersection(region);
    }

    if is_empty_region(&acc) {
        MultiPolygon::new(Vec::new())
    } else {
        acc
    }
}

/// Whether a region has no polygons or no measurable area.
pub fn is_empty_region(region: &MultiPolygon<f64>) -> bool {
    region.0.is_empty() || region.unsigned_area() <= EMPTY_AREA_EPSILON
}
