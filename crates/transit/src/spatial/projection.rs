//! Arc-length projection of points onto a polyline.

use geo::{LineString, Point};

use super::geodesic::{bearing_deg, destination, distance_m};

/// Arc length, in meters from the start of `shape`, of the point on `shape`
/// closest to `point`
///
/// Each segment A→B places its candidate at `t = clamp(|AP| / |AB|, 0, 1)`
/// along the geodesic from A. The segment whose candidate is nearest to the
/// query wins; on ties the first segment scanned is kept, so on
/// self-overlapping paths the earliest pass counts. Zero-length segments are
/// skipped.
///
/// Returns 0 for shapes with fewer than two points. The result is always a
/// finite number for finite input.
pub fn project_along_m(point: Point, shape: &LineString) -> f64 {
    if shape.0.len() <= 1 {
        return 0.0;
    }

    let mut best_cum = 0.0;
    let mut best_dist = f64::INFINITY;
    let mut acc = 0.0;

    for segment in shape.lines() {
        let a: Point = segment.start.into();
        let b: Point = segment.end.into();

        let d_ab = distance_m(a, b);
        if d_ab == 0.0 || !d_ab.is_finite() {
            continue;
        }

        let d_ap = distance_m(a, point);
        let t = if d_ap.is_nan() {
            1.0
        } else {
            (d_ap / d_ab).clamp(0.0, 1.0)
        };
        let t_m = t * d_ab;

        let candidate = destination(a, bearing_deg(a, b), t_m);
        let mut dist_to_seg = distance_m(candidate, point);
        if dist_to_seg.is_nan() {
            dist_to_seg = distance_m(b, point);
        }

        if dist_to_seg < best_dist {
            best_dist = dist_to_seg;
            best_cum = acc + t_m;
        }

        acc += d_ab;
    }

    best_cum
}
