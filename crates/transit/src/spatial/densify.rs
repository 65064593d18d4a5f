//! Polyline densification.

use geo::{Coord, LineString};

use super::geodesic::distance_m;

/// Insert points so consecutive vertices are at most `step_m` apart
///
/// Inserted points are planar lat/lon interpolations at fractions
/// `k * step_m / d` of each long segment, which is accurate enough for the
/// short spans a transit path is made of. The first vertex and every original
/// vertex are kept, so the output is never shorter than the input. Only the
/// residual stretch before an original vertex may be shorter than `step_m`.
///
/// Lines with fewer than two points, and non-positive steps, are returned as-is.
pub fn densify(line: &LineString, step_m: f64) -> LineString {
    if line.0.len() <= 1 || step_m.is_nan() || step_m <= 0.0 {
        return line.clone();
    }

    let mut out = Vec::with_capacity(line.0.len());
    out.push(line.0[0]);

    for segment in line.lines() {
        let (a, b) = (segment.start, segment.end);
        let d = distance_m(a.into(), b.into());

        if d <= step_m || !d.is_finite() {
            out.push(b);
            continue;
        }

        let n = (d / step_m).floor() as usize;
        for k in 1..=n {
            let t = (k as f64 * step_m) / d;
            if t >= 1.0 {
                break;
            }
            out.push(Coord {
                x: a.x + (b.x - a.x) * t,
                y: a.y + (b.y - a.y) * t,
            });
        }
        out.push(b);
    }

    LineString::new(out)
}
