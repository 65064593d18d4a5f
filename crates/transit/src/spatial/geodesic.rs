//! WGS84 geodesic primitives.
//!
//! Thin wrappers over Karney's algorithms as exposed by `geo::Geodesic`, accurate
//! at short and long range and well behaved near antipodal points.

use geo::{Bearing, Destination, Distance, Geodesic, Point};

/// Ellipsoidal distance between two points in meters
pub fn distance_m(a: Point, b: Point) -> f64 {
    Geodesic.distance(a, b)
}

/// Initial azimuth from `a` towards `b`, degrees clockwise from north
pub fn bearing_deg(a: Point, b: Point) -> f64 {
    Geodesic.bearing(a, b)
}

/// Point reached by travelling `distance_m` from `origin` along `bearing_deg`
pub fn destination(origin: Point, bearing_deg: f64, distance_m: f64) -> Point {
    Geodesic.destination(origin, bearing_deg, distance_m)
}
