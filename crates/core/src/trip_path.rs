//! Per-trip path geometry with precomputed stop positions.

use arrival_transit::spatial::{densify, project_along_m};
use arrival_transit::{ShapePoint, StopPoint, TripIdentifier};
use geo::{Coord, LineString, Point};

/// Immutable path of one trip
///
/// Stops are sorted by sequence and `stop_arcs[i]` is the arc length of
/// `stops[i]` along the densified shape. Arc lengths are projected one stop
/// at a time and are not forced to be monotonic.
#[derive(Clone, Debug, PartialEq)]
pub struct TripPath {
    trip_id: TripIdentifier,
    stops: Vec<StopPoint>,
    shape: LineString,
    stop_arcs: Vec<f64>,
    scheduled_start_millis: Option<i64>,
}

impl TripPath {
    /// Build the path for a trip
    ///
    /// With no raw shape, the path is the straight-line chain through the
    /// stops in sequence order.
    pub fn build(
        trip_id: TripIdentifier,
        mut stops: Vec<StopPoint>,
        raw_shape: &[ShapePoint],
        scheduled_start_millis: Option<i64>,
        densify_step_m: f64,
    ) -> Self {
        stops.sort_by_key(|s| s.stop_sequence);

        let base: LineString = if raw_shape.is_empty() {
            stops
                .iter()
                .map(|s| Coord { x: s.lon, y: s.lat })
                .collect()
        } else {
            raw_shape.iter().copied().map(Coord::from).collect()
        };

        let shape = densify(&base, densify_step_m);
        let stop_arcs = stops
            .iter()
            .map(|s| project_along_m(s.location(), &shape))
            .collect();

        Self {
            trip_id,
            stops,
            shape,
            stop_arcs,
            scheduled_start_millis,
        }
    }

    pub fn trip_id(&self) -> &TripIdentifier {
        &self.trip_id
    }

    /// Stops in travel order
    pub fn stops(&self) -> &[StopPoint] {
        &self.stops
    }

    pub fn stop_count(&self) -> usize {
        self.stops.len()
    }

    /// Densified path
    pub fn shape(&self) -> &LineString {
        &self.shape
    }

    /// Arc length of each stop, aligned with [`TripPath::stops`]
    pub fn stop_arcs(&self) -> &[f64] {
        &self.stop_arcs
    }

    pub fn scheduled_start_millis(&self) -> Option<i64> {
        self.scheduled_start_millis
    }

    /// Arc length of `point` along this path
    pub fn project(&self, point: Point) -> f64 {
        project_along_m(point, &self.shape)
    }
}
