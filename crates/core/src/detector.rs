//! Stop-arrival state machine.
//!
//! Each sample is projected onto the trip path and compared with the previous
//! observation of the same vehicle. Stops whose arc length falls inside the
//! travelled interval (widened by the tolerance band) are reported, with the
//! arrival time interpolated linearly between the two observations. The stop
//! cursor only ever moves forward: once a stop is reported or skipped it is
//! never examined again.
//!
//! ## Reference interval
//!
//! The interval a sample closes is chosen in this order:
//!
//! 1. **Previous sample**: from the stored progress and timestamp
//! 2. **Schedule anchor**: for a vehicle's first sample, from progress 0 at the
//!    trip's scheduled start, when that start is not after the sample and not
//!    more than the configured gap before it
//! 3. **Degenerate**: the sample itself, so only stops within tolerance of the
//!    current position are reported, all at the sample's timestamp
//!
//! ## Ordering violations
//!
//! Progress is a ratchet: a sample that projects behind the recorded progress
//! never lowers it. Timestamps are taken as given, including ones that go
//! backwards; interpolated times simply follow the supplied interval.

use arrival_transit::{PositionSample, StopArrival};
use tracing::{debug, trace};

use crate::config::DetectorConfig;
use crate::state::VehicleState;
use crate::trip_path::TripPath;

/// Displacements below this many meters count as standing still
const STATIONARY_EPSILON_M: f64 = 1e-6;

/// Outcome of one detection step
#[derive(Clone, Debug, PartialEq)]
pub struct Detection {
    /// State to persist for the vehicle
    pub state: VehicleState,
    /// Newly confirmed arrivals in stop sequence order
    pub arrivals: Vec<StopArrival>,
}

/// Pure arrival detector
///
/// Holds configuration only, so one instance can serve any number of
/// vehicles from any number of threads.
#[derive(Clone, Copy, Debug)]
pub struct ArrivalDetector {
    tolerance_m: f64,
    max_schedule_anchor_gap_millis: i64,
}

impl ArrivalDetector {
    pub fn new(config: &DetectorConfig) -> Self {
        Self {
            tolerance_m: config.tolerance_m(),
            max_schedule_anchor_gap_millis: config.max_schedule_anchor_gap_millis(),
        }
    }

    /// Advance `previous` (empty when `None`) with `sample`
    pub fn detect(
        &self,
        sample: &PositionSample,
        trip: &TripPath,
        previous: Option<&VehicleState>,
    ) -> Detection {
        let prev = previous.copied().unwrap_or_default();
        let s_now = trip.project(sample.location());
        let t2 = sample.ts_millis;
        let stop_count = trip.stop_count();

        let ratcheted = |next_stop_idx: usize| VehicleState {
            progress_m: prev.progress_m.max(s_now),
            next_stop_idx,
            last_ts_millis: Some(t2),
        };

        if stop_count == 0 || prev.next_stop_idx >= stop_count {
            return Detection {
                state: ratcheted(prev.next_stop_idx),
                arrivals: Vec::new(),
            };
        }

        let (s_prev, t1) = self.reference_interval(&prev, trip, s_now, t2);
        let s_min = s_prev.min(s_now);
        let s_max = s_prev.max(s_now);
        let tol = self.tolerance_m;

        let mut arrivals = Vec::new();
        let mut k = prev.next_stop_idx;

        while k < stop_count {
            let arc = trip.stop_arcs()[k];
            let stop = &trip.stops()[k];

            if arc + tol < s_min {
                trace!(
                    vehicle = %sample.vehicle_id,
                    stop = %stop.stop_id,
                    arc,
                    "stop passed unseen, skipping"
                );
                k += 1;
                continue;
            }

            if arc > s_max + tol {
                break;
            }

            arrivals.push(StopArrival {
                vehicle_id: sample.vehicle_id.clone(),
                trip_id: sample.trip_id.clone(),
                stop_id: stop.stop_id.clone(),
                stop_sequence: stop.stop_sequence,
                arrival_time_millis: interpolate_arrival(arc, s_prev, s_now, t1, t2),
            });
            k += 1;
        }

        debug!(
            vehicle = %sample.vehicle_id,
            trip = %trip.trip_id(),
            s_now,
            s_prev,
            arrivals = arrivals.len(),
            next_stop_idx = k,
            "processed sample"
        );

        Detection {
            state: ratcheted(k.min(stop_count)),
            arrivals,
        }
    }

    fn reference_interval(
        &self,
        prev: &VehicleState,
        trip: &TripPath,
        s_now: f64,
        t2: i64,
    ) -> (f64, i64) {
        if let Some(t1) = prev.last_ts_millis {
            return (prev.progress_m, t1);
        }

        match trip.scheduled_start_millis() {
            Some(start)
                if t2
                    .checked_sub(start)
                    .is_some_and(|gap| (0..=self.max_schedule_anchor_gap_millis).contains(&gap)) =>
            {
                (0.0, start)
            }
            _ => (s_now, t2),
        }
    }
}

/// Time at which the vehicle crossed `arc` while moving from `s_prev` at `t1`
/// to `s_now` at `t2`
fn interpolate_arrival(arc: f64, s_prev: f64, s_now: f64, t1: i64, t2: i64) -> i64 {
    let ds = s_now - s_prev;
    if ds.abs() < STATIONARY_EPSILON_M {
        return t2;
    }

    let frac = ((arc - s_prev) / ds).clamp(0.0, 1.0);
    let span = t2 as f64 - t1 as f64;
    // Half-up rounding, also for negative spans
    t1.saturating_add((frac * span + 0.5).floor() as i64)
}
