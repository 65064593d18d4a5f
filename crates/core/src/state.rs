use serde::{Deserialize, Serialize};

/// Per-vehicle detection state, owned and persisted by the caller
///
/// `progress_m` and `next_stop_idx` never decrease across detections for the
/// same vehicle and trip. `next_stop_idx` never exceeds the trip's stop count.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VehicleState {
    /// Furthest arc length reached along the trip path, in meters
    pub progress_m: f64,
    /// Index of the first stop not yet resolved
    pub next_stop_idx: usize,
    /// Timestamp of the last processed sample
    pub last_ts_millis: Option<i64>,
}

impl VehicleState {
    /// State of a vehicle that has not been observed yet
    pub fn empty() -> Self {
        Self::default()
    }
}
