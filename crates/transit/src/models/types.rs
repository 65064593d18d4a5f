//! Core data types for trips, samples and arrivals.

use geo::{Coord, Point};

use crate::identifiers::*;

// ============================================================================
// Data Structures
// ============================================================================

/// A single vehicle position observation
///
/// Timestamps are milliseconds since the Unix epoch.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PositionSample {
    pub vehicle_id: VehicleIdentifier,
    pub trip_id: TripIdentifier,
    pub lat: f64,
    pub lon: f64,
    pub ts_millis: i64,
}

impl PositionSample {
    pub fn new(
        vehicle_id: impl Into<VehicleIdentifier>,
        trip_id: impl Into<TripIdentifier>,
        lat: f64,
        lon: f64,
        ts_millis: i64,
    ) -> Self {
        Self {
            vehicle_id: vehicle_id.into(),
            trip_id: trip_id.into(),
            lat,
            lon,
            ts_millis,
        }
    }

    pub fn location(&self) -> Point {
        Point::new(self.lon, self.lat)
    }
}

/// One vertex of a trip's path
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ShapePoint {
    pub lat: f64,
    pub lon: f64,
}

impl ShapePoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

impl From<ShapePoint> for Coord {
    fn from(p: ShapePoint) -> Self {
        Coord { x: p.lon, y: p.lat }
    }
}

/// A scheduled stop of a trip
///
/// `stop_sequence` is unique within a trip; ascending order is travel order.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StopPoint {
    pub stop_id: StopIdentifier,
    pub lat: f64,
    pub lon: f64,
    pub stop_sequence: u32,
}

impl StopPoint {
    pub fn new(stop_id: impl Into<StopIdentifier>, lat: f64, lon: f64, stop_sequence: u32) -> Self {
        Self {
            stop_id: stop_id.into(),
            lat,
            lon,
            stop_sequence,
        }
    }

    pub fn location(&self) -> Point {
        Point::new(self.lon, self.lat)
    }
}

/// Inferred passage of a vehicle at a stop
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StopArrival {
    pub vehicle_id: VehicleIdentifier,
    pub trip_id: TripIdentifier,
    pub stop_id: StopIdentifier,
    pub stop_sequence: u32,
    pub arrival_time_millis: i64,
}

/// Schedule facts about a trip
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TripSchedule {
    pub scheduled_start_time_millis: i64,
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum TransitError {
    #[error("Trip not found: {0}")]
    TripNotFound(TripIdentifier),

    #[error("Fetch failed for {url}: {message}")]
    Fetch { url: String, message: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

pub type Result<T> = std::result::Result<T, TransitError>;
