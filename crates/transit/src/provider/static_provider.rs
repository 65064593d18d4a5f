//! In-memory trip data provider.
//!
//! Holds stops, shapes and schedules for a fixed set of trips. Useful for
//! replays, demos and tests, or for hosts that preload static data.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::identifiers::*;
use crate::models::{traits::*, types::*};

// ============================================================================
// Trip Data
// ============================================================================

/// Everything the static provider knows about one trip
#[derive(Clone, Debug)]
pub struct TripData {
    pub trip_id: TripIdentifier,
    pub stops: Vec<StopPoint>,
    /// Empty when the trip has no raw shape
    pub shape: Vec<ShapePoint>,
    pub schedule: Option<TripSchedule>,
}

// ============================================================================
// Static Provider
// ============================================================================

/// In-memory provider implementing all three trip data traits
///
/// This type is cheap to clone since all data is stored in `Arc`s.
#[derive(Clone, Default)]
pub struct StaticTripDataProvider {
    trips: HashMap<TripIdentifier, Arc<TripData>>,
}

impl StaticTripDataProvider {
    /// Create a new empty provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Build provider from raw trip data
    ///
    /// A later entry for the same trip id replaces an earlier one.
    pub fn from_data(trips: Vec<TripData>) -> Self {
        let trips = trips
            .into_iter()
            .map(|t| (t.trip_id.clone(), Arc::new(t)))
            .collect();

        Self { trips }
    }

    pub fn trip(&self, id: &TripIdentifier) -> Option<&TripData> {
        self.trips.get(id).map(|t| t.as_ref())
    }

    pub fn len(&self) -> usize {
        self.trips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trips.is_empty()
    }
}

impl StopProvider for StaticTripDataProvider {
    fn stops<'a>(
        &'a self,
        trip_id: &'a TripIdentifier,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<StopPoint>>> + Send + 'a>> {
        Box::pin(async move {
            self.trip(trip_id)
                .map(|t| t.stops.clone())
                .ok_or_else(|| TransitError::TripNotFound(trip_id.clone()))
        })
    }
}

impl ShapeProvider for StaticTripDataProvider {
    fn shape<'a>(
        &'a self,
        trip_id: &'a TripIdentifier,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<ShapePoint>>> + Send + 'a>> {
        Box::pin(async move { Ok(self.trip(trip_id).map(|t| t.shape.clone()).unwrap_or_default()) })
    }
}

impl TripScheduleProvider for StaticTripDataProvider {
    fn schedule<'a>(
        &'a self,
        trip_id: &'a TripIdentifier,
    ) -> Pin<Box<dyn Future<Output = Result<Option<TripSchedule>>> + Send + 'a>> {
        Box::pin(async move { Ok(self.trip(trip_id).and_then(|t| t.schedule)) })
    }
}
