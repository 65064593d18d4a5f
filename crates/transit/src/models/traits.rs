//! Provider traits for static trip data.
//!
//! The arrival engine consumes stops, shapes and schedules through these
//! capability traits. Implementations can be in-memory, database-backed, or remote.

use std::future::Future;
use std::pin::Pin;

use crate::identifiers::TripIdentifier;
use crate::models::types::*;

/// Source of a trip's stops (any order; consumers sort by sequence)
pub trait StopProvider: Send + Sync {
    fn stops<'a>(
        &'a self,
        trip_id: &'a TripIdentifier,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<StopPoint>>> + Send + 'a>>;
}

/// Source of a trip's raw path
///
/// An empty shape means "no raw shape"; consumers synthesize one from stops.
pub trait ShapeProvider: Send + Sync {
    fn shape<'a>(
        &'a self,
        trip_id: &'a TripIdentifier,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<ShapePoint>>> + Send + 'a>>;
}

/// Source of a trip's schedule, if one is known
pub trait TripScheduleProvider: Send + Sync {
    fn schedule<'a>(
        &'a self,
        trip_id: &'a TripIdentifier,
    ) -> Pin<Box<dyn Future<Output = Result<Option<TripSchedule>>> + Send + 'a>>;
}
