//! Trip data models, types, and provider traits.

pub mod traits;
pub mod types;

// Re-exports for convenience
pub use traits::{ShapeProvider, StopProvider, TripScheduleProvider};
pub use types::{
    PositionSample, Result, ShapePoint, StopArrival, StopPoint, TransitError, TripSchedule,
};
