//! # arrival-core
//!
//! Infers when each vehicle passes each stop of its trip from a stream of
//! position samples.
//!
//! A [`TripPathCache`] turns provider data into an immutable [`TripPath`] per
//! trip. The [`ArrivalDetector`] combines a sample, the trip path and the
//! vehicle's previous [`VehicleState`] into zero or more arrivals plus the
//! next state, which the caller persists. [`ArrivalProcessor`] wires both to a
//! keyed state store for hosts that want the whole loop.

pub mod cache;
pub mod config;
pub mod detector;
pub mod error;
pub mod processor;
pub mod state;
pub mod trip_path;

// Re-export transit from the transit crate
pub use arrival_transit as transit;

pub use cache::TripPathCache;
pub use config::DetectorConfig;
pub use detector::{ArrivalDetector, Detection};
pub use error::{ArrivalError, Result};
pub use processor::{
    ArrivalProcessor, InMemoryStateStore, StopArrivalEvent, VehicleKey, VehicleStateStore,
};
pub use state::VehicleState;
pub use trip_path::TripPath;
