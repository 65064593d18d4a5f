//! # arrival-transit
//!
//! Trip data, geometry and provider plumbing for stop-arrival inference.
//!
//! ## Features
//!
//! - **Geodesic geometry**: WGS84 distances, bearings and destinations
//! - **Path tools**: polyline densification and arc-length projection
//! - **Pluggable providers**: stops, shapes and schedules behind async traits
//! - **Backend provider**: JSON trip endpoints over any [`DataFetcher`] (`backend` feature)
//!
//! ## Example
//!
//! ```
//! use arrival_transit::prelude::*;
//! use geo::Point;
//!
//! let shape: geo::LineString = vec![(18.0686, 59.3293), (18.0686, 59.3393)].into();
//! let dense = densify(&shape, 10.0);
//! assert!(dense.0.len() > shape.0.len());
//!
//! // Halfway up the shape, roughly 557 m along it
//! let along = project_along_m(Point::new(18.0686, 59.3343), &dense);
//! assert!((along - 557.0).abs() < 2.0);
//! ```

pub mod identifiers;
pub mod models;
pub mod network;
pub mod provider;
pub mod spatial;

// Re-exports for convenience
pub mod prelude {
    pub use crate::identifiers::*;
    pub use crate::models::{traits::*, types::*};
    pub use crate::network::traits::*;
    #[cfg(feature = "backend")]
    pub use crate::provider::backend::BackendTripDataProvider;
    pub use crate::provider::{
        static_provider::{StaticTripDataProvider, TripData},
        NoSchedule,
    };
    pub use crate::spatial::{densify, project_along_m};
}

pub use prelude::*;
