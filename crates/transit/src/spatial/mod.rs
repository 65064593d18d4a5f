//! Geodesic geometry and path utilities.

pub mod densify;
pub mod geodesic;
pub mod projection;

pub use densify::densify;
pub use geodesic::{bearing_deg, destination, distance_m};
pub use projection::project_along_m;
