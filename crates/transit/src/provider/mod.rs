//! Trip data providers.

#[cfg(feature = "backend")]
pub mod backend;
pub mod static_provider;

use std::future::Future;
use std::pin::Pin;

use crate::identifiers::TripIdentifier;
use crate::models::{traits::TripScheduleProvider, types::*};

#[cfg(feature = "backend")]
pub use backend::BackendTripDataProvider;
pub use static_provider::{StaticTripDataProvider, TripData};

/// Schedule provider for feeds without schedule data
///
/// Every trip reports an unknown scheduled start, which disables the
/// schedule-anchored bootstrap.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoSchedule;

impl TripScheduleProvider for NoSchedule {
    fn schedule<'a>(
        &'a self,
        _trip_id: &'a TripIdentifier,
    ) -> Pin<Box<dyn Future<Output = Result<Option<TripSchedule>>> + Send + 'a>> {
        Box::pin(async { Ok(None) })
    }
}
