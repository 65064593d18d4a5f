//! Lazily built, process-lifetime registry of trip paths.

use std::collections::HashMap;
use std::sync::Arc;

use arrival_transit::{ShapeProvider, StopProvider, TripIdentifier, TripScheduleProvider};
use tokio::sync::RwLock;
use tracing::debug;

use crate::config::DetectorConfig;
use crate::error::Result;
use crate::trip_path::TripPath;

/// Builds each trip's [`TripPath`] on first use and keeps it forever
///
/// Provider calls happen without holding the registry lock, so a slow trip
/// never blocks lookups of other trips. Two tasks racing to build the same
/// trip both call the providers; the first result stored is the one every
/// caller gets. Provider errors are returned as-is and nothing is cached for
/// the failed trip.
pub struct TripPathCache {
    stops: Arc<dyn StopProvider>,
    shapes: Arc<dyn ShapeProvider>,
    schedules: Arc<dyn TripScheduleProvider>,
    densify_step_m: f64,
    paths: RwLock<HashMap<TripIdentifier, Arc<TripPath>>>,
}

impl TripPathCache {
    pub fn new(
        stops: Arc<dyn StopProvider>,
        shapes: Arc<dyn ShapeProvider>,
        schedules: Arc<dyn TripScheduleProvider>,
        config: &DetectorConfig,
    ) -> Self {
        Self {
            stops,
            shapes,
            schedules,
            densify_step_m: config.densify_step_m(),
            paths: RwLock::new(HashMap::new()),
        }
    }

    pub async fn get(&self, trip_id: &TripIdentifier) -> Result<Arc<TripPath>> {
        if let Some(path) = self.paths.read().await.get(trip_id) {
            return Ok(Arc::clone(path));
        }

        let built = Arc::new(self.build(trip_id).await?);

        let mut paths = self.paths.write().await;
        Ok(Arc::clone(paths.entry(trip_id.clone()).or_insert(built)))
    }

    /// Number of trips built so far
    pub async fn len(&self) -> usize {
        self.paths.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.paths.read().await.is_empty()
    }

    async fn build(&self, trip_id: &TripIdentifier) -> Result<TripPath> {
        let stops = self.stops.stops(trip_id).await?;
        let shape = self.shapes.shape(trip_id).await?;
        let schedule = self.schedules.schedule(trip_id).await?;

        let path = TripPath::build(
            trip_id.clone(),
            stops,
            &shape,
            schedule.map(|s| s.scheduled_start_time_millis),
            self.densify_step_m,
        );

        debug!(
            trip = %trip_id,
            stops = path.stop_count(),
            points = path.shape().0.len(),
            synthesized_shape = shape.is_empty(),
            "built trip path"
        );

        Ok(path)
    }
}
