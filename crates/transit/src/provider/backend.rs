//! Trip data provider backed by a JSON trip backend.
//!
//! The backend serves one document per trip and kind:
//!
//! - `GET {base}/api/trips/{trip_id}/stops` → `{ "stops": [{ "stopId", "lat", "lon", "sequence", ... }] }`
//! - `GET {base}/api/trips/{trip_id}/shape` → `{ "points": [{ "lat", "lon", "sequence" }] }`
//!
//! Unknown fields are ignored; a missing or empty array decodes to an empty
//! list. Both documents are sorted by `sequence` and memoized per trip.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::pin::Pin;
use std::sync::{PoisonError, RwLock};

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::identifiers::*;
use crate::models::{traits::*, types::*};
use crate::network::traits::DataFetcher;

// ============================================================================
// Wire Payloads
// ============================================================================

#[derive(Debug, Deserialize)]
struct StopsResponse {
    #[serde(default)]
    stops: Option<Vec<StopDto>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StopDto {
    stop_id: String,
    lat: f64,
    lon: f64,
    sequence: u32,
}

#[derive(Debug, Deserialize)]
struct ShapeResponse {
    #[serde(default)]
    points: Option<Vec<ShapePointDto>>,
}

#[derive(Debug, Deserialize)]
struct ShapePointDto {
    lat: f64,
    lon: f64,
    sequence: u32,
}

// ============================================================================
// Provider
// ============================================================================

/// Stop and shape provider reading from the trip backend through a [`DataFetcher`]
pub struct BackendTripDataProvider<F> {
    fetcher: F,
    base_url: String,
    stops: RwLock<HashMap<TripIdentifier, Vec<StopPoint>>>,
    shapes: RwLock<HashMap<TripIdentifier, Vec<ShapePoint>>>,
}

impl<F: DataFetcher> BackendTripDataProvider<F> {
    pub fn new(fetcher: F, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        if base_url.ends_with('/') {
            base_url.pop();
        }

        Self {
            fetcher,
            base_url,
            stops: RwLock::new(HashMap::new()),
            shapes: RwLock::new(HashMap::new()),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn trip_url(&self, trip_id: &TripIdentifier, kind: &str) -> String {
        format!("{}/api/trips/{}/{}", self.base_url, trip_id, kind)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let body = self.fetcher.fetch(url).await?;
        serde_json::from_slice(&body)
            .map_err(|e| TransitError::SerializationError(format!("{url}: {e}")))
    }

    async fn load_stops(&self, trip_id: &TripIdentifier) -> Result<Vec<StopPoint>> {
        let url = self.trip_url(trip_id, "stops");
        let resp: StopsResponse = self.get_json(&url).await?;

        let mut stops = resp.stops.unwrap_or_default();
        stops.sort_by_key(|s| s.sequence);

        debug!(trip = %trip_id, count = stops.len(), "loaded stops from backend");

        Ok(stops
            .into_iter()
            .map(|s| StopPoint::new(s.stop_id, s.lat, s.lon, s.sequence))
            .collect())
    }

    async fn load_shape(&self, trip_id: &TripIdentifier) -> Result<Vec<ShapePoint>> {
        let url = self.trip_url(trip_id, "shape");
        let resp: ShapeResponse = self.get_json(&url).await?;

        let mut points = resp.points.unwrap_or_default();
        points.sort_by_key(|p| p.sequence);

        debug!(trip = %trip_id, count = points.len(), "loaded shape from backend");

        Ok(points
            .into_iter()
            .map(|p| ShapePoint::new(p.lat, p.lon))
            .collect())
    }
}

fn memoized<K: Eq + Hash, V: Clone>(cache: &RwLock<HashMap<K, V>>, key: &K) -> Option<V> {
    cache
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(key)
        .cloned()
}

fn remember<K: Eq + Hash, V: Clone>(cache: &RwLock<HashMap<K, V>>, key: K, value: V) -> V {
    cache
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .entry(key)
        .or_insert(value)
        .clone()
}

impl<F: DataFetcher> StopProvider for BackendTripDataProvider<F> {
    fn stops<'a>(
        &'a self,
        trip_id: &'a TripIdentifier,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<StopPoint>>> + Send + 'a>> {
        Box::pin(async move {
            if let Some(stops) = memoized(&self.stops, trip_id) {
                return Ok(stops);
            }
            let stops = self.load_stops(trip_id).await?;
            Ok(remember(&self.stops, trip_id.clone(), stops))
        })
    }
}

impl<F: DataFetcher> ShapeProvider for BackendTripDataProvider<F> {
    fn shape<'a>(
        &'a self,
        trip_id: &'a TripIdentifier,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<ShapePoint>>> + Send + 'a>> {
        Box::pin(async move {
            if let Some(shape) = memoized(&self.shapes, trip_id) {
                return Ok(shape);
            }
            let shape = self.load_shape(trip_id).await?;
            Ok(remember(&self.shapes, trip_id.clone(), shape))
        })
    }
}
