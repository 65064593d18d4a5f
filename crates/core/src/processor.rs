//! Keyed sample processing.
//!
//! Glues the trip path cache, the detector and a per-vehicle state store
//! together, and turns raw arrivals into events carrying local wall-clock
//! fields for downstream consumers.
//!
//! The processor takes `&mut self` per sample, so the read-detect-write cycle
//! for a key is serialized by construction. Hosts that fan out across workers
//! partition by [`VehicleKey`] and give each worker its own processor and store.

use std::collections::HashMap;
use std::sync::Arc;

use arrival_transit::{
    AgencyIdentifier, PositionSample, StopArrival, StopIdentifier, TripIdentifier,
    VehicleIdentifier,
};
use chrono::{NaiveDate, TimeZone, Timelike};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::cache::TripPathCache;
use crate::detector::ArrivalDetector;
use crate::error::{ArrivalError, Result};
use crate::state::VehicleState;

const SECONDS_PER_DAY: u32 = 24 * 3600;

// ============================================================================
// Keys and State Storage
// ============================================================================

/// Identity of one vehicle running one trip
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VehicleKey {
    pub agency: AgencyIdentifier,
    pub vehicle: VehicleIdentifier,
    pub trip: TripIdentifier,
}

impl VehicleKey {
    pub fn new(agency: AgencyIdentifier, sample: &PositionSample) -> Self {
        Self {
            agency,
            vehicle: sample.vehicle_id.clone(),
            trip: sample.trip_id.clone(),
        }
    }
}

/// Durable home of per-vehicle state
pub trait VehicleStateStore: Send {
    fn get(&self, key: &VehicleKey) -> Option<VehicleState>;
    fn put(&mut self, key: VehicleKey, state: VehicleState);
}

#[derive(Clone, Debug, Default)]
pub struct InMemoryStateStore {
    states: HashMap<VehicleKey, VehicleState>,
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

impl VehicleStateStore for InMemoryStateStore {
    fn get(&self, key: &VehicleKey) -> Option<VehicleState> {
        self.states.get(key).copied()
    }

    fn put(&mut self, key: VehicleKey, state: VehicleState) {
        self.states.insert(key, state);
    }
}

// ============================================================================
// Events
// ============================================================================

/// Arrival enriched with local time fields
///
/// `*_extended` fields express the same wall-clock time on the previous
/// service day (hour + 24), so that consumers can match schedules whose times
/// run past midnight.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopArrivalEvent {
    pub agency: AgencyIdentifier,
    pub vehicle_id: VehicleIdentifier,
    pub trip_id: TripIdentifier,
    pub stop_id: StopIdentifier,
    pub stop_sequence: u32,
    pub arrival_time_millis: i64,
    /// `HH:MM:SS`
    pub arrival_time_local: String,
    /// `HH:MM:SS` with 24 added to the hour
    pub arrival_time_local_extended: String,
    pub arrival_time_local_seconds: u32,
    pub arrival_time_local_extended_seconds: u32,
    pub arrival_date: NaiveDate,
    pub arrival_prev_date: NaiveDate,
}

impl StopArrivalEvent {
    pub fn localize<Tz: TimeZone>(
        agency: AgencyIdentifier,
        arrival: StopArrival,
        zone: &Tz,
    ) -> Result<Self> {
        let ms = arrival.arrival_time_millis;
        let local = zone
            .timestamp_millis_opt(ms)
            .single()
            .ok_or(ArrivalError::InvalidTimestamp(ms))?;

        let (hour, minute, second) = (local.hour(), local.minute(), local.second());
        let date = local.date_naive();
        let prev_date = date.pred_opt().ok_or(ArrivalError::InvalidTimestamp(ms))?;
        let seconds = hour * 3600 + minute * 60 + second;

        Ok(Self {
            agency,
            vehicle_id: arrival.vehicle_id,
            trip_id: arrival.trip_id,
            stop_id: arrival.stop_id,
            stop_sequence: arrival.stop_sequence,
            arrival_time_millis: ms,
            arrival_time_local: format!("{hour:02}:{minute:02}:{second:02}"),
            arrival_time_local_extended: format!("{:02}:{minute:02}:{second:02}", hour + 24),
            arrival_time_local_seconds: seconds,
            arrival_time_local_extended_seconds: seconds + SECONDS_PER_DAY,
            arrival_date: date,
            arrival_prev_date: prev_date,
        })
    }
}

// ============================================================================
// Processor
// ============================================================================

pub struct ArrivalProcessor<S, Tz> {
    cache: Arc<TripPathCache>,
    detector: ArrivalDetector,
    store: S,
    zone: Tz,
}

impl<S: VehicleStateStore, Tz: TimeZone> ArrivalProcessor<S, Tz> {
    pub fn new(cache: Arc<TripPathCache>, detector: ArrivalDetector, store: S, zone: Tz) -> Self {
        Self {
            cache,
            detector,
            store,
            zone,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Run one sample through detection and persist the resulting state
    ///
    /// Samples without a trip id are ignored. The new state is stored only
    /// once every arrival has been localized, so trip data and timestamp
    /// failures leave the stored state untouched.
    pub async fn process(
        &mut self,
        agency: &AgencyIdentifier,
        sample: &PositionSample,
    ) -> Result<Vec<StopArrivalEvent>> {
        if sample.trip_id.is_empty() {
            debug!(vehicle = %sample.vehicle_id, "dropping sample without trip");
            return Ok(Vec::new());
        }

        let trip = self.cache.get(&sample.trip_id).await.inspect_err(|e| {
            warn!(trip = %sample.trip_id, error = %e, "trip path unavailable");
        })?;

        let key = VehicleKey::new(agency.clone(), sample);
        let previous = self.store.get(&key);
        let detection = self.detector.detect(sample, &trip, previous.as_ref());

        let events = detection
            .arrivals
            .into_iter()
            .map(|a| StopArrivalEvent::localize(agency.clone(), a, &self.zone))
            .collect::<Result<Vec<_>>>()
            .inspect_err(|e| {
                warn!(vehicle = %sample.vehicle_id, error = %e, "arrival not localizable");
            })?;

        self.store.put(key, detection.state);
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrival_transit::spatial::destination;
    use arrival_transit::{StaticTripDataProvider, StopPoint, TransitError, TripData, TripSchedule};
    use chrono::{FixedOffset, Utc};
    use geo::Point;

    use crate::config::DetectorConfig;

    fn north_of(m: f64) -> Point {
        destination(Point::new(37.0, 55.0), 0.0, m)
    }

    fn stop_at(id: &str, m: f64, seq: u32) -> StopPoint {
        let p = north_of(m);
        StopPoint::new(id, p.y(), p.x(), seq)
    }

    fn sample_at(vehicle: &str, m: f64, ts: i64) -> PositionSample {
        let p = north_of(m);
        PositionSample::new(vehicle, "T1", p.y(), p.x(), ts)
    }

    fn processor<Tz: TimeZone>(zone: Tz) -> ArrivalProcessor<InMemoryStateStore, Tz> {
        let data = Arc::new(StaticTripDataProvider::from_data(vec![TripData {
            trip_id: TripIdentifier::new("T1"),
            stops: vec![
                stop_at("S1", 0.0, 1),
                stop_at("S2", 100.0, 2),
                stop_at("S3", 250.0, 3),
            ],
            shape: vec![],
            schedule: Some(TripSchedule {
                scheduled_start_time_millis: 0,
            }),
        }]));
        let config = DetectorConfig::default();
        let cache = TripPathCache::new(data.clone(), data.clone(), data, &config);

        ArrivalProcessor::new(
            Arc::new(cache),
            ArrivalDetector::new(&config),
            InMemoryStateStore::new(),
            zone,
        )
    }

    #[test]
    fn test_localize_fields() {
        // 2024-03-01 23:30:15 UTC, 00:30:15 the next day at UTC+1
        let arrival = StopArrival {
            vehicle_id: VehicleIdentifier::new("V1"),
            trip_id: TripIdentifier::new("T1"),
            stop_id: StopIdentifier::new("S1"),
            stop_sequence: 4,
            arrival_time_millis: 1_709_335_815_000,
        };
        let zone = FixedOffset::east_opt(3600).unwrap();
        let event = StopArrivalEvent::localize(AgencyIdentifier::new("sl"), arrival, &zone).unwrap();

        assert_eq!(event.arrival_time_local, "00:30:15");
        assert_eq!(event.arrival_time_local_extended, "24:30:15");
        assert_eq!(event.arrival_time_local_seconds, 1_815);
        assert_eq!(event.arrival_time_local_extended_seconds, 1_815 + 86_400);
        assert_eq!(event.arrival_date, NaiveDate::from_ymd_opt(2024, 3, 2).unwrap());
        assert_eq!(event.arrival_prev_date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(event.stop_sequence, 4);
    }

    #[test]
    fn test_event_json_dates() {
        let arrival = StopArrival {
            vehicle_id: VehicleIdentifier::new("V1"),
            trip_id: TripIdentifier::new("T1"),
            stop_id: StopIdentifier::new("S1"),
            stop_sequence: 1,
            arrival_time_millis: 0,
        };
        let event = StopArrivalEvent::localize(AgencyIdentifier::new("sl"), arrival, &Utc).unwrap();
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["arrival_date"], "1970-01-01");
        assert_eq!(json["arrival_prev_date"], "1969-12-31");
        assert_eq!(json["agency"], "sl");
        assert_eq!(json["arrival_time_local"], "00:00:00");
    }

    #[tokio::test]
    async fn test_process_persists_state_per_vehicle() {
        let mut processor = processor(Utc);
        let agency = AgencyIdentifier::new("sl");

        // Anchored on the scheduled start at t=0; the path synthesized from
        // the stops ends at S3, so the sample projects to 250 m
        let events = processor.process(&agency, &sample_at("V1", 300.0, 300_000)).await.unwrap();
        let ids: Vec<_> = events.iter().map(|e| e.stop_id.as_str()).collect();
        assert_eq!(ids, ["S1", "S2", "S3"]);
        assert_eq!(events[1].arrival_time_millis, 120_000);
        assert_eq!(events[1].arrival_time_local, "00:02:00");
        assert_eq!(events[2].arrival_time_millis, 300_000);

        // Same sample again: nothing new
        let events = processor.process(&agency, &sample_at("V1", 300.0, 300_000)).await.unwrap();
        assert!(events.is_empty());

        // Another vehicle on the same trip keeps its own state
        let events = processor.process(&agency, &sample_at("V2", 50.0, 60_000)).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(processor.store().len(), 2);

        let key = VehicleKey {
            agency: agency.clone(),
            vehicle: VehicleIdentifier::new("V2"),
            trip: TripIdentifier::new("T1"),
        };
        let state = processor.store().get(&key).unwrap();
        assert_eq!(state.next_stop_idx, 1);
        assert_eq!(state.last_ts_millis, Some(60_000));
    }

    #[tokio::test]
    async fn test_process_drops_samples_without_trip() {
        let mut processor = processor(Utc);
        let sample = PositionSample::new("V1", "", 55.0, 37.0, 1_000);

        let events = processor.process(&AgencyIdentifier::new("sl"), &sample).await.unwrap();
        assert!(events.is_empty());
        assert!(processor.store().is_empty());
    }

    #[tokio::test]
    async fn test_process_keeps_samples_without_vehicle() {
        let mut processor = processor(Utc);

        let events = processor
            .process(&AgencyIdentifier::new("sl"), &sample_at("", 50.0, 60_000))
            .await
            .unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].vehicle_id.as_str(), "");
        assert_eq!(processor.store().len(), 1);
    }

    #[tokio::test]
    async fn test_unlocalizable_arrival_leaves_state_untouched() {
        let mut processor = processor(Utc);
        let agency = AgencyIdentifier::new("sl");

        // Past the last instant chrono can represent
        let err = processor
            .process(&agency, &sample_at("V1", 0.0, 9_000_000_000_000_000))
            .await
            .unwrap_err();
        assert!(matches!(err, ArrivalError::InvalidTimestamp(9_000_000_000_000_000)));
        assert!(processor.store().is_empty());

        // S1 is still pending for the next good sample
        let events = processor.process(&agency, &sample_at("V1", 0.0, 1_000)).await.unwrap();
        let ids: Vec<_> = events.iter().map(|e| e.stop_id.as_str()).collect();
        assert_eq!(ids, ["S1"]);
        assert_eq!(events[0].arrival_time_millis, 1_000);
    }

    #[tokio::test]
    async fn test_process_propagates_missing_trip() {
        let mut processor = processor(Utc);
        let sample = PositionSample::new("V1", "T404", 55.0, 37.0, 1_000);

        let err = processor
            .process(&AgencyIdentifier::new("sl"), &sample)
            .await
            .unwrap_err();
        assert!(matches!(err, ArrivalError::Transit(TransitError::TripNotFound(_))));
        assert!(processor.store().is_empty());
    }
}
