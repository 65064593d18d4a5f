//! Built-in demo run: one vehicle on a five-stop trip without a raw shape.

use arrival_transit::{PositionSample, StaticTripDataProvider, StopPoint, TripData, TripIdentifier, TripSchedule};

pub const DEMO_TRIP: &str = "T1";

pub fn trip_data() -> StaticTripDataProvider {
    StaticTripDataProvider::from_data(vec![TripData {
        trip_id: TripIdentifier::new(DEMO_TRIP),
        stops: vec![
            StopPoint::new("S1", 55.0000, 37.0000, 1),
            StopPoint::new("S2", 55.0006, 37.0008, 2),
            StopPoint::new("S3", 55.0012, 37.0016, 3),
            StopPoint::new("S4", 55.0018, 37.0024, 4),
            StopPoint::new("S5", 55.0024, 37.0032, 5),
        ],
        shape: vec![],
        schedule: Some(TripSchedule {
            scheduled_start_time_millis: 0,
        }),
    }])
}

pub fn samples() -> Vec<PositionSample> {
    [
        (55.00002, 37.00001, 0),
        (55.00040, 37.00055, 8_000),
        (55.00145, 37.00190, 15_000),
        (55.00188, 37.00245, 20_000),
        (55.00295, 37.00395, 28_000),
        (55.00340, 37.00455, 35_000),
        (55.00410, 37.00545, 42_000),
        (55.00535, 37.00705, 55_000),
        (55.00580, 37.00770, 65_000),
    ]
    .into_iter()
    .map(|(lat, lon, ts)| PositionSample::new("V1", DEMO_TRIP, lat, lon, ts))
    .collect()
}
