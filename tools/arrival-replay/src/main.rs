use anyhow::{Context, Result};
use arrival_core::config::{
    DEFAULT_DENSIFY_STEP_M, DEFAULT_MAX_SCHEDULE_ANCHOR_GAP_MILLIS, DEFAULT_TOLERANCE_M,
};
use arrival_core::{
    ArrivalDetector, ArrivalProcessor, DetectorConfig, InMemoryStateStore, StopArrivalEvent,
    TripPathCache, VehicleStateStore,
};
use arrival_transit::{
    AgencyIdentifier, BackendTripDataProvider, NoSchedule, PositionSample, ShapeProvider,
    StopProvider, TripScheduleProvider,
};
use chrono::{FixedOffset, TimeZone};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;

mod demo;
mod fetcher;

use fetcher::ReqwestFetcher;

#[derive(Parser, Debug)]
#[command(
    name = "arrival-replay",
    author,
    version,
    about = "Replay vehicle position samples through the stop-arrival detector",
    long_about = "Feeds position samples, in order, through the stop-arrival detector and \
                  prints every inferred arrival as one JSON object per line.\n\n\
                  Trip stops and shapes come from a trip backend (--backend-url) or, \
                  without one, from a built-in five-stop demo trip. Without --input the \
                  built-in demo samples are replayed."
)]
struct Args {
    /// JSON file holding an array of position samples
    /// ({"vehicle_id", "trip_id", "lat", "lon", "ts_millis"})
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Trip backend base URL serving /api/trips/{trip}/stops and /shape
    #[arg(short, long)]
    backend_url: Option<String>,

    /// Agency stamped on every arrival event
    #[arg(short, long, default_value = "demo")]
    agency: String,

    /// Max spacing between path points, in meters
    #[arg(long, default_value_t = DEFAULT_DENSIFY_STEP_M)]
    densify_step_m: f64,

    /// Arrival detection band around each stop, in meters
    #[arg(long, default_value_t = DEFAULT_TOLERANCE_M)]
    tolerance_m: f64,

    /// Longest gap between scheduled start and first sample that still anchors it
    #[arg(long, default_value_t = DEFAULT_MAX_SCHEDULE_ANCHOR_GAP_MILLIS)]
    max_anchor_gap_ms: i64,

    /// Arrival time zone as minutes east of UTC
    #[arg(long, default_value_t = 60, allow_negative_numbers = true)]
    utc_offset_minutes: i32,

    /// Verbose output (show debug messages)
    #[arg(short, long)]
    verbose: bool,
}

struct Providers {
    stops: Arc<dyn StopProvider>,
    shapes: Arc<dyn ShapeProvider>,
    schedules: Arc<dyn TripScheduleProvider>,
}

fn providers(backend_url: Option<&str>) -> Providers {
    match backend_url {
        Some(url) => {
            log::info!("Trip data: backend at {url}");
            let backend = Arc::new(BackendTripDataProvider::new(ReqwestFetcher::new(), url));
            Providers {
                stops: backend.clone(),
                shapes: backend,
                schedules: Arc::new(NoSchedule),
            }
        }
        None => {
            log::info!("Trip data: built-in demo trip {}", demo::DEMO_TRIP);
            let data = Arc::new(demo::trip_data());
            Providers {
                stops: data.clone(),
                shapes: data.clone(),
                schedules: data,
            }
        }
    }
}

fn read_samples(path: &Path) -> Result<Vec<PositionSample>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse samples in {}", path.display()))
}

/// Events of one replay, plus the number of samples that failed
struct Replay {
    events: Vec<StopArrivalEvent>,
    failed: usize,
}

async fn replay<S: VehicleStateStore, Tz: TimeZone>(
    processor: &mut ArrivalProcessor<S, Tz>,
    agency: &AgencyIdentifier,
    samples: &[PositionSample],
) -> Replay {
    let mut events = Vec::new();
    let mut failed = 0;

    for sample in samples {
        match processor.process(agency, sample).await {
            Ok(batch) => events.extend(batch),
            Err(e) => {
                failed += 1;
                log::warn!(
                    "Skipping sample of {} on {} at {}: {e}",
                    sample.vehicle_id,
                    sample.trip_id,
                    sample.ts_millis
                );
            }
        }
    }

    Replay { events, failed }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if args.verbose { "debug" } else { "info" }),
    )
    .format_timestamp(None)
    .init();

    let config = DetectorConfig::new(args.densify_step_m, args.tolerance_m, args.max_anchor_gap_ms)
        .context("Invalid detector configuration")?;
    let zone = FixedOffset::east_opt(args.utc_offset_minutes * 60)
        .with_context(|| format!("UTC offset out of range: {} minutes", args.utc_offset_minutes))?;

    let samples = match &args.input {
        Some(path) => {
            log::info!("Input: {}", path.display());
            read_samples(path)?
        }
        None => {
            log::info!("Input: built-in demo samples");
            demo::samples()
        }
    };

    let Providers {
        stops,
        shapes,
        schedules,
    } = providers(args.backend_url.as_deref());
    let cache = Arc::new(TripPathCache::new(stops, shapes, schedules, &config));

    let mut processor = ArrivalProcessor::new(
        cache.clone(),
        ArrivalDetector::new(&config),
        InMemoryStateStore::new(),
        zone,
    );

    let agency = AgencyIdentifier::new(&args.agency);
    let Replay { events, failed } = replay(&mut processor, &agency, &samples).await;

    for event in &events {
        println!("{}", serde_json::to_string(event)?);
    }

    log::info!(
        "Replayed {} samples: {} arrivals, {} failed, {} trips, {} vehicles",
        samples.len(),
        events.len(),
        failed,
        cache.len().await,
        processor.store().len()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::io::Write;

    #[test]
    fn test_read_samples() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"vehicle_id":"V9","trip_id":"T7","lat":55.5,"lon":37.5,"ts_millis":1000}}]"#
        )
        .unwrap();

        let samples = read_samples(file.path()).unwrap();
        assert_eq!(samples, [PositionSample::new("V9", "T7", 55.5, 37.5, 1_000)]);
    }

    #[test]
    fn test_read_samples_rejects_bad_input() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"vehicle_id":"V9"}}"#).unwrap();
        assert!(read_samples(file.path()).is_err());

        let missing = file.path().with_extension("missing");
        assert!(read_samples(&missing).is_err());
    }

    #[tokio::test]
    async fn test_demo_replay_reaches_every_stop() {
        let config = DetectorConfig::default();
        let Providers {
            stops,
            shapes,
            schedules,
        } = providers(None);
        let cache = Arc::new(TripPathCache::new(stops, shapes, schedules, &config));
        let mut processor = ArrivalProcessor::new(
            cache,
            ArrivalDetector::new(&config),
            InMemoryStateStore::new(),
            Utc,
        );

        let Replay { events, failed } =
            replay(&mut processor, &AgencyIdentifier::new("demo"), &demo::samples()).await;
        assert_eq!(failed, 0);

        let ids: Vec<_> = events.iter().map(|e| e.stop_id.as_str()).collect();
        assert_eq!(ids, ["S1", "S2", "S3", "S4", "S5"]);

        // Each stop falls between the samples on either side of it
        let windows = [(0, 0), (8_000, 15_000), (8_000, 15_000), (15_000, 20_000), (20_000, 28_000)];
        for (event, (lo, hi)) in events.iter().zip(windows) {
            assert!(
                (lo..=hi).contains(&event.arrival_time_millis),
                "{} at {}",
                event.stop_id,
                event.arrival_time_millis
            );
        }
        assert!(events.windows(2).all(|w| w[0].arrival_time_millis <= w[1].arrival_time_millis));
        assert_eq!(processor.store().len(), 1);
    }
}
