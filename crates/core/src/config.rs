//! Detector configuration.

use serde::{Deserialize, Serialize};

use crate::error::{ArrivalError, Result};

pub const DEFAULT_DENSIFY_STEP_M: f64 = 10.0;
pub const DEFAULT_TOLERANCE_M: f64 = 0.0;
pub const DEFAULT_MAX_SCHEDULE_ANCHOR_GAP_MILLIS: i64 = 30 * 60 * 1000;

/// Validated engine settings
///
/// Fields are private so a value of this type is always valid; deserializing
/// goes through the same checks as [`DetectorConfig::new`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDetectorConfig")]
pub struct DetectorConfig {
    densify_step_m: f64,
    tolerance_m: f64,
    max_schedule_anchor_gap_millis: i64,
}

impl DetectorConfig {
    pub fn new(
        densify_step_m: f64,
        tolerance_m: f64,
        max_schedule_anchor_gap_millis: i64,
    ) -> Result<Self> {
        if !(densify_step_m.is_finite() && densify_step_m > 0.0) {
            return Err(ArrivalError::InvalidConfig(format!(
                "densify_step_m must be > 0, got {densify_step_m}"
            )));
        }
        if !(tolerance_m.is_finite() && tolerance_m >= 0.0) {
            return Err(ArrivalError::InvalidConfig(format!(
                "tolerance_m must be >= 0, got {tolerance_m}"
            )));
        }
        if max_schedule_anchor_gap_millis <= 0 {
            return Err(ArrivalError::InvalidConfig(format!(
                "max_schedule_anchor_gap_millis must be > 0, got {max_schedule_anchor_gap_millis}"
            )));
        }

        Ok(Self {
            densify_step_m,
            tolerance_m,
            max_schedule_anchor_gap_millis,
        })
    }

    /// Max spacing between consecutive path points
    pub fn densify_step_m(&self) -> f64 {
        self.densify_step_m
    }

    /// Width of the band around a stop that counts as reaching it
    pub fn tolerance_m(&self) -> f64 {
        self.tolerance_m
    }

    /// Longest gap between scheduled start and first sample that still
    /// anchors the first sample to the trip start
    pub fn max_schedule_anchor_gap_millis(&self) -> i64 {
        self.max_schedule_anchor_gap_millis
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            densify_step_m: DEFAULT_DENSIFY_STEP_M,
            tolerance_m: DEFAULT_TOLERANCE_M,
            max_schedule_anchor_gap_millis: DEFAULT_MAX_SCHEDULE_ANCHOR_GAP_MILLIS,
        }
    }
}

#[derive(Deserialize)]
#[serde(default)]
struct RawDetectorConfig {
    densify_step_m: f64,
    tolerance_m: f64,
    max_schedule_anchor_gap_millis: i64,
}

impl Default for RawDetectorConfig {
    fn default() -> Self {
        let config = DetectorConfig::default();
        Self {
            densify_step_m: config.densify_step_m,
            tolerance_m: config.tolerance_m,
            max_schedule_anchor_gap_millis: config.max_schedule_anchor_gap_millis,
        }
    }
}

impl TryFrom<RawDetectorConfig> for DetectorConfig {
    type Error = ArrivalError;

    fn try_from(raw: RawDetectorConfig) -> Result<Self> {
        Self::new(
            raw.densify_step_m,
            raw.tolerance_m,
            raw.max_schedule_anchor_gap_millis,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DetectorConfig::default();
        assert_eq!(config.densify_step_m(), 10.0);
        assert_eq!(config.tolerance_m(), 0.0);
        assert_eq!(config.max_schedule_anchor_gap_millis(), 1_800_000);
        assert_eq!(DetectorConfig::new(10.0, 0.0, 1_800_000).unwrap(), config);
    }

    #[test]
    fn test_rejects_invalid_values() {
        assert!(matches!(
            DetectorConfig::new(0.0, 0.0, 1),
            Err(ArrivalError::InvalidConfig(_))
        ));
        assert!(DetectorConfig::new(-1.0, 0.0, 1).is_err());
        assert!(DetectorConfig::new(f64::NAN, 0.0, 1).is_err());
        assert!(DetectorConfig::new(10.0, -0.5, 1).is_err());
        assert!(DetectorConfig::new(10.0, 0.0, 0).is_err());
        assert!(DetectorConfig::new(10.0, 0.0, -60_000).is_err());

        // Zero tolerance is allowed
        assert!(DetectorConfig::new(5.0, 0.0, 1).is_ok());
    }

    #[test]
    fn test_deserialize_validates() {
        let config: DetectorConfig = serde_json::from_str(r#"{ "tolerance_m": 15.0 }"#).unwrap();
        assert_eq!(config.tolerance_m(), 15.0);
        assert_eq!(config.densify_step_m(), DEFAULT_DENSIFY_STEP_M);

        let err = serde_json::from_str::<DetectorConfig>(r#"{ "densify_step_m": 0.0 }"#)
            .unwrap_err();
        assert!(err.to_string().contains("densify_step_m must be > 0"));
    }
}
