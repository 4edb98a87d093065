use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Tunable constants of the estimation engine.
///
/// Every field has a default, so a partial JSON document only needs to name
/// the values it overrides.
///
/// Example:
/// ```
/// use optifit::EstimatorConfig;
///
/// let config = EstimatorConfig::default();
/// assert_eq!(config.max_samples, 20);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorConfig {
    /// Upper bound (exclusive) for each gaze up/down blend shape.
    pub gaze_limit: f32,
    /// Head yaw must lie strictly within +/- this many degrees.
    pub max_head_yaw_degrees: f32,
    /// Capacity of the measurement window and sample quota of the gate.
    pub max_samples: usize,
    /// Sample count at which the window is considered settled and thinning starts.
    pub settle_threshold: usize,
    /// Near PD is far PD minus this offset, in millimeters.
    pub near_pd_offset_mm: f32,
    /// Period between landmark scans, in milliseconds.
    pub scan_interval_ms: u64,
    /// Period of the slow thinning of the window, in milliseconds.
    pub thinning_interval_ms: u64,
    /// Delay before checking whether the export sheet was dismissed, in milliseconds.
    pub export_recheck_interval_ms: u64,
    /// Segment height change per stepper action, in millimeters.
    pub segment_height_step_mm: f32,
    /// Discard the first landmark detection after a (re)start.
    pub skip_first_detection: bool,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            gaze_limit: 0.12,
            max_head_yaw_degrees: 3.0,
            max_samples: 20,
            settle_threshold: 5,
            near_pd_offset_mm: 3.0,
            scan_interval_ms: 200,
            thinning_interval_ms: 1000,
            export_recheck_interval_ms: 1000,
            segment_height_step_mm: 0.3,
            skip_first_detection: true,
        }
    }
}

impl EstimatorConfig {
    /// Check that the values describe a usable engine.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.gaze_limit.is_finite() {
            return Err(ConfigError::NotFinite("gaze_limit"));
        }
        if self.gaze_limit <= 0.0 || self.gaze_limit > 1.0 {
            return Err(ConfigError::GazeLimitOutOfRange(self.gaze_limit));
        }

        positive("max_head_yaw_degrees", self.max_head_yaw_degrees as f64)?;
        positive("max_samples", self.max_samples as f64)?;
        positive("scan_interval_ms", self.scan_interval_ms as f64)?;
        positive("thinning_interval_ms", self.thinning_interval_ms as f64)?;
        positive("export_recheck_interval_ms", self.export_recheck_interval_ms as f64)?;
        positive("segment_height_step_mm", self.segment_height_step_mm as f64)?;

        if self.settle_threshold == 0 || self.settle_threshold > self.max_samples {
            return Err(ConfigError::SettleThresholdOutOfRange {
                settle_threshold: self.settle_threshold,
                max_samples: self.max_samples,
            });
        }

        if !self.near_pd_offset_mm.is_finite() {
            return Err(ConfigError::NotFinite("near_pd_offset_mm"));
        }

        Ok(())
    }

    /// Period between landmark scans.
    pub fn scan_interval(&self) -> Duration {
        Duration::from_millis(self.scan_interval_ms)
    }

    /// Period of the slow window thinning.
    pub fn thinning_interval(&self) -> Duration {
        Duration::from_millis(self.thinning_interval_ms)
    }

    /// Delay of the export sheet recheck.
    pub fn export_recheck_interval(&self) -> Duration {
        Duration::from_millis(self.export_recheck_interval_ms)
    }
}

fn positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::NotFinite(name));
    }
    if value <= 0.0 {
        return Err(ConfigError::NotPositive { name, value });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = EstimatorConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.scan_interval(), Duration::from_millis(200));
        assert_eq!(config.thinning_interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_partial_json_uses_defaults() -> Result<(), serde_json::Error> {
        let config: EstimatorConfig =
            serde_json::from_str(r#"{ "max_samples": 30, "settle_threshold": 8 }"#)?;
        assert_eq!(config.max_samples, 30);
        assert_eq!(config.settle_threshold, 8);
        assert_eq!(config.gaze_limit, 0.12);
        assert!(config.skip_first_detection);
        Ok(())
    }

    #[test]
    fn test_settle_threshold_above_capacity() {
        let config = EstimatorConfig {
            settle_threshold: 21,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::SettleThresholdOutOfRange {
                settle_threshold: 21,
                max_samples: 20
            })
        );
    }

    #[test]
    fn test_invalid_values() {
        let config = EstimatorConfig {
            gaze_limit: 1.5,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::GazeLimitOutOfRange(1.5)));

        let config = EstimatorConfig {
            scan_interval_ms: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NotPositive {
                name: "scan_interval_ms",
                ..
            })
        ));

        let config = EstimatorConfig {
            near_pd_offset_mm: f32::NAN,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::NotFinite("near_pd_offset_mm"))
        );
    }
}
