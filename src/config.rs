// src/config.rs

use crate::types::PreferredSide;
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::fs;

// ============================================================================
// FIXED TIMING / GEOMETRY CONSTANTS
// ============================================================================

pub const INDICATOR_PULSE_S: f64 = 0.1;
pub const INDICATOR_COOLDOWN_S: f64 = 1.0;
pub const LANE_TOLERANCE_FACTOR: f64 = 0.75;
pub const LANE_CHANGE_STALL_BUFFER_S: f64 = 3.0;
pub const CLEARING_TIMEOUT_S: f64 = 30.0;
pub const SPEED_PULSE_HOLD_S: f64 = 0.25;

// ============================================================================
// CONFIG TREE
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub overtake: OvertakeConfig,
    pub replay: ReplayConfig,
    pub logging: LoggingConfig,
}

/// Controller thresholds. Passed by reference into every tick, so edits
/// take effect on the next tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OvertakeConfig {
    pub enabled: bool,
    pub preferred_side: PreferredSide,
    pub min_speed_kph: f64,
    /// Lead vehicle must be closer than this to motivate an overtake.
    #[serde(alias = "min_lead_distance_m")]
    pub max_lead_distance_m: f64,
    pub min_speed_delta_kph: f64,
    pub hold_duration_s: f64,
    pub lane_clear_front_m: f64,
    pub lane_clear_rear_m: f64,
    pub rear_time_gap_s: f64,
    pub return_clearance_m: f64,
    pub intersection_buffer_m: f64,
    pub request_timeout_s: f64,
    pub overtake_speed_boost_kph: f64,
    pub lane_width_m: f64,
    pub require_highway: bool,
}

impl Default for OvertakeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            preferred_side: PreferredSide::PassLeft,
            min_speed_kph: 45.0,
            max_lead_distance_m: 40.0,
            min_speed_delta_kph: 12.0,
            hold_duration_s: 2.0,
            lane_clear_front_m: 55.0,
            lane_clear_rear_m: 20.0,
            rear_time_gap_s: 2.5,
            return_clearance_m: 30.0,
            intersection_buffer_m: 150.0,
            request_timeout_s: 6.0,
            overtake_speed_boost_kph: 15.0,
            lane_width_m: 3.7,
            require_highway: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayConfig {
    pub input_dir: String,
    pub output_dir: String,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            input_dir: "recordings".to_string(),
            output_dir: "output".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

// ============================================================================
// LOADING / VALIDATION
// ============================================================================

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    pub fn from_yaml(contents: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(contents)?;
        config.overtake.validate()?;
        Ok(config)
    }
}

impl OvertakeConfig {
    /// Accepted ranges mirror what the settings page lets a user select.
    pub fn validate(&self) -> Result<()> {
        let ranged = [
            ("min_speed_kph", self.min_speed_kph, 20.0, 110.0),
            ("max_lead_distance_m", self.max_lead_distance_m, 10.0, 120.0),
            ("min_speed_delta_kph", self.min_speed_delta_kph, 5.0, 30.0),
            ("hold_duration_s", self.hold_duration_s, 0.5, 5.0),
            ("lane_clear_front_m", self.lane_clear_front_m, 20.0, 120.0),
            ("lane_clear_rear_m", self.lane_clear_rear_m, 5.0, 40.0),
            ("rear_time_gap_s", self.rear_time_gap_s, 1.0, 4.0),
            ("return_clearance_m", self.return_clearance_m, 15.0, 60.0),
            ("intersection_buffer_m", self.intersection_buffer_m, 60.0, 400.0),
            ("overtake_speed_boost_kph", self.overtake_speed_boost_kph, 0.0, 30.0),
        ];

        for (name, value, min, max) in ranged {
            if !value.is_finite() || value < min || value > max {
                bail!("{} = {} is outside [{}, {}]", name, value, min, max);
            }
        }

        for (name, value) in [
            ("request_timeout_s", self.request_timeout_s),
            ("lane_width_m", self.lane_width_m),
        ] {
            if !value.is_finite() || value <= 0.0 {
                bail!("{} must be a positive number, got {}", name, value);
            }
        }

        Ok(())
    }

    /// Boost is sent to cruise control in whole km/h steps.
    pub fn boost_steps(&self) -> i32 {
        self.overtake_speed_boost_kph as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PreferredSide;

    #[test]
    fn test_defaults_are_valid() {
        assert!(OvertakeConfig::default().validate().is_ok());
        assert_eq!(OvertakeConfig::default().boost_steps(), 15);
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let config = Config::from_yaml(
            "overtake:\n  preferred_side: PassRight\n  min_lead_distance_m: 60.0\n",
        )
        .unwrap();

        assert_eq!(config.overtake.preferred_side, PreferredSide::PassRight);
        assert_eq!(config.overtake.max_lead_distance_m, 60.0);
        assert_eq!(config.overtake.hold_duration_s, 2.0);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.replay.input_dir, "recordings");
    }

    #[test]
    fn test_out_of_range_value_rejected() {
        let err = Config::from_yaml("overtake:\n  hold_duration_s: 9.0\n").unwrap_err();
        assert!(err.to_string().contains("hold_duration_s"));
    }

    #[test]
    fn test_non_positive_lane_width_rejected() {
        let config = OvertakeConfig {
            lane_width_m: 0.0,
            ..OvertakeConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_nan_rejected() {
        let config = OvertakeConfig {
            rear_time_gap_s: f64::NAN,
            ..OvertakeConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
