// Loop rate, capacities, robot geometry and tunables

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

// Runtime loop frequency
pub const LOOP_HZ: u64 = 50;

// Periodic status heartbeat interval
pub const STATUS_INTERVAL_MS: u64 = 15_000;

// Instruction storage bound, sized for static memory on small targets
pub const MAX_INSTRUCTIONS: usize = 100;

/// Physical geometry and control tunables.
///
/// All lengths are in robot length units (millimetres by default). Encoder
/// step conversion is the actuator driver's concern; the core works in
/// length units throughout.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct RobotConfig {
    /// Distance between the two drive wheels
    pub track_width: f64,

    /// Distance from the axle midpoint to the pen tip, along the heading
    pub pen_offset: f64,

    /// Pen-tip distance below which a move counts as complete
    pub position_tolerance: f64,

    /// Cap on the per-tick wheel delta commanded by the controller
    pub max_step: f64,

    /// Settle time after a pen lift or drop
    pub pen_settle_ms: u64,

    /// Pen servo angle when drawing (degrees)
    pub pen_down_angle: i32,

    /// Pen servo angle when travelling (degrees)
    pub pen_up_angle: i32,

    /// Control/player tick rate
    pub loop_hz: u64,
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            track_width: 117.0,
            pen_offset: 125.0,
            position_tolerance: 1.0,
            max_step: 5.0,
            pen_settle_ms: 500,
            pen_down_angle: 0,
            pen_up_angle: 160,
            loop_hz: LOOP_HZ,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
}

impl RobotConfig {
    /// Load configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = RobotConfig::default();
        assert!(config.track_width > 0.0);
        assert!(config.pen_offset > 0.0);
        assert!(config.position_tolerance > 0.0);
        assert!(config.max_step > 0.0);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: RobotConfig = serde_json::from_str(r#"{"track_width": 200.0}"#).unwrap();
        assert_eq!(config.track_width, 200.0);
        assert_eq!(config.pen_settle_ms, RobotConfig::default().pen_settle_ms);
    }
}
