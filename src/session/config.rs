//! Simulation Configuration
//!
//! Everything tunable about a run, grouped per concern. All sections have
//! defaults, so a config file only needs the values it changes.
//!
//! ```json
//! {
//!   "physics": { "gravity": 0.6, "jump_strength": -13 },
//!   "camera": { "shake_on_break": false },
//!   "session": { "starting_hearts": 5 }
//! }
//! ```

use serde::{Serialize, Deserialize};

use crate::core::fixed::{MAX_HEARTS, STARTING_HEARTS};
use crate::game::camera::CameraConfig;
use crate::game::physics::PhysicsConfig;
use crate::replay::transcript::CHECKPOINT_INTERVAL;
use crate::TICK_RATE;

/// Loop and bookkeeping settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Hearts at level start (at most MAX_HEARTS)
    pub starting_hearts: u32,
    /// Simulation steps per second
    pub tick_rate: u32,
    /// Cap on catch-up steps in a single frame
    pub max_steps_per_frame: u32,
    /// Ticks between transcript checkpoints (0 disables checkpoints)
    pub checkpoint_interval: u32,
    /// Record a replay transcript for each run
    pub record_transcript: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            starting_hearts: STARTING_HEARTS,
            tick_rate: TICK_RATE,
            max_steps_per_frame: 5,
            checkpoint_interval: CHECKPOINT_INTERVAL,
            record_transcript: true,
        }
    }
}

/// Full simulation configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub physics: PhysicsConfig,
    pub camera: CameraConfig,
    pub session: SessionConfig,
}

impl SimConfig {
    /// Parse and validate a config from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the simulation cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.physics;
        if p.player_width <= 0 || p.player_height <= 0 {
            return Err(ConfigError::Invalid("player size must be positive".into()));
        }
        if p.move_speed < 0 || p.max_neck_length < 0 || p.neck_grow < 0 || p.neck_shrink < 0 {
            return Err(ConfigError::Invalid("speeds and neck rates must not be negative".into()));
        }
        if p.landing_tolerance < 0 {
            return Err(ConfigError::Invalid("landing tolerance must not be negative".into()));
        }
        if self.camera.viewport_width <= 0 || self.camera.viewport_height <= 0 {
            return Err(ConfigError::Invalid("viewport must be positive".into()));
        }
        if self.session.tick_rate == 0 {
            return Err(ConfigError::Invalid("tick rate must be positive".into()));
        }
        if self.session.starting_hearts > MAX_HEARTS {
            return Err(ConfigError::Invalid(format!(
                "starting hearts {} exceeds {}",
                self.session.starting_hearts, MAX_HEARTS
            )));
        }
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixed::{from_int, to_fixed, GRAVITY};

    #[test]
    fn test_defaults() {
        let config = SimConfig::default();
        assert_eq!(config.physics.gravity, GRAVITY);
        assert_eq!(config.session.starting_hearts, 3);
        assert_eq!(config.session.tick_rate, 60);
        assert!(config.camera.shake_on_break);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = SimConfig::from_json(
            r#"{ "physics": { "gravity": 0.6, "jump_strength": -13 }, "session": { "starting_hearts": 5 } }"#,
        )
        .unwrap();

        assert_eq!(config.physics.gravity, to_fixed(0.6));
        assert_eq!(config.physics.jump_strength, from_int(-13));
        assert_eq!(config.physics.move_speed, from_int(5));
        assert_eq!(config.session.starting_hearts, 5);
        assert_eq!(config.camera, CameraConfig::default());
    }

    #[test]
    fn test_empty_json_is_default() {
        assert_eq!(SimConfig::from_json("{}").unwrap(), SimConfig::default());
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            SimConfig::from_json(r#"{ "session": { "tick_rate": 0 } }"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            SimConfig::from_json(r#"{ "session": { "starting_hearts": 9 } }"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            SimConfig::from_json(r#"{ "physics": { "player_width": 0 } }"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(SimConfig::from_json("{ nope"), Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_json_roundtrip() {
        let mut config = SimConfig::default();
        config.camera.shake_duration_ticks = 30;
        let json = config.to_json().unwrap();
        assert_eq!(SimConfig::from_json(&json).unwrap(), config);
    }
}
