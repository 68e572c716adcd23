//! # Unified Configuration System
//!
//! All tunables live here so a single `dockward.toml` (or `.ron`) can drive
//! the whole game. Every section has defaults and `#[serde(default)]`, so a
//! file only needs to mention what it overrides.

use serde::{Serialize, Deserialize};

pub use crate::config::{Config, ConfigError};
use crate::foundation::math::Vec3;
use crate::input::KeyCode;

/// # Window Configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Window title
    pub title: String,
    /// Window width in pixels
    pub width: u32,
    /// Window height in pixels
    pub height: u32,
    /// Wait for vertical sync on buffer swap
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Project Dock Ward".to_string(),
            width: 800,
            height: 800,
            vsync: true,
        }
    }
}

/// # Physics Configuration
///
/// `max_frame_delta` caps how much wall-clock time a single frame may feed
/// into the simulation (debugger pauses, window drags). The remaining delta is
/// split into sub-steps of at most `max_substep`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Default gravity for scenes that do not specify their own
    pub gravity: Vec3,
    /// Largest single integrator step, in seconds
    pub max_substep: f32,
    /// Largest frame delta accepted by `Scene::update`, in seconds
    pub max_frame_delta: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, -9.81, 0.0),
            max_substep: 1.0 / 60.0,
            max_frame_delta: 0.25,
        }
    }
}

impl PhysicsConfig {
    /// Check ranges that would stall or destabilise the integrator
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.max_substep > 0.0 && self.max_substep.is_finite()) {
            return Err(ConfigError::Invalid(format!("max_substep must be > 0, got {}", self.max_substep)));
        }
        if !(self.max_frame_delta >= self.max_substep && self.max_frame_delta.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "max_frame_delta ({}) must be >= max_substep ({})",
                self.max_frame_delta, self.max_substep
            )));
        }
        Ok(())
    }
}

/// # Player Configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Horizontal force applied while a movement key is held
    pub move_force: f32,
    /// Upward impulse applied by an honoured jump
    pub jump_impulse: f32,
    /// Jumps allowed while airborne before landing again
    pub max_mid_air_jumps: u32,
    /// Camera offset from the player position
    pub camera_offset: Vec3,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            move_force: 20.0,
            jump_impulse: 5.0,
            max_mid_air_jumps: 1,
            camera_offset: Vec3::new(0.0, 4.0, 10.0),
        }
    }
}

/// # Controls Configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    /// Move along -Z
    pub forward: KeyCode,
    /// Move along +Z
    pub back: KeyCode,
    /// Move along -X
    pub left: KeyCode,
    /// Move along +X
    pub right: KeyCode,
    /// Jump
    pub jump: KeyCode,
    /// Toggle pause on the active scene
    pub pause: KeyCode,
    /// Close the game
    pub quit: KeyCode,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            forward: KeyCode::W,
            back: KeyCode::S,
            left: KeyCode::A,
            right: KeyCode::D,
            jump: KeyCode::Space,
            pause: KeyCode::P,
            quit: KeyCode::Escape,
        }
    }
}

/// # Audio Configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Audio enabled
    pub enabled: bool,
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Directory sound names are resolved against
    pub sounds_dir: String,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            master_volume: 0.7,
            sounds_dir: "resources/audio".to_string(),
        }
    }
}

/// # Engine Configuration
///
/// Top-level configuration that encompasses all engine subsystems.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Log filter used when `RUST_LOG` is unset
    pub log_level: LogLevel,
    /// Window settings
    pub window: WindowConfig,
    /// Simulation settings
    pub physics: PhysicsConfig,
    /// Player tuning
    pub player: PlayerConfig,
    /// Key bindings
    pub controls: ControlsConfig,
    /// Audio settings
    pub audio: AudioConfig,
}

impl EngineConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.physics.validate()?;
        if !(0.0..=1.0).contains(&self.audio.master_volume) {
            return Err(ConfigError::Invalid(format!(
                "master_volume must be within 0..=1, got {}",
                self.audio.master_volume
            )));
        }
        Ok(())
    }
}

impl Config for EngineConfig {}

/// Log filter wrapper so configs can carry `"info"` or `"dockward_engine=debug"`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogLevel(pub String);

impl Default for LogLevel {
    fn default() -> Self {
        Self("info".to_string())
    }
}

impl LogLevel {
    /// Filter string handed to `env_logger`
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_substep() {
        let mut config = EngineConfig::default();
        config.physics.max_substep = 0.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: EngineConfig = toml::from_str(
            r#"
            log_level = "debug"

            [player]
            max_mid_air_jumps = 2
            "#,
        )
        .unwrap();
        assert_eq!(config.log_level.as_str(), "debug");
        assert_eq!(config.player.max_mid_air_jumps, 2);
        assert_eq!(config.controls.jump, KeyCode::Space);
        assert_eq!(config.window.width, 800);
    }

    #[test]
    fn test_round_trip_through_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = EngineConfig::default();
        config.player.jump_impulse = 7.5;

        for name in ["engine.toml", "engine.ron"] {
            let path = dir.path().join(name);
            config.save_to_file(&path).unwrap();
            let loaded = EngineConfig::load_from_file(&path).unwrap();
            assert!((loaded.player.jump_impulse - 7.5).abs() < f32::EPSILON);
        }
    }

    #[test]
    fn test_unknown_extension_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.json");
        assert!(matches!(
            EngineConfig::default().save_to_file(&path),
            Err(ConfigError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_missing_file_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = EngineConfig::load_or_default(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.window.title, "Project Dock Ward");
    }
}
