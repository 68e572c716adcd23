//! Game configuration
//!
//! `dockward.toml` carries the engine sections (`[window]`, `[physics]`,
//! `[player]`, `[controls]`, `[audio]`) next to a `[game]` section that
//! lists the level sequence.

use dockward_engine::config::{Config, ConfigError};
use dockward_engine::core::EngineConfig;
use serde::{Deserialize, Serialize};

/// Full game configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Engine sections
    #[serde(flatten)]
    pub engine: EngineConfig,
    /// Level sequence and asset locations
    pub game: GameSection,
}

/// `[game]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSection {
    /// Level files (`.ron` or `.toml`), played in order; empty plays the built-in levels
    pub levels: Vec<String>,
    /// Directory meshes and textures are resolved against
    pub resources_dir: String,
    /// Frames simulated by the headless loop before giving up
    pub headless_frames: u32,
}

impl Default for GameSection {
    fn default() -> Self {
        Self {
            levels: Vec::new(),
            resources_dir: "resources".to_string(),
            headless_frames: 1800,
        }
    }
}

impl Config for GameConfig {}

impl GameConfig {
    /// Validate engine and game settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.engine.validate()?;
        if self.game.headless_frames == 0 {
            return Err(ConfigError::Invalid("headless_frames must be > 0".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = GameConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.game.levels.is_empty());
    }

    #[test]
    fn test_toml_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dockward.toml");

        let mut config = GameConfig::default();
        config.engine.player.max_mid_air_jumps = 2;
        config.game.levels = vec!["levels/dock.ron".to_string()];
        config.save_to_file(&path).unwrap();

        let loaded = GameConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded.engine.player.max_mid_air_jumps, 2);
        assert_eq!(loaded.game, config.game);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dockward.toml");
        std::fs::write(&path, "[game]\nheadless_frames = 60\n").unwrap();

        let loaded = GameConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded.game.headless_frames, 60);
        assert_eq!(loaded.game.resources_dir, "resources");
        assert_eq!(loaded.engine.player.max_mid_air_jumps, 1);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = GameConfig::load_or_default(dir.path().join("absent.toml")).unwrap();
        assert_eq!(loaded.game, GameSection::default());
    }
}
