//! Events raised by gameplay reactions

use crate::audio::SoundOptions;
use std::path::PathBuf;

/// A resolved request to play a sound
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoundCue {
    /// Name the sound is addressed by
    pub name: String,
    /// File to play
    pub path: PathBuf,
    /// Playback options
    pub options: SoundOptions,
}

/// Something the application should act on after a frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneEvent {
    /// The level's goal was reached
    LevelComplete,
    /// Start a sound
    PlaySound(SoundCue),
    /// Game-specific notification
    Custom(String),
}
