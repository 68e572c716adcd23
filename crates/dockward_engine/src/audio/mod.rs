//! Audio contract
//!
//! Fire-and-forget playback addressed by name. The scene only ever asks for a
//! sound to be started or unloaded; it never waits on audio.

#[cfg(feature = "audio")]
pub mod rodio_backend;
pub mod silent;

#[cfg(feature = "audio")]
pub use rodio_backend::RodioAudio;
pub use silent::SilentAudio;

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// How a sound should be played
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SoundOptions {
    /// Position the sound in the world instead of playing it flat
    pub is_3d: bool,
    /// Restart when finished
    pub looping: bool,
    /// Decode from disk while playing instead of loading up front
    pub streaming: bool,
}

impl SoundOptions {
    /// Looping streamed background music
    pub fn music() -> Self {
        Self {
            is_3d: false,
            looping: true,
            streaming: true,
        }
    }

    /// One-shot effect
    pub fn effect() -> Self {
        Self::default()
    }
}

/// Playback backend used by the application
pub trait AudioEngine {
    /// Open the output device
    fn init(&mut self) -> Result<(), AudioError>;

    /// Per-frame housekeeping (drops finished sounds)
    fn update(&mut self);

    /// Stop everything and release the device
    fn shutdown(&mut self);

    /// Load `path` and start playing it under `name`
    ///
    /// A sound already playing under the same name is replaced.
    fn load_and_play(&mut self, name: &str, path: &Path, options: SoundOptions) -> Result<(), AudioError>;

    /// Stop and forget the sound called `name`; `false` if there was none
    fn unload(&mut self, name: &str) -> bool;

    /// Whether `name` is currently playing
    fn is_playing(&self, name: &str) -> bool;
}

/// Audio system errors
#[derive(Error, Debug)]
pub enum AudioError {
    /// `init` was not called (or failed)
    #[error("audio engine not initialized")]
    NotInitialized,

    /// The output device could not be opened
    #[error("audio backend initialization failed: {0}")]
    BackendInitFailed(String),

    /// Opening or reading the sound file failed
    #[error("failed to read sound file: {0}")]
    Io(#[from] std::io::Error),

    /// Decoding or sink creation failed
    #[error("playback failed: {0}")]
    PlaybackFailed(String),
}
