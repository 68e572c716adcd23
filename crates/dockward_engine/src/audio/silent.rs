//! Audio engine without an output device
//!
//! Logs and records every request. Used when audio is disabled, in headless
//! runs and by tests.

use super::{AudioEngine, AudioError, SoundOptions};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// A recorded `load_and_play` request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayRequest {
    /// Sound name
    pub name: String,
    /// Requested file
    pub path: PathBuf,
    /// Requested options
    pub options: SoundOptions,
}

/// Audio engine that plays nothing
#[derive(Debug, Default)]
pub struct SilentAudio {
    initialized: bool,
    playing: BTreeMap<String, PlayRequest>,
    history: Vec<PlayRequest>,
}

impl SilentAudio {
    /// Create an uninitialized engine
    pub fn new() -> Self {
        Self::default()
    }

    /// Every play request since creation, oldest first
    pub fn history(&self) -> &[PlayRequest] {
        &self.history
    }

    /// Whether `init` has been called without a matching `shutdown`
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }
}

impl AudioEngine for SilentAudio {
    fn init(&mut self) -> Result<(), AudioError> {
        self.initialized = true;
        log::info!("Audio disabled, using silent engine");
        Ok(())
    }

    fn update(&mut self) {
        // One-shot sounds finish immediately without a device.
        self.playing.retain(|_, request| request.options.looping);
    }

    fn shutdown(&mut self) {
        self.playing.clear();
        self.initialized = false;
    }

    fn load_and_play(&mut self, name: &str, path: &Path, options: SoundOptions) -> Result<(), AudioError> {
        if !self.initialized {
            return Err(AudioError::NotInitialized);
        }

        log::debug!("(silent) play {} from {} {:?}", name, path.display(), options);
        let request = PlayRequest {
            name: name.to_string(),
            path: path.to_path_buf(),
            options,
        };
        self.history.push(request.clone());
        self.playing.insert(name.to_string(), request);
        Ok(())
    }

    fn unload(&mut self, name: &str) -> bool {
        self.playing.remove(name).is_some()
    }

    fn is_playing(&self, name: &str) -> bool {
        self.playing.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_init() {
        let mut audio = SilentAudio::new();
        let result = audio.load_and_play("jump", Path::new("jump.wav"), SoundOptions::effect());
        assert!(matches!(result, Err(AudioError::NotInitialized)));
    }

    #[test]
    fn test_one_shots_finish_on_update() {
        let mut audio = SilentAudio::new();
        audio.init().unwrap();
        audio
            .load_and_play("theme", Path::new("theme.ogg"), SoundOptions::music())
            .unwrap();
        audio
            .load_and_play("jump", Path::new("jump.wav"), SoundOptions::effect())
            .unwrap();

        audio.update();
        assert!(audio.is_playing("theme"));
        assert!(!audio.is_playing("jump"));
        assert_eq!(audio.history().len(), 2);

        assert!(audio.unload("theme"));
        assert!(!audio.unload("theme"));
    }
}
