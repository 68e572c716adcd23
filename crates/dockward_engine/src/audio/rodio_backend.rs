//! Rodio audio backend
//!
//! Plays WAV, OGG Vorbis, MP3 and FLAC. 3D sounds go through a
//! `SpatialSink` whose emitter sits at the listener origin.

use super::{AudioEngine, AudioError, SoundOptions};
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source, SpatialSink};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Cursor};
use std::path::Path;

type BoxedSource = Box<dyn Source<Item = i16> + Send>;

/// A playing sound
enum Voice {
    Flat(Sink),
    Spatial(SpatialSink),
}

impl Voice {
    fn append(&self, source: BoxedSource) {
        match self {
            Voice::Flat(sink) => sink.append(source),
            Voice::Spatial(sink) => sink.append(source),
        }
    }

    fn set_volume(&self, volume: f32) {
        match self {
            Voice::Flat(sink) => sink.set_volume(volume),
            Voice::Spatial(sink) => sink.set_volume(volume),
        }
    }

    fn stop(&self) {
        match self {
            Voice::Flat(sink) => sink.stop(),
            Voice::Spatial(sink) => sink.stop(),
        }
    }

    fn is_finished(&self) -> bool {
        match self {
            Voice::Flat(sink) => sink.empty(),
            Voice::Spatial(sink) => sink.empty(),
        }
    }
}

/// Rodio-based audio engine
pub struct RodioAudio {
    /// Audio output stream (must be kept alive)
    _output_stream: Option<OutputStream>,
    stream_handle: Option<OutputStreamHandle>,
    voices: HashMap<String, Voice>,
    master_volume: f32,
}

impl RodioAudio {
    /// Create an engine playing at `master_volume` (0.0 to 1.0)
    pub fn new(master_volume: f32) -> Self {
        Self {
            _output_stream: None,
            stream_handle: None,
            voices: HashMap::new(),
            master_volume: master_volume.clamp(0.0, 1.0),
        }
    }

    fn decode(path: &Path, options: SoundOptions) -> Result<BoxedSource, AudioError> {
        let source: BoxedSource = if options.streaming {
            let file = File::open(path)?;
            Box::new(
                Decoder::new(BufReader::new(file))
                    .map_err(|e| AudioError::PlaybackFailed(format!("Failed to decode audio: {}", e)))?,
            )
        } else {
            let bytes = std::fs::read(path)?;
            Box::new(
                Decoder::new(Cursor::new(bytes))
                    .map_err(|e| AudioError::PlaybackFailed(format!("Failed to decode audio: {}", e)))?,
            )
        };

        Ok(if options.looping {
            Box::new(source.repeat_infinite())
        } else {
            source
        })
    }
}

impl AudioEngine for RodioAudio {
    fn init(&mut self) -> Result<(), AudioError> {
        if self.stream_handle.is_some() {
            return Ok(());
        }

        let (stream, stream_handle) = OutputStream::try_default()
            .map_err(|e| AudioError::BackendInitFailed(format!("Failed to create audio output: {}", e)))?;
        self._output_stream = Some(stream);
        self.stream_handle = Some(stream_handle);

        log::info!("Rodio audio backend initialized");
        Ok(())
    }

    fn update(&mut self) {
        self.voices.retain(|_, voice| !voice.is_finished());
    }

    fn shutdown(&mut self) {
        if self.stream_handle.is_none() {
            return;
        }
        for (_, voice) in self.voices.drain() {
            voice.stop();
        }
        self.stream_handle = None;
        self._output_stream = None;
        log::info!("Rodio audio backend shutdown");
    }

    fn load_and_play(&mut self, name: &str, path: &Path, options: SoundOptions) -> Result<(), AudioError> {
        let stream_handle = self.stream_handle.as_ref().ok_or(AudioError::NotInitialized)?;
        let source = Self::decode(path, options)?;

        let voice = if options.is_3d {
            SpatialSink::try_new(stream_handle, [0.0, 0.0, 0.0], [-0.1, 0.0, 0.0], [0.1, 0.0, 0.0])
                .map(Voice::Spatial)
        } else {
            Sink::try_new(stream_handle).map(Voice::Flat)
        }
        .map_err(|e| AudioError::PlaybackFailed(format!("Failed to create sink: {}", e)))?;

        voice.set_volume(self.master_volume);
        voice.append(source);
        if let Some(previous) = self.voices.insert(name.to_string(), voice) {
            previous.stop();
        }

        log::debug!("Playing {} from {}", name, path.display());
        Ok(())
    }

    fn unload(&mut self, name: &str) -> bool {
        match self.voices.remove(name) {
            Some(voice) => {
                voice.stop();
                true
            }
            None => false,
        }
    }

    fn is_playing(&self, name: &str) -> bool {
        self.voices.get(name).is_some_and(|voice| !voice.is_finished())
    }
}

impl Drop for RodioAudio {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_play_without_initialization() {
        let mut audio = RodioAudio::new(1.0);
        let result = audio.load_and_play("jump", Path::new("missing.wav"), SoundOptions::effect());
        assert!(matches!(result, Err(AudioError::NotInitialized)));
    }

    #[test]
    fn test_missing_file_is_an_io_error() {
        let mut audio = RodioAudio::new(0.5);
        // May fail in CI/test environments without audio device
        if audio.init().is_ok() {
            let result = audio.load_and_play("jump", Path::new("missing.wav"), SoundOptions::effect());
            assert!(matches!(result, Err(AudioError::Io(_))));
            assert!(!audio.is_playing("jump"));
        }
    }
}
