//! Application context
//!
//! Everything that outlives a single level lives here: configuration, the
//! level sequence, the audio engine, the renderer and the frame timer. The
//! main loop owns one [`App`] and feeds it input once per frame; scenes only
//! ever see the input query and the frame delta.

use crate::audio::{AudioEngine, AudioError};
use crate::config::ConfigError;
use crate::core::EngineConfig;
use crate::foundation::time::Timer;
use crate::input::{InputSource, KeyEdge};
use crate::render::Renderer;
use crate::scene::{Scene, SceneError, SceneEvent, SceneManager, SceneState, SoundCue};
use thiserror::Error;

/// Application-level errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Scene lifecycle or update failure
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Audio backend failure
    #[error("Audio error: {0}")]
    Audio(#[from] AudioError),

    /// Nothing to play
    #[error("no levels queued")]
    NoLevels,
}

/// What the main loop should do after a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    /// Keep going
    Running,
    /// Keep going, the current level is paused
    Paused,
    /// The last level was completed
    Finished,
    /// The player asked to quit
    Quit,
}

impl FrameStatus {
    /// Whether the main loop should stop
    pub fn should_exit(self) -> bool {
        matches!(self, FrameStatus::Finished | FrameStatus::Quit)
    }
}

/// The game application
pub struct App<A: AudioEngine, R: Renderer> {
    config: EngineConfig,
    scenes: SceneManager,
    audio: A,
    audio_ready: bool,
    renderer: R,
    timer: Timer,
    pause_key: KeyEdge,
    level_sounds: Vec<String>,
}

impl<A: AudioEngine, R: Renderer> App<A, R> {
    /// Create the application and bring up audio
    ///
    /// An audio device that fails to open is logged and the game runs muted.
    pub fn new(config: EngineConfig, mut audio: A, renderer: R) -> Result<Self, AppError> {
        config.validate()?;

        let audio_ready = if config.audio.enabled {
            match audio.init() {
                Ok(()) => true,
                Err(err) => {
                    log::warn!("Audio disabled: {}", err);
                    false
                }
            }
        } else {
            log::info!("Audio disabled by configuration");
            false
        };

        Ok(Self {
            config,
            scenes: SceneManager::new(),
            audio,
            audio_ready,
            renderer,
            timer: Timer::new(),
            pause_key: KeyEdge::default(),
            level_sounds: Vec::new(),
        })
    }

    /// Queue a level; the first one queued starts immediately
    pub fn push_level(&mut self, scene: Scene) -> Result<(), AppError> {
        let first = self.scenes.is_finished();
        self.scenes.push(scene)?;
        if first {
            self.start_level_sounds();
        }
        Ok(())
    }

    /// Run one frame with the wall-clock delta since the previous one
    pub fn tick_frame(&mut self, input: &dyn InputSource) -> Result<FrameStatus, AppError> {
        let dt = self.timer.tick();
        self.frame(input, dt)
    }

    /// Run one frame with an explicit delta
    pub fn frame(&mut self, input: &dyn InputSource, dt: f32) -> Result<FrameStatus, AppError> {
        if self.scenes.is_finished() {
            return Err(AppError::NoLevels);
        }
        if input.is_key_down(self.config.controls.quit) {
            log::info!("Quit requested");
            return Ok(FrameStatus::Quit);
        }
        if self.pause_key.pressed(input.is_key_down(self.config.controls.pause)) {
            self.scenes.toggle_pause()?;
        }

        let report = self.scenes.update(dt, input)?;
        if self.audio_ready {
            self.audio.update();
        }

        let mut complete = false;
        if let Some(report) = report {
            for event in report.events {
                match event {
                    SceneEvent::LevelComplete => complete = true,
                    SceneEvent::PlaySound(cue) => self.play(&cue),
                    SceneEvent::Custom(name) => log::info!("Scene event: {}", name),
                }
            }
        }

        self.scenes.render(&mut self.renderer);

        if complete {
            self.stop_level_sounds();
            self.scenes.advance()?;
            if self.scenes.is_finished() {
                log::info!("All {} levels complete", self.scenes.completed());
                return Ok(FrameStatus::Finished);
            }
            self.start_level_sounds();
        }

        match self.scenes.active().map(Scene::state) {
            Some(SceneState::Paused) => Ok(FrameStatus::Paused),
            _ => Ok(FrameStatus::Running),
        }
    }

    fn play(&mut self, cue: &SoundCue) {
        if !self.audio_ready {
            log::trace!("Muted: {}", cue.name);
            return;
        }
        if let Err(err) = self.audio.load_and_play(&cue.name, &cue.path, cue.options) {
            log::warn!("Failed to play sound '{}': {}", cue.name, err);
        }
    }

    fn start_level_sounds(&mut self) {
        let cues: Vec<SoundCue> = self
            .scenes
            .active()
            .map(|scene| scene.startup_sounds().cloned().collect())
            .unwrap_or_default();
        for cue in &cues {
            self.play(cue);
        }
        self.level_sounds = cues.into_iter().map(|cue| cue.name).collect();
    }

    fn stop_level_sounds(&mut self) {
        for name in std::mem::take(&mut self.level_sounds) {
            if self.audio_ready {
                self.audio.unload(&name);
            }
        }
    }

    /// Stop audio and tear down every remaining level
    pub fn shutdown(&mut self) -> Result<(), AppError> {
        while self.scenes.advance()?.is_some() {}
        if self.audio_ready {
            self.audio.shutdown();
            self.audio_ready = false;
        }
        log::info!(
            "Shutdown after {} frames ({:.1} fps average)",
            self.timer.frame_count(),
            self.timer.average_fps()
        );
        Ok(())
    }

    /// Configuration the application was started with
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Level sequence
    pub fn scenes(&self) -> &SceneManager {
        &self.scenes
    }

    /// Audio engine
    pub fn audio(&self) -> &A {
        &self.audio
    }

    /// Renderer
    pub fn renderer(&self) -> &R {
        &self.renderer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{SilentAudio, SoundOptions};
    use crate::foundation::math::Vec3;
    use crate::input::{KeyCode, KeyboardState};
    use crate::physics::{BodyKind, BodyShape, IdentityTag};
    use crate::render::{DrawList, ResourceCache};
    use crate::scene::{BodyDefinition, EntityDefinition, LevelDefinition, ReactionRule, ReactionSpec, SoundDefinition};

    const DT: f32 = 1.0 / 60.0;
    const GOAL: IdentityTag = IdentityTag(7);

    /// Player spawned inside the goal, so the level ends on the first frame
    fn instant_level(name: &str) -> LevelDefinition {
        let mut level = LevelDefinition::new(name);
        level.gravity = Vec3::zeros();
        level.entities.push(
            EntityDefinition::new("player", Vec3::zeros()).with_body(BodyDefinition {
                shape: BodyShape::Sphere { radius: 0.5 },
                tag: IdentityTag::PLAYER,
                ..Default::default()
            }),
        );
        level.entities.push(
            EntityDefinition::new("goal", Vec3::zeros()).with_body(BodyDefinition {
                kind: BodyKind::Static,
                tag: GOAL,
                sensor: true,
                ..Default::default()
            }),
        );
        level.sounds.push(SoundDefinition {
            name: format!("{}_music", name),
            path: "music.ogg".to_string(),
            options: SoundOptions::music(),
            autoplay: true,
        });
        level.sounds.push(SoundDefinition {
            name: "chime".to_string(),
            path: "chime.wav".to_string(),
            options: SoundOptions::effect(),
            autoplay: false,
        });
        level.reactions.push(ReactionRule {
            first: IdentityTag::PLAYER,
            second: GOAL,
            actions: vec![ReactionSpec::PlaySound("chime".to_string()), ReactionSpec::EndLevel],
        });
        level
    }

    fn app_with(levels: &[&str]) -> App<SilentAudio, DrawList> {
        let config = EngineConfig::default();
        let mut app = App::new(config.clone(), SilentAudio::new(), DrawList::new()).unwrap();
        let mut resources = ResourceCache::new(".");
        for name in levels {
            let scene = Scene::from_level(&config, &instant_level(name), &mut resources).unwrap();
            app.push_level(scene).unwrap();
        }
        app
    }

    #[test]
    fn test_levels_play_in_order() {
        let mut app = app_with(&["one", "two"]);
        let keys = KeyboardState::new();
        assert!(app.audio().is_playing("one_music"));

        assert_eq!(app.frame(&keys, DT).unwrap(), FrameStatus::Running);
        assert_eq!(app.scenes().active().unwrap().name(), "two");
        assert!(!app.audio().is_playing("one_music"));
        assert!(app.audio().is_playing("two_music"));
        assert!(app.audio().history().iter().any(|request| request.name == "chime"));

        assert_eq!(app.frame(&keys, DT).unwrap(), FrameStatus::Finished);
        assert!(matches!(app.frame(&keys, DT), Err(AppError::NoLevels)));
    }

    #[test]
    fn test_pause_and_quit_keys() {
        let mut app = app_with(&["one"]);
        let mut keys = KeyboardState::new();
        keys.press(KeyCode::P);

        assert_eq!(app.frame(&keys, DT).unwrap(), FrameStatus::Paused);
        // Held key does not toggle again.
        assert_eq!(app.frame(&keys, DT).unwrap(), FrameStatus::Paused);
        assert_eq!(app.renderer().frames(), 2);

        keys.press(KeyCode::Escape);
        let status = app.frame(&keys, DT).unwrap();
        assert_eq!(status, FrameStatus::Quit);
        assert!(status.should_exit());
    }

    #[test]
    fn test_shutdown_releases_levels() {
        let mut app = app_with(&["one", "two"]);
        app.shutdown().unwrap();
        assert!(app.scenes().is_finished());
        assert!(!app.audio().is_initialized());
    }

    #[test]
    fn test_disabled_audio_stays_silent() {
        let mut config = EngineConfig::default();
        config.audio.enabled = false;
        let app = App::new(config, SilentAudio::new(), DrawList::new()).unwrap();
        assert!(!app.audio().is_initialized());
    }
}
