//! Ordered level sequence

use super::runtime::{FrameReport, Scene, SceneError};
use super::state::SceneState;
use crate::input::InputSource;
use crate::render::Renderer;
use std::collections::VecDeque;

/// Runs scenes one after another; the front scene is the current one
#[derive(Default)]
pub struct SceneManager {
    scenes: VecDeque<Scene>,
    completed: usize,
}

impl SceneManager {
    /// Create an empty manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an initialized scene
    ///
    /// The first scene queued is activated straight away.
    pub fn push(&mut self, mut scene: Scene) -> Result<(), SceneError> {
        if self.scenes.is_empty() && scene.state() == SceneState::Initialized {
            scene.activate()?;
        }
        log::debug!("Queued scene '{}' ({} waiting)", scene.name(), self.scenes.len());
        self.scenes.push_back(scene);
        Ok(())
    }

    /// Current scene
    pub fn active(&self) -> Option<&Scene> {
        self.scenes.front()
    }

    /// Mutable current scene
    pub fn active_mut(&mut self) -> Option<&mut Scene> {
        self.scenes.front_mut()
    }

    /// Number of scenes not yet finished, the current one included
    pub fn remaining(&self) -> usize {
        self.scenes.len()
    }

    /// Number of scenes finished so far
    pub fn completed(&self) -> usize {
        self.completed
    }

    /// No scenes left to play
    pub fn is_finished(&self) -> bool {
        self.scenes.is_empty()
    }

    /// Pause the current scene if active, resume it if paused
    ///
    /// Returns the state afterwards.
    pub fn toggle_pause(&mut self) -> Result<Option<SceneState>, SceneError> {
        let Some(scene) = self.scenes.front_mut() else {
            return Ok(None);
        };
        match scene.state() {
            SceneState::Active => scene.pause()?,
            SceneState::Paused => scene.resume()?,
            _ => {}
        }
        Ok(Some(scene.state()))
    }

    /// Destroy the current scene and activate the next one
    ///
    /// Returns the finished scene so callers can release what it used.
    pub fn advance(&mut self) -> Result<Option<Scene>, SceneError> {
        let Some(mut finished) = self.scenes.pop_front() else {
            return Ok(None);
        };
        if finished.state() != SceneState::Destroyed {
            finished.destroy()?;
        }
        self.completed += 1;

        if let Some(next) = self.scenes.front_mut() {
            if next.state() == SceneState::Initialized {
                next.activate()?;
            }
            log::info!("Advanced from '{}' to '{}'", finished.name(), next.name());
        } else {
            log::info!("Finished '{}', no levels left", finished.name());
        }
        Ok(Some(finished))
    }

    /// Update the current scene
    ///
    /// A paused scene is skipped (`Ok(None)`).
    pub fn update(&mut self, dt: f32, input: &dyn InputSource) -> Result<Option<FrameReport>, SceneError> {
        match self.scenes.front_mut() {
            Some(scene) if scene.state() == SceneState::Active => scene.update(dt, input).map(Some),
            _ => Ok(None),
        }
    }

    /// Render the current scene
    pub fn render(&self, renderer: &mut dyn Renderer) {
        if let Some(scene) = self.scenes.front() {
            scene.render(renderer);
        }
    }
}
