//! Scene lifecycle

use std::fmt;

/// Lifecycle state of a scene
///
/// `Uninitialized → Initialized → (Active ⇄ Paused) → Destroyed`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SceneState {
    /// Created, no level content yet
    #[default]
    Uninitialized,
    /// Level content spawned, not running
    Initialized,
    /// Updated every frame
    Active,
    /// Drawn but not simulated
    Paused,
    /// Torn down; every body has left the physics world
    Destroyed,
}

impl SceneState {
    /// Whether the scene has content that can be drawn
    pub fn is_renderable(self) -> bool {
        matches!(self, SceneState::Initialized | SceneState::Active | SceneState::Paused)
    }
}

impl fmt::Display for SceneState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SceneState::Uninitialized => "uninitialized",
            SceneState::Initialized => "initialized",
            SceneState::Active => "active",
            SceneState::Paused => "paused",
            SceneState::Destroyed => "destroyed",
        };
        f.write_str(name)
    }
}
