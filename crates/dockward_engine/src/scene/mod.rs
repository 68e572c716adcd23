//! Scenes
//!
//! A scene is one playable level: an entity registry, its physics world, the
//! reaction rules fired by collisions, and scripted animations. Scenes are
//! built from [`LevelDefinition`] data and sequenced by [`SceneManager`].

pub mod animation;
pub mod event;
pub mod jump;
pub mod level;
pub mod manager;
pub mod reactions;
pub mod runtime;
pub mod state;


pub use animation::{Animation, AnimationState, AnimationStep, Animator, InterpolationTimer, TimerMode};
pub use event::{SceneEvent, SoundCue};
pub use jump::JumpController;
pub use level::{
    AnimationDefinition, BodyDefinition, EntityDefinition, LevelDefinition, LevelError, ReactionRule,
    RenderableDefinition, SoundDefinition,
};
pub use manager::SceneManager;
pub use reactions::{Reaction, ReactionContext, ReactionSpec, ReactionTable, TagPair, Target};
pub use runtime::{FrameReport, Scene, SceneError};
pub use state::SceneState;
