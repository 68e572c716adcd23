//! # Dock-Ward Engine
//!
//! Scene, physics and collision-dispatch core of the Project Dock-Ward 3D
//! platformer.
//!
//! ## Features
//!
//! - **ECS**: generational entity handles with typed component storage and
//!   attach/detach lifecycle hooks
//! - **Physics**: rapier3d rigid bodies owned by the scene, stepped in bounded
//!   sub-steps, with sorted collision records per frame
//! - **Reactions**: collision tag pairs mapped to gameplay closures
//! - **Levels**: data-driven scenes loaded from RON/TOML or built in code
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dockward_engine::prelude::*;
//!
//! fn main() -> Result<(), AppError> {
//!     let config = EngineConfig::default();
//!     let mut level = LevelDefinition::new("sandbox");
//!     level.entities.push(EntityDefinition::new("player", Vec3::new(0.0, 2.0, 0.0)));
//!
//!     let mut resources = ResourceCache::new("resources");
//!     let scene = Scene::from_level(&config, &level, &mut resources)?;
//!
//!     let mut app = App::new(config, SilentAudio::new(), DrawList::new())?;
//!     app.push_level(scene)?;
//!     let keys = KeyboardState::new();
//!     while !app.frame(&keys, 1.0 / 60.0)?.should_exit() {}
//!     app.shutdown()
//! }
//! ```

#![warn(missing_docs)]

pub mod application;
pub mod audio;
pub mod config;
pub mod core;
pub mod ecs;
pub mod foundation;
pub mod input;
pub mod physics;
pub mod render;
pub mod scene;
#[cfg(feature = "window")]
pub mod window;

pub use application::{App, AppError, FrameStatus};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        application::{App, AppError, FrameStatus},
        audio::{AudioEngine, SilentAudio, SoundOptions},
        config::Config,
        core::EngineConfig,
        ecs::{
            components::{CameraComponent, RenderableComponent, RigidBodyComponent, TransformComponent},
            Component, Entity, World,
        },
        foundation::{
            math::{Mat4, Vec3},
            time::Timer,
        },
        input::{InputSource, KeyCode, KeyboardState},
        physics::{BodyKind, BodyShape, IdentityTag, PhysicsWorld},
        render::{DrawList, Renderer, ResourceCache},
        scene::{
            BodyDefinition, EntityDefinition, LevelDefinition, ReactionContext, ReactionRule, ReactionSpec, Scene,
            SceneEvent, SceneManager, Target,
        },
    };
}
