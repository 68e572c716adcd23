//! Scene runtime
//!
//! A [`Scene`] owns one entity registry and one physics world and runs the
//! per-frame loop over them:
//!
//! 1. input → forces / jump impulse on the player
//! 2. physics step
//! 3. collision harvest
//! 4. grounded recompute, then reaction dispatch per collision record
//! 5. scripted animations
//! 6. transforms derived from bodies, camera follows the player
//!
//! Rendering is a separate read-only pass.

use super::animation::{Animation, Animator, InterpolationTimer};
use super::event::{SceneEvent, SoundCue};
use super::jump::JumpController;
use super::level::{EntityDefinition, LevelDefinition, LevelError};
use super::reactions::{place_entity, ReactionContext, ReactionTable};
use super::state::SceneState;
use crate::config::{Config, ConfigError};
use crate::core::{ControlsConfig, EngineConfig, PhysicsConfig, PlayerConfig};
use crate::ecs::components::{CameraComponent, RenderableComponent, RigidBodyComponent, TransformComponent};
use crate::ecs::{EcsError, Entity, World};
use crate::foundation::math::{Mat4, Vec3};
use crate::input::{InputSource, KeyEdge};
use crate::physics::{BodyKind, CollisionRecord, IdentityTag, PhysicsError, PhysicsWorld};
use crate::render::{Renderer, ResourceCache, TextureHandle};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Scene errors
#[derive(Error, Debug)]
pub enum SceneError {
    /// The requested lifecycle change is not allowed from the current state
    #[error("cannot {action} a scene that is {from}")]
    InvalidTransition {
        /// State the scene was in
        from: SceneState,
        /// What was attempted
        action: &'static str,
    },

    /// `update` called outside the active state
    #[error("scene is {0}, not active")]
    NotActive(SceneState),

    /// Registry failure
    #[error(transparent)]
    Ecs(#[from] EcsError),

    /// Physics failure
    #[error(transparent)]
    Physics(#[from] PhysicsError),

    /// Invalid level data
    #[error("invalid level: {0}")]
    Level(#[from] LevelError),

    /// Level file could not be loaded
    #[error("failed to load level: {0}")]
    Config(#[from] ConfigError),

    /// No entity with that name
    #[error("no entity named '{0}'")]
    UnknownEntity(String),
}

/// What happened during one `Scene::update`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    /// Delta actually simulated, after clamping
    pub dt: f32,
    /// Collision records harvested this frame
    pub collisions: usize,
    /// Player touched the ground this frame
    pub grounded: bool,
    /// A jump impulse was applied this frame
    pub jumped: bool,
    /// Reactions run this frame
    pub reactions_fired: usize,
    /// Events raised by reactions
    pub events: Vec<SceneEvent>,
}

impl FrameReport {
    /// Whether a reaction ended the level
    pub fn level_complete(&self) -> bool {
        self.events.contains(&SceneEvent::LevelComplete)
    }
}

/// One level instance
pub struct Scene {
    name: String,
    state: SceneState,
    world: World,
    physics: PhysicsWorld,
    reactions: ReactionTable,
    animator: Animator,
    names: HashMap<String, Entity>,
    sounds: HashMap<String, SoundCue>,
    startup_sounds: Vec<String>,
    player: Option<Entity>,
    camera: Option<Entity>,
    jump: JumpController,
    jump_key: KeyEdge,
    collisions: Vec<CollisionRecord>,
    physics_config: PhysicsConfig,
    player_config: PlayerConfig,
    controls: ControlsConfig,
    sounds_dir: PathBuf,
    aspect: f32,
}

impl Scene {
    /// Create an empty, uninitialized scene
    pub fn new(config: &EngineConfig) -> Self {
        let aspect = if config.window.height > 0 {
            config.window.width as f32 / config.window.height as f32
        } else {
            1.0
        };

        Self {
            name: String::new(),
            state: SceneState::Uninitialized,
            world: World::new(),
            physics: PhysicsWorld::from_config(&config.physics),
            reactions: ReactionTable::new(),
            animator: Animator::new(),
            names: HashMap::new(),
            sounds: HashMap::new(),
            startup_sounds: Vec::new(),
            player: None,
            camera: None,
            jump: JumpController::new(config.player.max_mid_air_jumps),
            jump_key: KeyEdge::default(),
            collisions: Vec::new(),
            physics_config: config.physics.clone(),
            player_config: config.player.clone(),
            controls: config.controls.clone(),
            sounds_dir: PathBuf::from(&config.audio.sounds_dir),
            aspect,
        }
    }

    /// Create and initialize a scene from level data
    pub fn from_level(
        config: &EngineConfig,
        level: &LevelDefinition,
        resources: &mut ResourceCache,
    ) -> Result<Self, SceneError> {
        let mut scene = Self::new(config);
        scene.init_scene(level, resources)?;
        Ok(scene)
    }

    /// Load a `.ron` or `.toml` level file and initialize a scene from it
    pub fn from_file(
        config: &EngineConfig,
        path: impl AsRef<Path>,
        resources: &mut ResourceCache,
    ) -> Result<Self, SceneError> {
        let level = LevelDefinition::load_from_file(path)?;
        Self::from_level(config, &level, resources)
    }

    /// Populate the scene from level data
    ///
    /// Uninitialized → Initialized. On failure the scene stays uninitialized
    /// and empty.
    pub fn init_scene(&mut self, level: &LevelDefinition, resources: &mut ResourceCache) -> Result<(), SceneError> {
        self.require(SceneState::Uninitialized, "initialize")?;
        level.validate()?;

        self.name = level.name.clone();
        self.physics.set_gravity(level.gravity);

        if let Err(err) = self.populate(level, resources) {
            self.world.clear(&mut self.physics);
            self.names.clear();
            self.animator = Animator::new();
            self.reactions = ReactionTable::new();
            self.sounds.clear();
            self.startup_sounds.clear();
            self.player = None;
            self.camera = None;
            return Err(err);
        }

        self.state = SceneState::Initialized;
        log::info!(
            "Scene '{}' initialized: {} entities, {} bodies, {} reactions",
            self.name,
            self.world.entity_count(),
            self.physics.body_count(),
            self.reactions.len()
        );
        Ok(())
    }

    fn populate(&mut self, level: &LevelDefinition, resources: &mut ResourceCache) -> Result<(), SceneError> {
        for definition in &level.entities {
            self.spawn(definition, resources)?;
        }

        for definition in &level.animations {
            let target = self.entity(&definition.target)?;
            let timer = InterpolationTimer::new(definition.duration, definition.mode);
            self.animator.insert(
                definition.name.clone(),
                Animation::new(target, definition.from, definition.to, timer),
            );
            if definition.autostart {
                self.animator.start(&definition.name);
            }
        }

        for rule in &level.reactions {
            for action in &rule.actions {
                self.reactions.on_spec(rule.first, rule.second, action.clone());
            }
        }

        for sound in &level.sounds {
            self.sounds.insert(
                sound.name.clone(),
                SoundCue {
                    name: sound.name.clone(),
                    path: self.sounds_dir.join(&sound.path),
                    options: sound.options,
                },
            );
            if sound.autoplay {
                self.startup_sounds.push(sound.name.clone());
            }
        }
        Ok(())
    }

    /// Spawn one entity from its definition
    ///
    /// The first body tagged as player becomes the player; the first camera
    /// becomes the scene camera.
    pub fn spawn(&mut self, definition: &EntityDefinition, resources: &mut ResourceCache) -> Result<Entity, SceneError> {
        let entity = self.world.create_entity();
        let transform = definition.transform.clone();

        if let Some(body) = &definition.body {
            let body = body.to_component(&transform);
            if body.tag == IdentityTag::PLAYER && self.player.is_none() {
                self.player = Some(entity);
            }
            self.world.attach(entity, body, &mut self.physics)?;
        }

        if let Some(renderable) = &definition.renderable {
            let texture = renderable
                .texture
                .as_ref()
                .map_or(TextureHandle::NULL, |path| resources.load_texture(path));
            let material = resources.material(&renderable.material, texture);
            let mesh = resources.load_mesh(&renderable.mesh);
            self.world
                .attach(entity, RenderableComponent::new(material, mesh), &mut self.physics)?;
        }

        if let Some(camera) = &definition.camera {
            let mut camera = camera.clone();
            camera.aspect = self.aspect;
            self.world.attach(entity, camera, &mut self.physics)?;
            if self.camera.is_none() {
                self.camera = Some(entity);
            }
        }

        self.world.attach(entity, transform, &mut self.physics)?;
        self.names.insert(definition.name.clone(), entity);
        log::debug!("Spawned '{}' as entity {}", definition.name, entity);
        Ok(entity)
    }

    /// Destroy an entity, releasing its body
    pub fn destroy_entity(&mut self, entity: Entity) -> Result<(), SceneError> {
        self.world.destroy_entity(entity, &mut self.physics)?;
        self.names.retain(|_, named| *named != entity);
        self.animator.remove_target(entity);
        if self.player == Some(entity) {
            self.player = None;
        }
        if self.camera == Some(entity) {
            self.camera = None;
        }
        Ok(())
    }

    fn require(&self, expected: SceneState, action: &'static str) -> Result<(), SceneError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(SceneError::InvalidTransition {
                from: self.state,
                action,
            })
        }
    }

    /// Initialized → Active
    pub fn activate(&mut self) -> Result<(), SceneError> {
        self.require(SceneState::Initialized, "activate")?;
        self.state = SceneState::Active;
        log::info!("Scene '{}' active", self.name);
        Ok(())
    }

    /// Active → Paused
    pub fn pause(&mut self) -> Result<(), SceneError> {
        self.require(SceneState::Active, "pause")?;
        self.state = SceneState::Paused;
        log::info!("Scene '{}' paused", self.name);
        Ok(())
    }

    /// Paused → Active
    pub fn resume(&mut self) -> Result<(), SceneError> {
        self.require(SceneState::Paused, "resume")?;
        self.state = SceneState::Active;
        log::info!("Scene '{}' resumed", self.name);
        Ok(())
    }

    /// Any state → Destroyed; every entity and body is released
    pub fn destroy(&mut self) -> Result<(), SceneError> {
        if self.state == SceneState::Destroyed {
            return Err(SceneError::InvalidTransition {
                from: self.state,
                action: "destroy",
            });
        }

        self.world.clear(&mut self.physics);
        self.names.clear();
        self.animator = Animator::new();
        self.collisions.clear();
        self.player = None;
        self.camera = None;
        self.state = SceneState::Destroyed;
        log::info!("Scene '{}' destroyed", self.name);
        Ok(())
    }

    /// Run one frame
    pub fn update(&mut self, dt: f32, input: &dyn InputSource) -> Result<FrameReport, SceneError> {
        if self.state != SceneState::Active {
            return Err(SceneError::NotActive(self.state));
        }

        let max_dt = self.physics_config.max_frame_delta;
        let dt = if !dt.is_finite() || dt <= 0.0 {
            0.0
        } else if dt > max_dt {
            log::debug!("Clamping frame delta {:.3}s to {:.3}s", dt, max_dt);
            max_dt
        } else {
            dt
        };
        let mut report = FrameReport {
            dt,
            ..Default::default()
        };

        self.apply_input(input, &mut report);

        self.physics.step(dt);
        self.collisions = self.physics.take_collision_records();
        report.collisions = self.collisions.len();

        self.run_collider_pass(&mut report);
        self.run_animations(dt);
        self.sync_transforms();
        self.follow_player();

        report.grounded = self.jump.grounded();
        Ok(report)
    }

    fn apply_input(&mut self, input: &dyn InputSource, report: &mut FrameReport) {
        let jump_pressed = self.jump_key.pressed(input.is_key_down(self.controls.jump));
        let Some(player) = self.player.filter(|&player| self.world.is_alive(player)) else {
            return;
        };

        let mut direction = Vec3::zeros();
        if input.is_key_down(self.controls.forward) {
            direction.z -= 1.0;
        }
        if input.is_key_down(self.controls.back) {
            direction.z += 1.0;
        }
        if input.is_key_down(self.controls.left) {
            direction.x -= 1.0;
        }
        if input.is_key_down(self.controls.right) {
            direction.x += 1.0;
        }
        if direction != Vec3::zeros() {
            let force = direction.normalize() * self.player_config.move_force;
            self.physics.add_force(player, force);
        }

        // A body that cannot take the impulse must not spend a mid-air jump.
        if self.physics.is_dynamic(player) && self.jump.try_jump(jump_pressed) {
            let impulse = Vec3::y() * self.player_config.jump_impulse;
            report.jumped = self.physics.add_impulse(player, impulse);
            log::debug!(
                "Jump (grounded: {}, mid-air jump {}/{})",
                self.jump.grounded(),
                self.jump.current_mid_air_jump(),
                self.jump.max_mid_air_jumps()
            );
        }
    }

    /// Tag of a record entity, or `None` when the record went stale this frame
    ///
    /// Reactions can despawn an entity or remove its body after the step, so
    /// both `InvalidEntity` and `ComponentNotFound` mean "skip this record".
    fn tag_of(world: &World, entity: Entity) -> Option<IdentityTag> {
        match world.get::<RigidBodyComponent>(entity) {
            Ok(body) => Some(body.tag),
            Err(err) => {
                log::debug!("Skipping stale collision with entity {}: {}", entity, err);
                None
            }
        }
    }

    fn run_collider_pass(&mut self, report: &mut FrameReport) {
        let touching_ground = self.collisions.iter().any(|record| {
            let tags = (
                Self::tag_of(&self.world, record.entity_a),
                Self::tag_of(&self.world, record.entity_b),
            );
            matches!(
                tags,
                (Some(IdentityTag::PLAYER), Some(IdentityTag::GROUND))
                    | (Some(IdentityTag::GROUND), Some(IdentityTag::PLAYER))
            )
        });
        self.jump.update_grounded(touching_ground);

        let mut ctx = ReactionContext::new(
            &mut self.world,
            &mut self.physics,
            &mut self.animator,
            &self.names,
            &self.sounds,
            &mut report.events,
        );
        for record in &self.collisions {
            // Reactions earlier in this frame may have despawned either side.
            let (Some(tag_a), Some(tag_b)) = (
                Self::tag_of(ctx.world, record.entity_a),
                Self::tag_of(ctx.world, record.entity_b),
            ) else {
                continue;
            };
            report.reactions_fired +=
                self.reactions
                    .dispatch((record.entity_a, tag_a), (record.entity_b, tag_b), &mut ctx);
        }
    }

    fn run_animations(&mut self, dt: f32) {
        for step in self.animator.advance(dt) {
            place_entity(&mut self.world, &mut self.physics, step.target, step.position);
        }
    }

    fn sync_transforms(&mut self) {
        let moving: Vec<Entity> = self
            .world
            .iter::<RigidBodyComponent>()
            .filter(|(_, body)| body.kind != BodyKind::Static && body.in_world())
            .map(|(entity, _)| entity)
            .collect();

        for entity in moving {
            let (Some(position), Some(rotation)) = (self.physics.translation(entity), self.physics.rotation(entity))
            else {
                continue;
            };
            if let Ok(transform) = self.world.get_mut::<TransformComponent>(entity) {
                transform.position = position;
                transform.set_orientation(&rotation);
            }
        }
    }

    fn follow_player(&mut self) {
        let (Some(player), Some(camera)) = (self.player, self.camera) else {
            return;
        };
        let Ok(target) = self.world.get::<TransformComponent>(player).map(|t| t.position) else {
            return;
        };

        let offset = self.player_config.camera_offset;
        if let Ok(transform) = self.world.get_mut::<TransformComponent>(camera) {
            transform.position = target + offset;
        }
        if let Ok(view) = self.world.get_mut::<CameraComponent>(camera) {
            view.target = target;
        }
    }

    /// Draw every visible entity that has a transform and a renderable
    pub fn render(&self, renderer: &mut dyn Renderer) {
        if !self.state.is_renderable() {
            return;
        }

        renderer.begin_frame(&self.view_projection());
        for (entity, renderable) in self.world.iter::<RenderableComponent>() {
            if !renderable.should_render() {
                log::trace!("Skipping entity {} without resolved resources", entity);
                continue;
            }
            if let Ok(transform) = self.world.get::<TransformComponent>(entity) {
                renderer.draw(renderable.material, renderable.mesh, &transform.to_matrix());
            }
        }
        renderer.end_frame();
    }

    /// Projection * view of the scene camera, identity without one
    pub fn view_projection(&self) -> Mat4 {
        self.camera
            .and_then(|camera| {
                let eye = self.world.get::<TransformComponent>(camera).ok()?.position;
                let view = self.world.get::<CameraComponent>(camera).ok()?;
                Some(view.view_projection(&eye))
            })
            .unwrap_or_else(Mat4::identity)
    }

    /// Level name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Lifecycle state
    pub fn state(&self) -> SceneState {
        self.state
    }

    /// Entity registry
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Mutable entity registry
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Physics world
    pub fn physics(&self) -> &PhysicsWorld {
        &self.physics
    }

    /// Registry and physics world together, for attaching or removing bodies
    pub fn parts_mut(&mut self) -> (&mut World, &mut PhysicsWorld) {
        (&mut self.world, &mut self.physics)
    }

    /// Reaction rules, for adding code-defined reactions
    pub fn reactions_mut(&mut self) -> &mut ReactionTable {
        &mut self.reactions
    }

    /// Scene animations
    pub fn animator(&self) -> &Animator {
        &self.animator
    }

    /// Live entity spawned under `name`
    pub fn entity(&self, name: &str) -> Result<Entity, SceneError> {
        self.names
            .get(name)
            .copied()
            .filter(|&entity| self.world.is_alive(entity))
            .ok_or_else(|| SceneError::UnknownEntity(name.to_string()))
    }

    /// Player entity, if the level has one
    pub fn player(&self) -> Option<Entity> {
        self.player
    }

    /// Camera entity, if the level has one
    pub fn camera(&self) -> Option<Entity> {
        self.camera
    }

    /// Grounded / mid-air jump state
    pub fn jump(&self) -> &JumpController {
        &self.jump
    }

    /// Collision records of the last frame
    pub fn collisions(&self) -> &[CollisionRecord] {
        &self.collisions
    }

    /// Sound registered under `name`
    pub fn sound(&self, name: &str) -> Option<&SoundCue> {
        self.sounds.get(name)
    }

    /// Sounds that start together with the level
    pub fn startup_sounds(&self) -> impl Iterator<Item = &SoundCue> + '_ {
        self.startup_sounds.iter().filter_map(|name| self.sounds.get(name))
    }
}
