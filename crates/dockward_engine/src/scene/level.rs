//! Level data
//!
//! One scene engine runs every level; what differs between levels is this
//! data: the entities to spawn, the animations they can play, the reaction
//! rules wiring collisions to gameplay and the sounds the level uses. Levels
//! load from `.ron` or `.toml` through [`Config`], or are built in code.

use super::animation::TimerMode;
use super::reactions::{ReactionSpec, Target};
use crate::audio::SoundOptions;
use crate::config::Config;
use crate::ecs::components::{CameraComponent, RigidBodyComponent, TransformComponent};
use crate::foundation::math::Vec3;
use crate::physics::{BodyKind, BodyShape, IdentityTag};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Level validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LevelError {
    /// Two entities (or animations, or sounds) share a name
    #[error("duplicate {kind} name '{name}'")]
    DuplicateName {
        /// What was duplicated
        kind: &'static str,
        /// The name
        name: String,
    },

    /// A reference names an entity the level does not define
    #[error("{context} refers to unknown entity '{name}'")]
    UnknownEntity {
        /// Where the reference is
        context: String,
        /// The missing name
        name: String,
    },

    /// A reaction starts an animation the level does not define
    #[error("reaction refers to unknown animation '{0}'")]
    UnknownAnimation(String),

    /// A reaction plays a sound the level does not define
    #[error("reaction refers to unknown sound '{0}'")]
    UnknownSound(String),

    /// An animation has a non-positive duration
    #[error("animation '{0}' must have a positive duration")]
    InvalidDuration(String),
}

/// Rigid body part of an entity definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BodyDefinition {
    /// Static, kinematic or dynamic
    pub kind: BodyKind,
    /// Collision shape
    pub shape: BodyShape,
    /// Mass, `<= 0` derives it from the shape
    pub mass: f32,
    /// Identity tag
    pub tag: IdentityTag,
    /// Whether gravity acts on the body
    pub has_gravity: bool,
    /// Overlap-only body
    pub sensor: bool,
    /// Keep the body upright
    pub lock_rotations: bool,
}

impl Default for BodyDefinition {
    fn default() -> Self {
        Self {
            kind: BodyKind::Dynamic,
            shape: BodyShape::default(),
            mass: 1.0,
            tag: IdentityTag::NONE,
            has_gravity: true,
            sensor: false,
            lock_rotations: false,
        }
    }
}

impl BodyDefinition {
    /// Detached component placed at `transform`
    pub fn to_component(&self, transform: &TransformComponent) -> RigidBodyComponent {
        let mut body = RigidBodyComponent::new(self.kind, self.shape)
            .with_mass(self.mass)
            .with_tag(self.tag)
            .with_gravity(self.has_gravity)
            .with_position(transform.position)
            .with_rotation_degrees(transform.rotation);
        body.sensor = self.sensor;
        body.lock_rotations = self.lock_rotations;
        body
    }
}

/// Mesh and material of an entity, by path and name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderableDefinition {
    /// Mesh file
    pub mesh: String,
    /// Material name
    pub material: String,
    /// Optional texture file bound to the material
    #[serde(default)]
    pub texture: Option<String>,
}

/// One entity to spawn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDefinition {
    /// Unique name, used by animations and reactions
    pub name: String,
    /// Initial placement
    #[serde(default)]
    pub transform: TransformComponent,
    /// Physics body
    #[serde(default)]
    pub body: Option<BodyDefinition>,
    /// Drawable
    #[serde(default)]
    pub renderable: Option<RenderableDefinition>,
    /// Camera
    #[serde(default)]
    pub camera: Option<CameraComponent>,
}

impl EntityDefinition {
    /// Bare entity at `position`
    pub fn new(name: impl Into<String>, position: Vec3) -> Self {
        Self {
            name: name.into(),
            transform: TransformComponent::from_position(position),
            body: None,
            renderable: None,
            camera: None,
        }
    }

    /// Builder pattern: Set transform
    pub fn with_transform(mut self, transform: TransformComponent) -> Self {
        self.transform = transform;
        self
    }

    /// Builder pattern: Set body
    pub fn with_body(mut self, body: BodyDefinition) -> Self {
        self.body = Some(body);
        self
    }

    /// Builder pattern: Set renderable
    pub fn with_renderable(mut self, mesh: impl Into<String>, material: impl Into<String>) -> Self {
        self.renderable = Some(RenderableDefinition {
            mesh: mesh.into(),
            material: material.into(),
            texture: None,
        });
        self
    }

    /// Builder pattern: Set camera
    pub fn with_camera(mut self, camera: CameraComponent) -> Self {
        self.camera = Some(camera);
        self
    }
}

/// Scripted motion of a named entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationDefinition {
    /// Unique name, used by reactions
    pub name: String,
    /// Entity to move
    pub target: String,
    /// Start point
    pub from: Vec3,
    /// End point
    pub to: Vec3,
    /// Seconds from start to end
    pub duration: f32,
    /// Clamped (one shot) or wrapping (loop)
    #[serde(default)]
    pub mode: TimerMode,
    /// Run from the first frame instead of waiting for a reaction
    #[serde(default)]
    pub autostart: bool,
}

/// Reactions fired when bodies with `first` and `second` tags overlap
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactionRule {
    /// Tag bound to `Target::First`
    pub first: IdentityTag,
    /// Tag bound to `Target::Second`
    pub second: IdentityTag,
    /// What happens, in order
    pub actions: Vec<ReactionSpec>,
}

/// A sound the level can play
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoundDefinition {
    /// Name used by reactions
    pub name: String,
    /// File, relative to the audio directory
    pub path: String,
    /// Playback options
    #[serde(default)]
    pub options: SoundOptions,
    /// Start with the level
    #[serde(default)]
    pub autoplay: bool,
}

/// Complete description of a level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelDefinition {
    /// Display name
    pub name: String,
    /// World gravity
    pub gravity: Vec3,
    /// Entities, spawned in order
    pub entities: Vec<EntityDefinition>,
    /// Animations
    pub animations: Vec<AnimationDefinition>,
    /// Collision reactions
    pub reactions: Vec<ReactionRule>,
    /// Sound catalog
    pub sounds: Vec<SoundDefinition>,
}

impl Default for LevelDefinition {
    fn default() -> Self {
        Self {
            name: "untitled".to_string(),
            gravity: Vec3::new(0.0, -9.81, 0.0),
            entities: Vec::new(),
            animations: Vec::new(),
            reactions: Vec::new(),
            sounds: Vec::new(),
        }
    }
}

impl Config for LevelDefinition {}

impl LevelDefinition {
    /// Empty level called `name`
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Check names and cross references
    pub fn validate(&self) -> Result<(), LevelError> {
        let entities = unique_names("entity", self.entities.iter().map(|e| e.name.as_str()))?;
        let animations = unique_names("animation", self.animations.iter().map(|a| a.name.as_str()))?;
        let sounds = unique_names("sound", self.sounds.iter().map(|s| s.name.as_str()))?;

        for animation in &self.animations {
            if !entities.contains(animation.target.as_str()) {
                return Err(LevelError::UnknownEntity {
                    context: format!("animation '{}'", animation.name),
                    name: animation.target.clone(),
                });
            }
            if animation.duration.is_nan() || animation.duration <= 0.0 {
                return Err(LevelError::InvalidDuration(animation.name.clone()));
            }
        }

        for rule in &self.reactions {
            for action in &rule.actions {
                match action {
                    ReactionSpec::StartAnimation(name) if !animations.contains(name.as_str()) => {
                        return Err(LevelError::UnknownAnimation(name.clone()));
                    }
                    ReactionSpec::PlaySound(name) if !sounds.contains(name.as_str()) => {
                        return Err(LevelError::UnknownSound(name.clone()));
                    }
                    ReactionSpec::SetGravity { target, .. }
                    | ReactionSpec::MoveTo { target, .. }
                    | ReactionSpec::Despawn(target) => {
                        if let Target::Named(name) = target {
                            if !entities.contains(name.as_str()) {
                                return Err(LevelError::UnknownEntity {
                                    context: format!("reaction ({}, {})", rule.first, rule.second),
                                    name: name.clone(),
                                });
                            }
                        }
                    }
                    _ => {}
                }
            }
        }
        Ok(())
    }
}

fn unique_names<'a>(
    kind: &'static str,
    names: impl Iterator<Item = &'a str>,
) -> Result<HashSet<&'a str>, LevelError> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(LevelError::DuplicateName {
                kind,
                name: name.to_string(),
            });
        }
    }
    Ok(seen)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAYER_LEVEL: &str = r#"(
        name: "pads",
        entities: [
            (
                name: "player",
                body: Some((
                    kind: Dynamic,
                    shape: Capsule(half_height: 0.5, radius: 0.4),
                    mass: 70.0,
                    tag: 1,
                    lock_rotations: true,
                )),
            ),
            (
                name: "pad",
                body: Some((kind: Static, shape: Sphere(radius: 1.0), tag: 5, sensor: true)),
                renderable: Some((mesh: "pad.obj", material: "glow")),
            ),
        ],
        reactions: [
            (first: 1, second: 5, actions: [SetGravity(target: First, enabled: false), PlaySound("hum")]),
        ],
        sounds: [
            (name: "hum", path: "hum.wav", options: (looping: true)),
        ],
    )"#;

    fn door_level() -> LevelDefinition {
        let mut level = LevelDefinition::new("door");
        level.entities.push(
            EntityDefinition::new("door", Vec3::new(5.0, 1.0, 0.0)).with_body(BodyDefinition {
                kind: BodyKind::Kinematic,
                shape: BodyShape::Cuboid {
                    half_extents: Vec3::new(0.2, 1.0, 1.0),
                },
                tag: IdentityTag(6),
                ..Default::default()
            }),
        );
        level.animations.push(AnimationDefinition {
            name: "door_open".into(),
            target: "door".into(),
            from: Vec3::new(5.0, 1.0, 0.0),
            to: Vec3::new(5.0, 3.0, 0.0),
            duration: 1.5,
            mode: TimerMode::Clamped,
            autostart: false,
        });
        level.reactions.push(ReactionRule {
            first: IdentityTag::PLAYER,
            second: IdentityTag(6),
            actions: vec![
                ReactionSpec::StartAnimation("door_open".into()),
                ReactionSpec::MoveTo {
                    target: Target::First,
                    position: Vec3::new(0.0, 1.0, 0.0),
                },
            ],
        });
        level
    }

    #[test]
    fn test_parse_handwritten_ron_level() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pads.ron");
        std::fs::write(&path, PLAYER_LEVEL).unwrap();

        let level = LevelDefinition::load_from_file(&path).unwrap();
        assert_eq!(level.name, "pads");
        assert_eq!(level.gravity, Vec3::new(0.0, -9.81, 0.0));
        assert_eq!(level.entities.len(), 2);

        let player = level.entities[0].body.as_ref().unwrap();
        assert_eq!(player.tag, IdentityTag::PLAYER);
        assert!(player.has_gravity);
        assert!(player.lock_rotations);
        assert_eq!(level.entities[0].transform, TransformComponent::default());

        let pad = &level.entities[1];
        assert!(pad.body.as_ref().unwrap().sensor);
        assert_eq!(pad.renderable.as_ref().unwrap().texture, None);
        assert!(level.sounds[0].options.looping);
        assert!(!level.sounds[0].autoplay);
        level.validate().unwrap();
    }

    #[test]
    fn test_level_files_load_back() {
        let dir = tempfile::tempdir().unwrap();
        let level = door_level();
        level.validate().unwrap();

        for file in ["door.ron", "door.toml"] {
            let path = dir.path().join(file);
            level.save_to_file(&path).unwrap();
            assert_eq!(LevelDefinition::load_from_file(&path).unwrap(), level, "{}", file);
        }
    }

    #[test]
    fn test_validate_rejects_dangling_references() {
        let mut level = LevelDefinition::new("broken");
        level.entities.push(EntityDefinition::new("door", Vec3::zeros()));
        level.animations.push(AnimationDefinition {
            name: "lift".into(),
            target: "platform".into(),
            from: Vec3::zeros(),
            to: Vec3::y(),
            duration: 1.0,
            mode: TimerMode::Wrapping,
            autostart: true,
        });
        assert!(matches!(level.validate(), Err(LevelError::UnknownEntity { .. })));

        level.animations[0].target = "door".into();
        level.reactions.push(ReactionRule {
            first: IdentityTag::PLAYER,
            second: IdentityTag(6),
            actions: vec![ReactionSpec::StartAnimation("open".into())],
        });
        assert_eq!(level.validate(), Err(LevelError::UnknownAnimation("open".into())));

        level.reactions.clear();
        level.entities.push(EntityDefinition::new("door", Vec3::x()));
        assert!(matches!(level.validate(), Err(LevelError::DuplicateName { kind: "entity", .. })));
    }

    #[test]
    fn test_body_definition_uses_transform() {
        let transform = TransformComponent::from_position(Vec3::new(1.0, 2.0, 3.0));
        let definition = BodyDefinition {
            tag: IdentityTag::GROUND,
            kind: BodyKind::Static,
            ..Default::default()
        };
        let body = definition.to_component(&transform);
        assert_eq!(body.position(), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(body.tag, IdentityTag::GROUND);
        assert!(!body.in_world());
    }
}
