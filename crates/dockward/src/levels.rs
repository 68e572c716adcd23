//! Built-in levels
//!
//! Used when `dockward.toml` names no level files. Also the reference for
//! writing level files: `save_builtin_levels` dumps them as RON.

use dockward_engine::audio::SoundOptions;
use dockward_engine::config::{Config, ConfigError};
use dockward_engine::ecs::components::CameraComponent;
use dockward_engine::foundation::math::Vec3;
use dockward_engine::physics::{BodyKind, BodyShape, IdentityTag};
use dockward_engine::scene::{
    AnimationDefinition, BodyDefinition, EntityDefinition, LevelDefinition, ReactionRule, ReactionSpec,
    SoundDefinition, Target, TimerMode,
};
use std::path::{Path, PathBuf};

/// Identity tags used by the built-in levels
pub mod tags {
    use dockward_engine::physics::IdentityTag;

    /// The player
    pub const PLAYER: IdentityTag = IdentityTag::PLAYER;
    /// Anything the player can stand on
    pub const GROUND: IdentityTag = IdentityTag::GROUND;
    /// Pressure plate
    pub const PLATE: IdentityTag = IdentityTag(3);
    /// Pushable crate
    pub const CRATE: IdentityTag = IdentityTag(4);
    /// Collectible
    pub const COIN: IdentityTag = IdentityTag(5);
    /// Door
    pub const DOOR: IdentityTag = IdentityTag(6);
    /// Level exit
    pub const GOAL: IdentityTag = IdentityTag(7);
}

fn cuboid(x: f32, y: f32, z: f32) -> BodyShape {
    BodyShape::Cuboid {
        half_extents: Vec3::new(x, y, z),
    }
}

fn fixed(shape: BodyShape, tag: IdentityTag) -> BodyDefinition {
    BodyDefinition {
        kind: BodyKind::Static,
        shape,
        tag,
        ..Default::default()
    }
}

fn trigger(shape: BodyShape, tag: IdentityTag) -> BodyDefinition {
    BodyDefinition {
        sensor: true,
        ..fixed(shape, tag)
    }
}

fn sound(name: &str, path: &str, options: SoundOptions, autoplay: bool) -> SoundDefinition {
    SoundDefinition {
        name: name.to_string(),
        path: path.to_string(),
        options,
        autoplay,
    }
}

fn rule(first: IdentityTag, second: IdentityTag, actions: Vec<ReactionSpec>) -> ReactionRule {
    ReactionRule { first, second, actions }
}

/// Player, floor and follow camera shared by every level
fn base_level(name: &str) -> LevelDefinition {
    let mut level = LevelDefinition::new(name);
    level.entities.push(
        EntityDefinition::new("floor", Vec3::new(0.0, -0.5, 0.0))
            .with_body(fixed(cuboid(20.0, 0.5, 20.0), tags::GROUND))
            .with_renderable("meshes/floor.obj", "concrete"),
    );
    level.entities.push(
        EntityDefinition::new("player", Vec3::new(0.0, 1.0, 0.0))
            .with_body(BodyDefinition {
                shape: BodyShape::Sphere { radius: 0.5 },
                tag: tags::PLAYER,
                lock_rotations: true,
                ..Default::default()
            })
            .with_renderable("meshes/player.obj", "player"),
    );
    level
        .entities
        .push(EntityDefinition::new("camera", Vec3::new(0.0, 5.0, 10.0)).with_camera(CameraComponent::default()));
    level
}

/// First level: a pressure plate opens the door to the exit
pub fn dock_level() -> LevelDefinition {
    let mut level = base_level("dock");

    level.entities.push(
        EntityDefinition::new("plate", Vec3::new(4.0, 0.05, 0.0))
            .with_body(trigger(cuboid(1.0, 0.1, 1.0), tags::PLATE))
            .with_renderable("meshes/plate.obj", "metal"),
    );
    level.entities.push(
        EntityDefinition::new("door", Vec3::new(8.0, 2.0, 0.0))
            .with_body(BodyDefinition {
                kind: BodyKind::Kinematic,
                shape: cuboid(0.25, 2.0, 2.0),
                tag: tags::DOOR,
                ..Default::default()
            })
            .with_renderable("meshes/door.obj", "metal"),
    );
    level.entities.push(
        EntityDefinition::new("crate", Vec3::new(-4.0, 0.5, 0.0))
            .with_body(BodyDefinition {
                shape: cuboid(0.5, 0.5, 0.5),
                mass: 2.0,
                tag: tags::CRATE,
                ..Default::default()
            })
            .with_renderable("meshes/crate.obj", "wood"),
    );
    level.entities.push(
        EntityDefinition::new("coin", Vec3::new(2.0, 1.0, 3.0))
            .with_body(trigger(BodyShape::Sphere { radius: 0.4 }, tags::COIN))
            .with_renderable("meshes/coin.obj", "gold"),
    );
    level.entities.push(
        EntityDefinition::new("exit", Vec3::new(12.0, 1.0, 0.0)).with_body(trigger(cuboid(1.0, 1.0, 2.0), tags::GOAL)),
    );

    level.animations.push(AnimationDefinition {
        name: "door_open".to_string(),
        target: "door".to_string(),
        from: Vec3::new(8.0, 2.0, 0.0),
        to: Vec3::new(8.0, 6.0, 0.0),
        duration: 1.5,
        mode: TimerMode::Clamped,
        autostart: false,
    });

    level.sounds.push(sound("theme", "dock_theme.ogg", SoundOptions::music(), true));
    level.sounds.push(sound("door", "door.wav", SoundOptions::effect(), false));
    level.sounds.push(sound("coin", "coin.wav", SoundOptions::effect(), false));

    level.reactions.push(rule(
        tags::PLAYER,
        tags::PLATE,
        vec![
            ReactionSpec::StartAnimation("door_open".to_string()),
            ReactionSpec::PlaySound("door".to_string()),
        ],
    ));
    level.reactions.push(rule(
        tags::COIN,
        tags::PLAYER,
        vec![
            ReactionSpec::Despawn(Target::First),
            ReactionSpec::PlaySound("coin".to_string()),
            ReactionSpec::Emit("coin_collected".to_string()),
        ],
    ));
    level.reactions.push(rule(
        tags::PLAYER,
        tags::CRATE,
        vec![ReactionSpec::SetGravity {
            target: Target::Second,
            enabled: false,
        }],
    ));
    level
        .reactions
        .push(rule(tags::PLAYER, tags::GOAL, vec![ReactionSpec::EndLevel]));
    level
}

/// Second level: ride the lift up to the ledge holding the exit
pub fn lift_level() -> LevelDefinition {
    let mut level = base_level("lift");

    level.entities.push(
        EntityDefinition::new("lift", Vec3::new(4.0, 0.25, 0.0))
            .with_body(BodyDefinition {
                kind: BodyKind::Kinematic,
                shape: cuboid(1.5, 0.25, 1.5),
                tag: tags::GROUND,
                ..Default::default()
            })
            .with_renderable("meshes/lift.obj", "metal"),
    );
    level.entities.push(
        EntityDefinition::new("ledge", Vec3::new(9.0, 5.75, 0.0))
            .with_body(fixed(cuboid(3.0, 0.25, 3.0), tags::GROUND))
            .with_renderable("meshes/ledge.obj", "concrete"),
    );
    level.entities.push(
        EntityDefinition::new("exit", Vec3::new(10.0, 7.0, 0.0)).with_body(trigger(cuboid(1.0, 1.0, 1.0), tags::GOAL)),
    );

    level.animations.push(AnimationDefinition {
        name: "lift_cycle".to_string(),
        target: "lift".to_string(),
        from: Vec3::new(4.0, 0.25, 0.0),
        to: Vec3::new(4.0, 5.75, 0.0),
        duration: 4.0,
        mode: TimerMode::Wrapping,
        autostart: true,
    });

    level.sounds.push(sound("theme", "lift_theme.ogg", SoundOptions::music(), true));
    level.sounds.push(sound("win", "win.wav", SoundOptions::effect(), false));

    level.reactions.push(rule(
        tags::PLAYER,
        tags::GOAL,
        vec![ReactionSpec::PlaySound("win".to_string()), ReactionSpec::EndLevel],
    ));
    level
}

/// Every built-in level, in play order
pub fn builtin_levels() -> Vec<LevelDefinition> {
    vec![dock_level(), lift_level()]
}

/// Level sequence named by `paths`, or the built-in one when empty
pub fn load_levels(paths: &[String]) -> Result<Vec<LevelDefinition>, ConfigError> {
    if paths.is_empty() {
        return Ok(builtin_levels());
    }
    paths
        .iter()
        .map(|path| {
            log::info!("Loading level {}", path);
            LevelDefinition::load_from_file(path)
        })
        .collect()
}

/// Write the built-in levels to `dir` as `<name>.ron`
pub fn save_builtin_levels(dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    builtin_levels()
        .iter()
        .map(|level| {
            let path = dir.join(format!("{}.ron", level.name));
            level.save_to_file(&path)?;
            Ok(path)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use dockward_engine::core::EngineConfig;
    use dockward_engine::ecs::components::{RigidBodyComponent, TransformComponent};
    use dockward_engine::input::KeyboardState;
    use dockward_engine::render::ResourceCache;
    use dockward_engine::scene::{Scene, SceneEvent};

    const DT: f32 = 1.0 / 60.0;

    fn active(level: &LevelDefinition) -> Scene {
        let mut scene =
            Scene::from_level(&EngineConfig::default(), level, &mut ResourceCache::new("missing")).unwrap();
        scene.activate().unwrap();
        scene
    }

    #[test]
    fn test_builtin_levels_validate() {
        for level in builtin_levels() {
            assert!(level.validate().is_ok(), "level {} is invalid", level.name);
        }
    }

    #[test]
    fn test_builtin_levels_spawn() {
        for level in builtin_levels() {
            let scene = active(&level);
            assert!(scene.player().is_some());
            assert!(scene.camera().is_some());
            assert_eq!(scene.world().entity_count(), level.entities.len());
            assert_eq!(scene.startup_sounds().count(), 1);
        }
    }

    #[test]
    fn test_player_lands_on_floor() {
        let mut scene = active(&dock_level());
        let keys = KeyboardState::new();

        let landed = (0..120).any(|_| scene.update(DT, &keys).unwrap().grounded);

        assert!(landed);
        assert_eq!(scene.jump().current_mid_air_jump(), 0);
    }

    #[test]
    fn test_coin_is_collected() {
        let mut scene = active(&dock_level());
        let player = scene.player().unwrap();
        {
            let (world, physics) = scene.parts_mut();
            let body = world.get_mut::<RigidBodyComponent>(player).unwrap();
            body.set_position(physics, Vec3::new(2.0, 1.0, 3.0)).unwrap();
        }

        let report = scene.update(DT, &KeyboardState::new()).unwrap();

        assert!(scene.entity("coin").is_err());
        assert!(report
            .events
            .contains(&SceneEvent::Custom("coin_collected".to_string())));
        assert!(report
            .events
            .iter()
            .any(|event| matches!(event, SceneEvent::PlaySound(cue) if cue.name == "coin")));
    }

    #[test]
    fn test_lift_cycles() {
        let mut scene = active(&lift_level());
        let lift = scene.entity("lift").unwrap();
        let keys = KeyboardState::new();

        for _ in 0..60 {
            scene.update(DT, &keys).unwrap();
        }

        let y = scene.world().get::<TransformComponent>(lift).unwrap().position.y;
        assert!(y > 0.25 && y < 5.75);
    }

    #[test]
    fn test_levels_survive_a_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let paths = save_builtin_levels(dir.path()).unwrap();
        let names: Vec<String> = paths.iter().map(|p| p.display().to_string()).collect();

        let loaded = load_levels(&names).unwrap();

        assert_eq!(loaded, builtin_levels());
    }

    #[test]
    fn test_missing_level_file_is_an_error() {
        assert!(load_levels(&["nowhere/level.ron".to_string()]).is_err());
    }
}
