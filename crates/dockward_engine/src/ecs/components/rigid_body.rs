//! Rigid body component
//!
//! The only component with lifecycle hooks: attaching it registers a rapier
//! body with the scene's physics world, detaching it removes the body and its
//! collider again. `in_world` tracks that registration so it happens exactly
//! once in each direction.

use crate::ecs::{Component, Entity};
use crate::foundation::math::{utils, Vec3};
use crate::physics::{BodyKind, BodyShape, IdentityTag, PhysicsError, PhysicsWorld};
use rapier3d::prelude::RigidBodyHandle;

/// Physics body of an entity
///
/// Configuration fields are read when the component is attached. Changing
/// them afterwards has no effect on the simulation; use the methods taking a
/// [`PhysicsWorld`] for writes that must reach the running body.
#[derive(Debug)]
pub struct RigidBodyComponent {
    /// Static, kinematic or dynamic
    pub kind: BodyKind,
    /// Collision shape
    pub shape: BodyShape,
    /// Mass in kilograms, `<= 0` derives it from the shape
    pub mass: f32,
    /// Gameplay classification used by collision dispatch
    pub tag: IdentityTag,
    /// Report overlaps without a contact response
    pub sensor: bool,
    /// Keep the body upright
    pub lock_rotations: bool,

    has_gravity: bool,
    position: Vec3,
    rotation_degrees: Vec3,

    entity: Option<Entity>,
    handle: Option<RigidBodyHandle>,
    in_world: bool,
}

impl Clone for RigidBodyComponent {
    /// Clones are detached: the copy has no body until it is attached itself
    fn clone(&self) -> Self {
        Self {
            entity: None,
            handle: None,
            in_world: false,
            ..*self
        }
    }
}

impl Default for RigidBodyComponent {
    fn default() -> Self {
        Self::new(BodyKind::Dynamic, BodyShape::default())
    }
}

impl RigidBodyComponent {
    /// Create a detached body description
    pub fn new(kind: BodyKind, shape: BodyShape) -> Self {
        Self {
            kind,
            shape,
            mass: 1.0,
            tag: IdentityTag::NONE,
            sensor: false,
            lock_rotations: false,
            has_gravity: true,
            position: Vec3::zeros(),
            rotation_degrees: Vec3::zeros(),
            entity: None,
            handle: None,
            in_world: false,
        }
    }

    /// Immovable body
    pub fn fixed(shape: BodyShape) -> Self {
        Self::new(BodyKind::Static, shape).with_mass(0.0)
    }

    /// Script-driven body
    pub fn kinematic(shape: BodyShape) -> Self {
        Self::new(BodyKind::Kinematic, shape).with_mass(0.0)
    }

    /// Simulated body
    pub fn dynamic(shape: BodyShape, mass: f32) -> Self {
        Self::new(BodyKind::Dynamic, shape).with_mass(mass)
    }

    /// Builder pattern: Set mass
    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self
    }

    /// Builder pattern: Set identity tag
    pub fn with_tag(mut self, tag: impl Into<IdentityTag>) -> Self {
        self.tag = tag.into();
        self
    }

    /// Builder pattern: Set initial position
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Builder pattern: Set initial rotation in degrees
    pub fn with_rotation_degrees(mut self, rotation: Vec3) -> Self {
        self.rotation_degrees = rotation;
        self
    }

    /// Builder pattern: Enable or disable gravity
    pub fn with_gravity(mut self, has_gravity: bool) -> Self {
        self.has_gravity = has_gravity;
        self
    }

    /// Builder pattern: Overlap-only body
    pub fn as_sensor(mut self) -> Self {
        self.sensor = true;
        self
    }

    /// Builder pattern: Lock rotations
    pub fn with_locked_rotations(mut self) -> Self {
        self.lock_rotations = true;
        self
    }

    /// Whether the body is currently registered with a physics world
    pub fn in_world(&self) -> bool {
        self.in_world
    }

    /// Rapier handle while registered
    pub fn handle(&self) -> Option<RigidBodyHandle> {
        self.handle
    }

    /// Owning entity while registered
    pub fn entity(&self) -> Option<Entity> {
        self.entity
    }

    /// Whether gravity acts on the body
    pub fn has_gravity(&self) -> bool {
        self.has_gravity
    }

    /// Last position written through this component (or the initial one)
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Move the body, propagating into the simulation when registered
    pub fn set_position(&mut self, physics: &mut PhysicsWorld, position: Vec3) -> Result<(), PhysicsError> {
        if let Some(entity) = self.registered_entity() {
            physics.set_translation(entity, position)?;
        }
        self.position = position;
        Ok(())
    }

    /// Toggle gravity, propagating into the simulation when registered
    pub fn set_gravity_enabled(&mut self, physics: &mut PhysicsWorld, enabled: bool) -> Result<(), PhysicsError> {
        if let Some(entity) = self.registered_entity() {
            physics.set_gravity_scale(entity, gravity_scale(enabled))?;
        }
        self.has_gravity = enabled;
        Ok(())
    }

    fn registered_entity(&self) -> Option<Entity> {
        if self.in_world {
            self.entity
        } else {
            None
        }
    }
}

fn gravity_scale(enabled: bool) -> f32 {
    if enabled {
        1.0
    } else {
        0.0
    }
}

impl Component for RigidBodyComponent {
    fn on_attach(&mut self, entity: Entity, physics: &mut PhysicsWorld) -> Result<(), PhysicsError> {
        debug_assert!(!self.in_world, "rigid body attached while already in a world");
        if self.in_world {
            return Err(PhysicsError::AlreadyRegistered(entity));
        }

        let mut builder = self
            .kind
            .builder()
            .translation(self.position)
            .rotation(utils::axis_angle_from_euler_degrees(&self.rotation_degrees))
            .gravity_scale(gravity_scale(self.has_gravity));
        if self.lock_rotations {
            builder = builder.lock_rotations();
        }
        if self.tag == IdentityTag::PLAYER {
            // Grounded detection needs fresh contacts every step.
            builder = builder.can_sleep(false);
        }

        let mut collider = self.shape.collider_builder().sensor(self.sensor);
        if self.mass > 0.0 {
            collider = collider.mass(self.mass);
        }

        let handle = physics.register_body(entity, builder.build(), collider.build())?;
        self.entity = Some(entity);
        self.handle = Some(handle);
        self.in_world = true;
        Ok(())
    }

    fn on_detach(&mut self, physics: &mut PhysicsWorld) {
        if let Some(handle) = self.handle.take() {
            if let Err(err) = physics.deregister_body(handle) {
                log::error!("Failed to remove rigid body: {}", err);
            }
        }
        self.in_world = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::World;
    use approx::assert_relative_eq;

    fn crate_box() -> RigidBodyComponent {
        RigidBodyComponent::dynamic(BodyShape::default(), 2.0)
            .with_tag(7)
            .with_position(Vec3::new(0.0, 3.0, 0.0))
    }

    #[test]
    fn test_attach_registers_and_destroy_releases() {
        let mut physics = PhysicsWorld::default();
        let mut world = World::new();
        let entity = world.create_entity();
        let before = physics.body_count();

        world.attach(entity, crate_box(), &mut physics).unwrap();
        let body = world.get::<RigidBodyComponent>(entity).unwrap();
        assert!(body.in_world());
        assert_eq!(body.entity(), Some(entity));
        assert_eq!(physics.entity_for_body(body.handle().unwrap()), Some(entity));
        assert_eq!(physics.body_count(), before + 1);

        world.destroy_entity(entity, &mut physics).unwrap();
        assert_eq!(physics.body_count(), before);
        assert!(!physics.is_registered(entity));
    }

    #[test]
    fn test_replace_and_remove_keep_one_body() {
        let mut physics = PhysicsWorld::default();
        let mut world = World::new();
        let entity = world.create_entity();

        world.attach(entity, crate_box(), &mut physics).unwrap();
        world.attach(entity, crate_box().with_mass(5.0), &mut physics).unwrap();
        assert_eq!(physics.body_count(), 1);

        let removed = world.remove::<RigidBodyComponent>(entity, &mut physics).unwrap();
        assert!(!removed.in_world());
        assert_eq!(physics.body_count(), 0);
    }

    #[test]
    fn test_clone_is_detached() {
        let mut physics = PhysicsWorld::default();
        let mut world = World::new();
        let a = world.create_entity();
        let b = world.create_entity();

        world.attach(a, crate_box(), &mut physics).unwrap();
        let copy = world.get::<RigidBodyComponent>(a).unwrap().clone();
        assert!(!copy.in_world());
        world.attach(b, copy, &mut physics).unwrap();
        assert_eq!(physics.body_count(), 2);
    }

    #[test]
    fn test_writes_reach_the_simulation() {
        let mut physics = PhysicsWorld::new(Vec3::new(0.0, -9.81, 0.0), 1.0 / 60.0);
        let mut world = World::new();
        let entity = world.create_entity();
        world.attach(entity, crate_box(), &mut physics).unwrap();

        let body = world.get_mut::<RigidBodyComponent>(entity).unwrap();
        body.set_position(&mut physics, Vec3::new(4.0, 8.0, 0.0)).unwrap();
        body.set_gravity_enabled(&mut physics, false).unwrap();
        assert!(!body.has_gravity());

        physics.step(0.5);
        assert_relative_eq!(physics.translation(entity).unwrap(), Vec3::new(4.0, 8.0, 0.0), epsilon = 1e-4);
    }
}
