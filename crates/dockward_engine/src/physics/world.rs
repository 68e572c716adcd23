//! Rapier-backed physics world
//!
//! Owns every rapier set plus the entity ↔ body maps. Bodies enter and leave
//! only through [`PhysicsWorld::register_body`] and
//! [`PhysicsWorld::deregister_body`], which the rigid body component calls from
//! its lifecycle hooks.

use super::{CollisionRecord, PhysicsError};
use crate::core::PhysicsConfig;
use crate::ecs::Entity;
use crate::foundation::math::{Quat, Vec3};
use rapier3d::prelude::*;
use std::collections::{BTreeSet, HashMap};

/// Physics world shared by every body of one scene
pub struct PhysicsWorld {
    gravity: Vec3,
    max_substep: f32,
    integration_parameters: IntegrationParameters,
    pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: BroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,

    entity_to_body: HashMap<Entity, RigidBodyHandle>,
    body_to_entity: HashMap<RigidBodyHandle, Entity>,

    /// Overlaps seen since the last harvest
    pending: BTreeSet<CollisionRecord>,
    steps_taken: u64,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::from_config(&PhysicsConfig::default())
    }
}

impl PhysicsWorld {
    /// Create a world with the given gravity and maximum integration sub-step
    pub fn new(gravity: Vec3, max_substep: f32) -> Self {
        Self {
            gravity,
            max_substep,
            integration_parameters: IntegrationParameters::default(),
            pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: BroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            entity_to_body: HashMap::new(),
            body_to_entity: HashMap::new(),
            pending: BTreeSet::new(),
            steps_taken: 0,
        }
    }

    /// Create a world from the physics section of the engine configuration
    pub fn from_config(config: &PhysicsConfig) -> Self {
        Self::new(config.gravity, config.max_substep)
    }

    /// Set the world gravity
    pub fn set_gravity(&mut self, gravity: Vec3) {
        self.gravity = gravity;
    }

    /// Current world gravity
    pub fn gravity(&self) -> Vec3 {
        self.gravity
    }

    /// Number of integrator invocations so far
    pub fn steps_taken(&self) -> u64 {
        self.steps_taken
    }

    /// Advance the simulation by `dt` seconds
    ///
    /// `dt <= 0` (or NaN/infinite) is a no-op. Larger steps are split into
    /// equal sub-steps of at most `max_substep`; overlaps from every sub-step
    /// are kept until [`Self::take_collision_records`]. Accumulated forces
    /// are cleared afterwards.
    pub fn step(&mut self, dt: f32) {
        if !dt.is_finite() || dt <= 0.0 {
            log::trace!("Skipping physics step with dt = {}", dt);
            return;
        }

        let substeps = if self.max_substep > 0.0 {
            (dt / self.max_substep).ceil().max(1.0) as u32
        } else {
            1
        };
        self.integration_parameters.dt = dt / substeps as f32;

        for _ in 0..substeps {
            self.pipeline.step(
                &self.gravity,
                &self.integration_parameters,
                &mut self.island_manager,
                &mut self.broad_phase,
                &mut self.narrow_phase,
                &mut self.bodies,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                &mut self.ccd_solver,
                None,
                &(),
                &(),
            );
            self.steps_taken += 1;
            self.collect_overlaps();
        }

        for (_, body) in self.bodies.iter_mut() {
            body.reset_forces(false);
        }
    }

    /// Drain the collision records gathered since the previous call
    ///
    /// Records are normalized, de-duplicated and sorted.
    pub fn take_collision_records(&mut self) -> Vec<CollisionRecord> {
        std::mem::take(&mut self.pending).into_iter().collect()
    }

    fn collect_overlaps(&mut self) {
        let mut found = Vec::new();
        for pair in self.narrow_phase.contact_pairs() {
            if pair.has_any_active_contact {
                found.push((pair.collider1, pair.collider2));
            }
        }
        for (collider1, collider2, intersecting) in self.narrow_phase.intersection_pairs() {
            if intersecting {
                found.push((collider1, collider2));
            }
        }

        for (collider1, collider2) in found {
            match (self.entity_for_collider(collider1), self.entity_for_collider(collider2)) {
                (Some(a), Some(b)) if a != b => {
                    self.pending.insert(CollisionRecord::new(a, b));
                }
                _ => {}
            }
        }
    }

    fn entity_for_collider(&self, handle: ColliderHandle) -> Option<Entity> {
        let parent = self.colliders.get(handle)?.parent()?;
        self.body_to_entity.get(&parent).copied()
    }

    /// Insert a body with its collider and bind it to `entity`
    pub fn register_body(
        &mut self,
        entity: Entity,
        mut body: RigidBody,
        collider: Collider,
    ) -> Result<RigidBodyHandle, PhysicsError> {
        if self.entity_to_body.contains_key(&entity) {
            return Err(PhysicsError::AlreadyRegistered(entity));
        }

        body.user_data = u128::from(entity.to_bits());
        let handle = self.bodies.insert(body);
        self.colliders
            .insert_with_parent(collider, handle, &mut self.bodies);
        self.entity_to_body.insert(entity, handle);
        self.body_to_entity.insert(handle, entity);

        log::debug!("Registered body {:?} for entity {}", handle, entity);
        Ok(handle)
    }

    /// Remove a body and its colliders, returning the entity it belonged to
    pub fn deregister_body(&mut self, handle: RigidBodyHandle) -> Result<Entity, PhysicsError> {
        let entity = self
            .body_to_entity
            .remove(&handle)
            .ok_or(PhysicsError::UnknownBody(handle))?;
        self.entity_to_body.remove(&entity);

        self.bodies.remove(
            handle,
            &mut self.island_manager,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
        self.pending.retain(|record| !record.involves(entity));

        log::debug!("Deregistered body {:?} of entity {}", handle, entity);
        Ok(entity)
    }

    /// Number of bodies currently in the simulation
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Whether `entity` owns a body in this world
    pub fn is_registered(&self, entity: Entity) -> bool {
        self.entity_to_body.contains_key(&entity)
    }

    /// Whether `entity` owns a dynamic body, the only kind forces act on
    pub fn is_dynamic(&self, entity: Entity) -> bool {
        self.body(entity).is_some_and(RigidBody::is_dynamic)
    }

    /// Entity owning the given body
    pub fn entity_for_body(&self, handle: RigidBodyHandle) -> Option<Entity> {
        self.body_to_entity.get(&handle).copied()
    }

    /// Body owned by the given entity
    pub fn body_for_entity(&self, entity: Entity) -> Option<RigidBodyHandle> {
        self.entity_to_body.get(&entity).copied()
    }

    fn body(&self, entity: Entity) -> Option<&RigidBody> {
        self.bodies.get(self.body_for_entity(entity)?)
    }

    fn body_mut(&mut self, entity: Entity) -> Result<&mut RigidBody, PhysicsError> {
        let handle = self
            .body_for_entity(entity)
            .ok_or(PhysicsError::NotRegistered(entity))?;
        self.bodies
            .get_mut(handle)
            .ok_or(PhysicsError::UnknownBody(handle))
    }

    /// Accumulate a force on a dynamic body for the next step
    ///
    /// Returns `false` (and does nothing) for static, kinematic or unknown bodies.
    pub fn add_force(&mut self, entity: Entity, force: Vec3) -> bool {
        match self.body_mut(entity) {
            Ok(body) if body.is_dynamic() => {
                body.add_force(force, true);
                true
            }
            _ => {
                log::trace!("Ignoring force on non-dynamic entity {}", entity);
                false
            }
        }
    }

    /// Apply an instantaneous impulse to a dynamic body
    ///
    /// Returns `false` (and does nothing) for static, kinematic or unknown bodies.
    pub fn add_impulse(&mut self, entity: Entity, impulse: Vec3) -> bool {
        match self.body_mut(entity) {
            Ok(body) if body.is_dynamic() => {
                body.apply_impulse(impulse, true);
                true
            }
            _ => {
                log::trace!("Ignoring impulse on non-dynamic entity {}", entity);
                false
            }
        }
    }

    /// World-space position of an entity's body
    pub fn translation(&self, entity: Entity) -> Option<Vec3> {
        self.body(entity).map(|body| *body.translation())
    }

    /// World-space orientation of an entity's body
    pub fn rotation(&self, entity: Entity) -> Option<Quat> {
        self.body(entity).map(|body| *body.rotation())
    }

    /// Linear velocity of an entity's body
    pub fn linear_velocity(&self, entity: Entity) -> Option<Vec3> {
        self.body(entity).map(|body| *body.linvel())
    }

    /// Teleport an entity's body
    pub fn set_translation(&mut self, entity: Entity, translation: Vec3) -> Result<(), PhysicsError> {
        self.body_mut(entity)?.set_translation(translation, true);
        Ok(())
    }

    /// Scale how strongly world gravity acts on an entity's body
    pub fn set_gravity_scale(&mut self, entity: Entity, scale: f32) -> Result<(), PhysicsError> {
        self.body_mut(entity)?.set_gravity_scale(scale, true);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::BodyShape;
    use approx::assert_relative_eq;
    use slotmap::SlotMap;

    fn entities(n: usize) -> Vec<Entity> {
        let mut keys: SlotMap<Entity, ()> = SlotMap::with_key();
        (0..n).map(|_| keys.insert(())).collect()
    }

    fn ball_at(world: &mut PhysicsWorld, entity: Entity, body: RigidBodyBuilder, at: Vec3) -> RigidBodyHandle {
        let collider = BodyShape::Sphere { radius: 0.5 }.collider_builder().build();
        world
            .register_body(entity, body.translation(at).build(), collider)
            .unwrap()
    }

    #[test]
    fn test_non_positive_dt_is_noop() {
        let e = entities(1);
        let mut world = PhysicsWorld::default();
        ball_at(&mut world, e[0], RigidBodyBuilder::dynamic(), Vec3::new(0.0, 5.0, 0.0));

        world.step(0.0);
        world.step(-1.0);
        world.step(f32::NAN);

        assert_eq!(world.steps_taken(), 0);
        assert_relative_eq!(world.translation(e[0]).unwrap(), Vec3::new(0.0, 5.0, 0.0));
    }

    #[test]
    fn test_large_dt_is_substepped() {
        let e = entities(1);
        let mut world = PhysicsWorld::new(Vec3::new(0.0, -9.81, 0.0), 0.125);
        ball_at(&mut world, e[0], RigidBodyBuilder::dynamic(), Vec3::new(0.0, 5.0, 0.0));

        world.step(0.5);
        assert_eq!(world.steps_taken(), 4);
        assert!(world.translation(e[0]).unwrap().y < 5.0);
    }

    #[test]
    fn test_forces_only_affect_dynamic_bodies() {
        let e = entities(3);
        let mut world = PhysicsWorld::new(Vec3::zeros(), 1.0 / 60.0);
        ball_at(&mut world, e[0], RigidBodyBuilder::dynamic(), Vec3::zeros());
        ball_at(&mut world, e[1], RigidBodyBuilder::kinematic_position_based(), Vec3::new(10.0, 0.0, 0.0));
        ball_at(&mut world, e[2], RigidBodyBuilder::fixed(), Vec3::new(-10.0, 0.0, 0.0));

        assert!(world.is_dynamic(e[0]));
        assert!(!world.is_dynamic(e[1]));
        assert!(!world.is_dynamic(e[2]));
        assert!(world.add_impulse(e[0], Vec3::new(0.0, 1.0, 0.0)));
        assert!(!world.add_impulse(e[1], Vec3::new(0.0, 1.0, 0.0)));
        assert!(!world.add_force(e[2], Vec3::new(0.0, 100.0, 0.0)));

        world.step(1.0 / 60.0);
        assert!(world.linear_velocity(e[0]).unwrap().y > 0.0);
        assert_relative_eq!(world.translation(e[1]).unwrap(), Vec3::new(10.0, 0.0, 0.0));
        assert_relative_eq!(world.translation(e[2]).unwrap(), Vec3::new(-10.0, 0.0, 0.0));
    }

    #[test]
    fn test_force_lasts_one_step() {
        let e = entities(1);
        let mut world = PhysicsWorld::new(Vec3::zeros(), 1.0 / 60.0);
        ball_at(&mut world, e[0], RigidBodyBuilder::dynamic(), Vec3::zeros());

        world.add_force(e[0], Vec3::new(60.0, 0.0, 0.0));
        world.step(1.0 / 60.0);
        let after_push = world.linear_velocity(e[0]).unwrap().x;
        world.step(1.0 / 60.0);

        assert!(after_push > 0.0);
        assert_relative_eq!(world.linear_velocity(e[0]).unwrap().x, after_push, epsilon = 1e-4);
    }

    #[test]
    fn test_overlapping_bodies_produce_one_record() {
        let e = entities(2);
        let mut world = PhysicsWorld::new(Vec3::zeros(), 1.0 / 120.0);
        ball_at(&mut world, e[0], RigidBodyBuilder::dynamic(), Vec3::zeros());
        ball_at(&mut world, e[1], RigidBodyBuilder::fixed(), Vec3::new(0.0, -0.8, 0.0));

        world.step(1.0 / 60.0);
        let records = world.take_collision_records();
        assert_eq!(records, vec![CollisionRecord::new(e[1], e[0])]);
        assert!(world.take_collision_records().is_empty());
    }

    #[test]
    fn test_registration_is_symmetric() {
        let e = entities(2);
        let mut world = PhysicsWorld::default();
        let handle = ball_at(&mut world, e[0], RigidBodyBuilder::dynamic(), Vec3::zeros());

        let collider = BodyShape::default().collider_builder().build();
        assert_eq!(
            world.register_body(e[0], RigidBodyBuilder::dynamic().build(), collider),
            Err(PhysicsError::AlreadyRegistered(e[0]))
        );
        assert_eq!(world.body_count(), 1);
        assert_eq!(world.entity_for_body(handle), Some(e[0]));

        assert_eq!(world.deregister_body(handle), Ok(e[0]));
        assert_eq!(world.deregister_body(handle), Err(PhysicsError::UnknownBody(handle)));
        assert_eq!(world.body_count(), 0);
        assert!(!world.is_registered(e[0]));
        assert_eq!(
            world.set_translation(e[1], Vec3::zeros()),
            Err(PhysicsError::NotRegistered(e[1]))
        );
    }
}
