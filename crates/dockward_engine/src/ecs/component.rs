//! Component trait and lifecycle hooks

use crate::ecs::Entity;
use crate::physics::{PhysicsError, PhysicsWorld};
use std::any::Any;

/// Data attachable to an entity
///
/// Plain data components keep the default no-op hooks. Components that own a
/// resource inside the physics world override them: `on_attach` runs before the
/// value is stored (a failing hook leaves the entity without the component),
/// `on_detach` runs before it is dropped (remove, replace, entity destruction),
/// so the simulation never holds a body whose owner is gone.
pub trait Component: Any {
    /// Called once when the component is attached to `entity`
    fn on_attach(&mut self, _entity: Entity, _physics: &mut PhysicsWorld) -> Result<(), PhysicsError> {
        Ok(())
    }

    /// Called once when the component leaves its entity
    fn on_detach(&mut self, _physics: &mut PhysicsWorld) {}
}
