//! Registry error types

use crate::ecs::Entity;
use crate::physics::PhysicsError;
use thiserror::Error;

/// Failures of entity and component access
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EcsError {
    /// The handle was destroyed or never belonged to this registry
    #[error("invalid entity {0}")]
    InvalidEntity(Entity),

    /// The entity is alive but has no component of the requested type
    #[error("entity {entity} has no {component} component")]
    ComponentNotFound {
        /// Entity that was queried
        entity: Entity,
        /// Rust type name of the missing component
        component: &'static str,
    },

    /// A component lifecycle hook failed to (de)register with the physics world
    #[error("physics hook failed: {0}")]
    Physics(#[from] PhysicsError),
}

/// Result alias for registry operations
pub type EcsResult<T> = Result<T, EcsError>;
