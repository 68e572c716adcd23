//! Physics integration
//!
//! A thin layer over rapier3d: the world that steps bodies and harvests
//! overlapping pairs, the collision record type those pairs are reported as,
//! and the shape/kind/tag vocabulary components and level data share.

pub mod body;
pub mod collision;
pub mod world;

pub use body::{BodyKind, BodyShape, IdentityTag};
pub use collision::CollisionRecord;
pub use world::PhysicsWorld;

use crate::ecs::Entity;
use rapier3d::prelude::RigidBodyHandle;
use thiserror::Error;

/// Physics registration errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PhysicsError {
    /// The entity already owns a body in this world
    #[error("entity {0} already has a registered body")]
    AlreadyRegistered(Entity),

    /// The entity owns no body in this world
    #[error("entity {0} has no registered body")]
    NotRegistered(Entity),

    /// The body handle is not (or no longer) part of this world
    #[error("unknown rigid body {0:?}")]
    UnknownBody(RigidBodyHandle),
}
