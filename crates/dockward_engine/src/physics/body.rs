//! Body descriptions shared by components, level data and the physics world

use crate::foundation::math::Vec3;
use rapier3d::prelude::{ColliderBuilder, RigidBodyBuilder};
use serde::{Deserialize, Serialize};

/// How a body participates in the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BodyKind {
    /// Immovable, infinite mass
    Static,
    /// Moved only by explicit position writes
    Kinematic,
    /// Fully simulated: gravity, forces and impulses
    #[default]
    Dynamic,
}

impl BodyKind {
    /// Rapier builder for this kind of body
    pub(crate) fn builder(self) -> RigidBodyBuilder {
        match self {
            BodyKind::Static => RigidBodyBuilder::fixed(),
            BodyKind::Kinematic => RigidBodyBuilder::kinematic_position_based(),
            BodyKind::Dynamic => RigidBodyBuilder::dynamic(),
        }
    }
}

/// Collision shape of a body, in body-local space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BodyShape {
    /// Box given by its half extents
    Cuboid {
        /// Half size along each axis
        half_extents: Vec3,
    },
    /// Ball
    Sphere {
        /// Radius
        radius: f32,
    },
    /// Y-aligned capsule
    Capsule {
        /// Half length of the cylindrical part
        half_height: f32,
        /// Radius of the caps
        radius: f32,
    },
}

impl Default for BodyShape {
    fn default() -> Self {
        BodyShape::Cuboid {
            half_extents: Vec3::new(0.5, 0.5, 0.5),
        }
    }
}

impl BodyShape {
    /// Rapier collider builder for this shape
    pub(crate) fn collider_builder(&self) -> ColliderBuilder {
        match *self {
            BodyShape::Cuboid { half_extents } => {
                ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            }
            BodyShape::Sphere { radius } => ColliderBuilder::ball(radius),
            BodyShape::Capsule { half_height, radius } => ColliderBuilder::capsule_y(half_height, radius),
        }
    }
}

/// Small integer classifying a body for gameplay dispatch
///
/// Unrelated to entity handles. `1` is the player and `2` is walkable
/// ground; everything above is level specific (doors, pads, goals).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityTag(pub u32);

impl IdentityTag {
    /// Untagged body
    pub const NONE: IdentityTag = IdentityTag(0);
    /// The player character
    pub const PLAYER: IdentityTag = IdentityTag(1);
    /// Ground the player can stand on
    pub const GROUND: IdentityTag = IdentityTag(2);
}

impl From<u32> for IdentityTag {
    fn from(value: u32) -> Self {
        IdentityTag(value)
    }
}

impl std::fmt::Display for IdentityTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "tag{}", self.0)
    }
}
