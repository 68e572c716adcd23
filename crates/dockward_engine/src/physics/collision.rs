//! Collision records harvested from the physics world

use crate::ecs::Entity;

/// Two entities whose bodies overlapped during a step
///
/// The smaller entity key is always stored first, so a pair observed in both
/// orders (or in several sub-steps) collapses to one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollisionRecord {
    /// Entity with the smaller key
    pub entity_a: Entity,
    /// Entity with the larger key
    pub entity_b: Entity,
}

impl CollisionRecord {
    /// Create a normalized record
    pub fn new(entity_a: Entity, entity_b: Entity) -> Self {
        if entity_a <= entity_b {
            Self { entity_a, entity_b }
        } else {
            Self {
                entity_a: entity_b,
                entity_b: entity_a,
            }
        }
    }

    /// Whether `entity` is one side of this record
    pub fn involves(&self, entity: Entity) -> bool {
        self.entity_a == entity || self.entity_b == entity
    }

    /// The side that is not `entity`, if `entity` is part of the record
    pub fn other(&self, entity: Entity) -> Option<Entity> {
        if self.entity_a == entity {
            Some(self.entity_b)
        } else if self.entity_b == entity {
            Some(self.entity_a)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    #[test]
    fn test_record_is_order_independent() {
        let mut keys: SlotMap<Entity, ()> = SlotMap::with_key();
        let a = keys.insert(());
        let b = keys.insert(());

        let forward = CollisionRecord::new(a, b);
        let backward = CollisionRecord::new(b, a);
        assert_eq!(forward, backward);
        assert_eq!(forward.entity_a, a.min(b));
        assert_eq!(forward.other(a), Some(b));
        assert!(forward.involves(b));

        let c = keys.insert(());
        assert_eq!(forward.other(c), None);
    }
}
