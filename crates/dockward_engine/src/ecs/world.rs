//! ECS World implementation
//!
//! Heterogeneous component storage keyed by [`Entity`]. One `SecondaryMap`
//! per component type; entity liveness lives in a single `SlotMap` so a stale
//! handle is rejected before any storage is touched.

use super::{Component, EcsError, EcsResult, Entity};
use crate::physics::PhysicsWorld;
use slotmap::{SecondaryMap, SlotMap};
use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;

/// Type-erased view of a `Storage<T>`
trait ComponentStore {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    /// Drop the entity's component, running its detach hook first
    fn detach(&mut self, entity: Entity, physics: &mut PhysicsWorld) -> bool;
    fn len(&self) -> usize;
}

struct Storage<T: Component> {
    items: SecondaryMap<Entity, T>,
}

impl<T: Component> Storage<T> {
    fn new() -> Self {
        Self { items: SecondaryMap::new() }
    }
}

impl<T: Component> ComponentStore for Storage<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn detach(&mut self, entity: Entity, physics: &mut PhysicsWorld) -> bool {
        match self.items.remove(entity) {
            Some(mut component) => {
                component.on_detach(physics);
                true
            }
            None => false,
        }
    }

    fn len(&self) -> usize {
        self.items.len()
    }
}

/// ECS World containing all entities and components
#[derive(Default)]
pub struct World {
    entities: SlotMap<Entity, ()>,
    storages: HashMap<TypeId, Box<dyn ComponentStore>>,
}

impl World {
    /// Create a new world
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new entity
    pub fn create_entity(&mut self) -> Entity {
        self.entities.insert(())
    }

    /// Destroy an entity and release every component attached to it
    ///
    /// Physics-bearing components are deregistered from `physics` before they
    /// are dropped.
    pub fn destroy_entity(&mut self, entity: Entity, physics: &mut PhysicsWorld) -> EcsResult<()> {
        if self.entities.remove(entity).is_none() {
            return Err(EcsError::InvalidEntity(entity));
        }

        let mut released = 0;
        for store in self.storages.values_mut() {
            if store.detach(entity, physics) {
                released += 1;
            }
        }
        log::trace!("Destroyed entity {} ({} components released)", entity, released);
        Ok(())
    }

    /// Whether `entity` is alive in this world
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.entities.contains_key(entity)
    }

    /// Number of live entities
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Get an iterator over all live entities
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.entities.keys()
    }

    /// Add a component to an entity, replacing (and detaching) any previous value of `T`
    pub fn attach<T: Component>(
        &mut self,
        entity: Entity,
        mut component: T,
        physics: &mut PhysicsWorld,
    ) -> EcsResult<()> {
        self.ensure_alive(entity)?;

        if let Some(mut previous) = self.storage_mut::<T>().items.remove(entity) {
            log::trace!("Replacing {} on entity {}", type_name::<T>(), entity);
            previous.on_detach(physics);
        }

        component.on_attach(entity, physics)?;
        self.storage_mut::<T>().items.insert(entity, component);
        Ok(())
    }

    /// Add a default-constructed component to an entity
    pub fn attach_default<T: Component + Default>(
        &mut self,
        entity: Entity,
        physics: &mut PhysicsWorld,
    ) -> EcsResult<()> {
        self.attach(entity, T::default(), physics)
    }

    /// Remove a component from an entity, running its detach hook
    pub fn remove<T: Component>(&mut self, entity: Entity, physics: &mut PhysicsWorld) -> EcsResult<T> {
        self.ensure_alive(entity)?;

        let mut component = self
            .storage_mut::<T>()
            .items
            .remove(entity)
            .ok_or_else(|| Self::not_found::<T>(entity))?;
        component.on_detach(physics);
        Ok(component)
    }

    /// Get a component from an entity
    pub fn get<T: Component>(&self, entity: Entity) -> EcsResult<&T> {
        self.ensure_alive(entity)?;
        self.storage::<T>()
            .and_then(|storage| storage.items.get(entity))
            .ok_or_else(|| Self::not_found::<T>(entity))
    }

    /// Get a mutable component from an entity
    pub fn get_mut<T: Component>(&mut self, entity: Entity) -> EcsResult<&mut T> {
        self.ensure_alive(entity)?;
        self.storages
            .get_mut(&TypeId::of::<T>())
            .and_then(|store| store.as_any_mut().downcast_mut::<Storage<T>>())
            .and_then(|storage| storage.items.get_mut(entity))
            .ok_or_else(|| Self::not_found::<T>(entity))
    }

    /// Check whether a live entity has a component of type `T`
    pub fn has<T: Component>(&self, entity: Entity) -> bool {
        self.is_alive(entity)
            && self
                .storage::<T>()
                .is_some_and(|storage| storage.items.contains_key(entity))
    }

    /// Iterate every `(entity, component)` pair of type `T`
    pub fn iter<T: Component>(&self) -> impl Iterator<Item = (Entity, &T)> + '_ {
        self.storage::<T>()
            .into_iter()
            .flat_map(|storage| storage.items.iter())
    }

    /// Iterate every `(entity, component)` pair of type `T` mutably
    pub fn iter_mut<T: Component>(&mut self) -> impl Iterator<Item = (Entity, &mut T)> + '_ {
        self.storages
            .get_mut(&TypeId::of::<T>())
            .and_then(|store| store.as_any_mut().downcast_mut::<Storage<T>>())
            .into_iter()
            .flat_map(|storage| storage.items.iter_mut())
    }

    /// Number of components of type `T` currently stored
    pub fn component_count<T: Component>(&self) -> usize {
        self.storages
            .get(&TypeId::of::<T>())
            .map_or(0, |store| store.len())
    }

    /// Destroy every entity, deregistering all physics bodies
    pub fn clear(&mut self, physics: &mut PhysicsWorld) {
        let entities: Vec<Entity> = self.entities.keys().collect();
        for entity in entities {
            // Keys came from the live set, so this cannot fail.
            let _ = self.destroy_entity(entity, physics);
        }
    }

    fn ensure_alive(&self, entity: Entity) -> EcsResult<()> {
        if self.is_alive(entity) {
            Ok(())
        } else {
            Err(EcsError::InvalidEntity(entity))
        }
    }

    fn not_found<T: Component>(entity: Entity) -> EcsError {
        EcsError::ComponentNotFound {
            entity,
            component: type_name::<T>(),
        }
    }

    fn storage<T: Component>(&self) -> Option<&Storage<T>> {
        self.storages
            .get(&TypeId::of::<T>())
            .and_then(|store| store.as_any().downcast_ref::<Storage<T>>())
    }

    fn storage_mut<T: Component>(&mut self) -> &mut Storage<T> {
        let store = self
            .storages
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(Storage::<T>::new()));
        match store.as_any_mut().downcast_mut::<Storage<T>>() {
            Some(storage) => storage,
            // Entries are keyed by the TypeId of exactly this storage type.
            None => unreachable!("component storage registered under the wrong TypeId"),
        }
    }
}
