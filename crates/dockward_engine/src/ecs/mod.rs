//! Entity-Component-System implementation
//!
//! Entities are generational `slotmap` keys; components live in one typed
//! storage per component type inside [`World`]. Components that own physics
//! state register and release it through the [`Component`] hooks.

pub mod component;
pub mod components;
pub mod entity;
pub mod error;
pub mod world;

pub use component::Component;
pub use entity::Entity;
pub use error::{EcsError, EcsResult};
pub use world::World;
