//! Rendering contracts
//!
//! The engine does not own a GPU backend. Scenes draw through the
//! [`Renderer`] trait using handles handed out by the [`ResourceCache`];
//! [`DrawList`] records the calls for headless runs and tests.

pub mod cache;
pub mod handle;
pub mod renderer;

pub use cache::{MaterialInfo, MeshInfo, ResourceCache, TextureInfo};
pub use handle::{MaterialHandle, MeshHandle, TextureHandle};
pub use renderer::{DrawCommand, DrawList, Renderer};
