//! Renderable component for entities that can be drawn

use crate::ecs::Component;
use crate::render::{MaterialHandle, MeshHandle};

/// Component for entities that can be rendered
///
/// Handles come from the resource cache; a null handle (failed load) makes
/// the entity invisible instead of an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderableComponent {
    /// Material to bind
    pub material: MaterialHandle,

    /// Mesh to draw
    pub mesh: MeshHandle,

    /// Whether this object is visible
    pub visible: bool,
}

impl Default for RenderableComponent {
    fn default() -> Self {
        Self::new(MaterialHandle::NULL, MeshHandle::NULL)
    }
}

impl RenderableComponent {
    /// Create a new visible renderable
    pub fn new(material: MaterialHandle, mesh: MeshHandle) -> Self {
        Self {
            material,
            mesh,
            visible: true,
        }
    }

    /// Set visibility
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Visible and both handles resolved
    pub fn should_render(&self) -> bool {
        self.visible && !self.material.is_null() && !self.mesh.is_null()
    }
}

impl Component for RenderableComponent {}
