//! Renderer contract and the recording implementation

use super::{MaterialHandle, MeshHandle};
use crate::foundation::math::Mat4;

/// The narrow drawing interface the scene talks to
///
/// A frame is `begin_frame`, any number of `draw` calls, then `end_frame`.
pub trait Renderer {
    /// Start a frame with the camera's projection * view matrix
    fn begin_frame(&mut self, view_projection: &Mat4);

    /// Bind `material` and draw `mesh` with the given model matrix
    fn draw(&mut self, material: MaterialHandle, mesh: MeshHandle, model: &Mat4);

    /// Finish the frame
    fn end_frame(&mut self);
}

/// One recorded draw call
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCommand {
    /// Bound material
    pub material: MaterialHandle,
    /// Drawn mesh
    pub mesh: MeshHandle,
    /// Model matrix
    pub model: Mat4,
}

/// Renderer that records draw calls instead of issuing them
///
/// Used by the headless loop and by tests. Only the most recent frame is kept.
#[derive(Debug)]
pub struct DrawList {
    view_projection: Mat4,
    commands: Vec<DrawCommand>,
    frames: u64,
    in_frame: bool,
}

impl Default for DrawList {
    fn default() -> Self {
        Self {
            view_projection: Mat4::identity(),
            commands: Vec::new(),
            frames: 0,
            in_frame: false,
        }
    }
}

impl DrawList {
    /// Create an empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw calls of the current (or last finished) frame
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// View-projection passed to the last `begin_frame`
    pub fn view_projection(&self) -> &Mat4 {
        &self.view_projection
    }

    /// Number of completed frames
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Renderer for DrawList {
    fn begin_frame(&mut self, view_projection: &Mat4) {
        debug_assert!(!self.in_frame, "begin_frame called twice");
        self.view_projection = *view_projection;
        self.commands.clear();
        self.in_frame = true;
    }

    fn draw(&mut self, material: MaterialHandle, mesh: MeshHandle, model: &Mat4) {
        self.commands.push(DrawCommand {
            material,
            mesh,
            model: *model,
        });
    }

    fn end_frame(&mut self) {
        self.in_frame = false;
        self.frames += 1;
        log::trace!("Frame {} recorded {} draw calls", self.frames, self.commands.len());
    }
}
