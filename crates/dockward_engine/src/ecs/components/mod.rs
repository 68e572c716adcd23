//! ECS Components module

pub mod camera;
pub mod renderable;
pub mod rigid_body;
pub mod transform;

pub use camera::CameraComponent;
pub use renderable::RenderableComponent;
pub use rigid_body::RigidBodyComponent;
pub use transform::TransformComponent;
