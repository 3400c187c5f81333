mod common;
mod gpu;

pub use common::{CameraParams, DrawItem, LightParams, MeshKind};
pub use gpu::Renderer;
