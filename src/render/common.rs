use glam::{Mat4, Vec3, Vec4};

/// Camera parameters consumed by the renderer's uniform buffer.
#[derive(Clone, Debug)]
pub struct CameraParams {
    pub view_proj: Mat4,
    pub position: Vec3,
}

/// Lighting state consumed by the renderer's uniform buffer.
#[derive(Clone, Debug)]
pub struct LightParams {
    pub position: Vec3,
    pub color: Vec3,
    pub intensity: f32,
}

impl Default for LightParams {
    fn default() -> Self {
        Self {
            position: Vec3::new(-6.0, 3.0, 6.0),
            color: Vec3::splat(1.0),
            intensity: 1.0,
        }
    }
}

/// Which mesh a draw item uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MeshKind {
    Sphere,
    /// Sphere seen from the inside.
    Sky,
}

/// One mesh instance to draw this frame.
#[derive(Clone, Debug, PartialEq)]
pub struct DrawItem {
    pub mesh: MeshKind,
    pub model: Mat4,
    pub color: Vec4,
    /// Skip diffuse lighting (used for the skybox).
    pub unlit: bool,
    pub double_sided: bool,
}
