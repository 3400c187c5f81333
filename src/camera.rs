use glam::{Mat4, Quat, Vec3};

use crate::render::CameraParams;

/// Perspective camera at a fixed position whose orientation is supplied per frame.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraRig {
    pub position: Vec3,
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    aspect: f32,
}

impl Default for CameraRig {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 3.5),
            fov_degrees: 60.0,
            near: 0.1,
            far: 200.0,
            aspect: 16.0 / 9.0,
        }
    }
}

impl CameraRig {
    /// Recomputes the aspect ratio from the output size.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.aspect = if height == 0 {
            1.0
        } else {
            width as f32 / height as f32
        };
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// Direction the camera faces for the given orientation.
    pub fn forward(orientation: Quat) -> Vec3 {
        orientation * Vec3::NEG_Z
    }

    pub fn params(&self, orientation: Quat) -> CameraParams {
        let forward = Self::forward(orientation);
        let up = orientation * Vec3::Y;
        let view = Mat4::look_to_rh(self.position, forward, up);
        let projection = Mat4::perspective_rh(
            self.fov_degrees.to_radians(),
            self.aspect.max(0.01),
            self.near,
            self.far,
        );
        CameraParams {
            view_proj: projection * view,
            position: self.position,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resize_is_idempotent() {
        let mut rig = CameraRig::default();
        rig.set_viewport(1280, 720);
        let first = rig.params(Quat::IDENTITY);
        rig.set_viewport(1280, 720);
        assert_eq!(rig.params(Quat::IDENTITY).view_proj, first.view_proj);
        assert!((rig.aspect() - 1280.0 / 720.0).abs() < 1e-6);
    }

    #[test]
    fn zero_height_falls_back_to_square() {
        let mut rig = CameraRig::default();
        rig.set_viewport(800, 0);
        assert_eq!(rig.aspect(), 1.0);
    }

    #[test]
    fn identity_orientation_looks_at_origin() {
        let rig = CameraRig::default();
        let clip = rig.params(Quat::IDENTITY).view_proj * Vec3::ZERO.extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-5 && ndc.y.abs() < 1e-5);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }

    #[test]
    fn yaw_turns_the_view() {
        let forward = CameraRig::forward(Quat::from_rotation_y(std::f32::consts::FRAC_PI_2));
        assert!((forward - Vec3::NEG_X).length() < 1e-6);
    }
}
