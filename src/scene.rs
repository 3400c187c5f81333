use glam::{Mat4, Quat, Vec3, Vec4};

use crate::animation::AnimationLoop;
use crate::bodies::{BodyLayer, LayerKind, RenderableBody};
use crate::render::{DrawItem, MeshKind};

/// Radius of the skybox sphere around the camera.
pub const SKYBOX_RADIUS: f32 = 100.0;
/// Flat colour used for the skybox in place of its texture.
pub const SKYBOX_COLOR: Vec3 = Vec3::new(0.02, 0.02, 0.06);

/// Builds the ordered draw list for the current animation state.
///
/// The skybox comes first, then every visible body with its overlays, so that
/// translucent shells blend over the surfaces beneath them.
pub fn draw_list(animation: &AnimationLoop, camera_position: Vec3) -> Vec<DrawItem> {
    let mut items = vec![skybox_item(animation.skybox().orientation(), camera_position)];
    for body in animation.bodies().visible() {
        items.extend(body_items(body));
    }
    items
}

fn skybox_item(orientation: Quat, camera_position: Vec3) -> DrawItem {
    DrawItem {
        mesh: MeshKind::Sky,
        model: Mat4::from_scale_rotation_translation(
            Vec3::splat(SKYBOX_RADIUS),
            orientation,
            camera_position,
        ),
        color: SKYBOX_COLOR.extend(1.0),
        unlit: true,
        double_sided: false,
    }
}

/// Draw items for one body: surface first, overlays after.
pub fn body_items(body: &RenderableBody) -> Vec<DrawItem> {
    body.layers()
        .iter()
        .map(|layer| DrawItem {
            mesh: MeshKind::Sphere,
            model: body.model_matrix(layer),
            color: layer_color(body, layer),
            unlit: false,
            double_sided: layer.double_sided,
        })
        .collect()
}

fn layer_color(body: &RenderableBody, layer: &BodyLayer) -> Vec4 {
    let tint = match layer.kind {
        LayerKind::Surface => body.config().color,
        LayerKind::Atmosphere => Vec3::new(0.85, 0.9, 1.0),
        LayerKind::Ring => body.config().color * 0.9,
    };
    tint.extend(layer.alpha)
}
