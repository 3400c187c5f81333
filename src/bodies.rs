use std::f64::consts::TAU;

use glam::{Mat4, Quat, Vec3};
use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::animation::Tick;
use crate::config::{BodyCatalog, BodyId, CelestialBodyConfig};

/// Radius multiplier for atmosphere overlays.
pub const ATMOSPHERE_SCALE: f32 = 1.02;
/// Radius multiplier for ring overlays.
pub const RING_SCALE: f32 = 2.2;
/// Vertical squash applied to ring overlays.
pub const RING_THICKNESS: f32 = 0.01;

/// How many bodies the viewer shows at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ViewMode {
    /// Every catalog body is loaded; exactly one is visible at a time.
    #[default]
    Gallery,
    /// A single body with the look-around camera.
    Single,
}

impl ViewMode {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "gallery" => Some(Self::Gallery),
            "single" => Some(Self::Single),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("unknown body: {0}")]
    UnknownBody(String),
    #[error("body handle {0} is out of range")]
    InvalidHandle(usize),
}

/// Which surface of a body is being drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
    Surface,
    Atmosphere,
    Ring,
}

/// One drawable shell of a body.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyLayer {
    pub kind: LayerKind,
    pub texture: String,
    pub scale: Vec3,
    pub alpha: f32,
    pub double_sided: bool,
}

/// Mutable per-body state created once from its configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderableBody {
    id: BodyId,
    config: CelestialBodyConfig,
    angular_speed: f64,
    tilt: f32,
    spin: f64,
    visible: bool,
}

impl RenderableBody {
    pub fn new(id: BodyId, config: CelestialBodyConfig, spin_scale: f64) -> Self {
        Self {
            id,
            angular_speed: config.angular_speed(spin_scale),
            tilt: config.axial_tilt_degrees.to_radians(),
            config,
            spin: 0.0,
            visible: false,
        }
    }

    pub fn id(&self) -> BodyId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn config(&self) -> &CelestialBodyConfig {
        &self.config
    }

    /// Radians per millisecond.
    pub fn angular_speed(&self) -> f64 {
        self.angular_speed
    }

    /// Spin angle about the body's own axis, in radians.
    pub fn spin(&self) -> f64 {
        self.spin
    }

    /// Static tilt about the viewing axis, in radians.
    pub fn tilt(&self) -> f32 {
        self.tilt
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    fn advance(&mut self, delta_ms: f64) {
        self.spin += self.angular_speed * delta_ms;
    }

    /// Tilt about Z first, then spin about the tilted Y axis.
    pub fn orientation(&self) -> Quat {
        let spin = self.spin.rem_euclid(TAU) as f32;
        Quat::from_rotation_z(self.tilt) * Quat::from_rotation_y(spin)
    }

    /// World transform for a layer of this body placed at the origin.
    pub fn model_matrix(&self, layer: &BodyLayer) -> Mat4 {
        Mat4::from_rotation_translation(self.orientation(), Vec3::ZERO)
            * Mat4::from_scale(layer.scale * self.config.size)
    }

    /// The surface shell followed by any configured overlays.
    pub fn layers(&self) -> Vec<BodyLayer> {
        let mut layers = vec![BodyLayer {
            kind: LayerKind::Surface,
            texture: self.config.texture.clone(),
            scale: Vec3::ONE,
            alpha: 1.0,
            double_sided: false,
        }];
        if let Some(texture) = &self.config.atmosphere {
            layers.push(BodyLayer {
                kind: LayerKind::Atmosphere,
                texture: texture.clone(),
                scale: Vec3::splat(ATMOSPHERE_SCALE),
                alpha: 0.35,
                double_sided: false,
            });
        }
        if let Some(texture) = &self.config.ring {
            layers.push(BodyLayer {
                kind: LayerKind::Ring,
                texture: texture.clone(),
                scale: Vec3::new(RING_SCALE, RING_THICKNESS, RING_SCALE),
                alpha: 0.6,
                double_sided: true,
            });
        }
        layers
    }
}

/// Owns every body in the scene and their visibility.
#[derive(Debug, Clone)]
pub struct BodySet {
    catalog: BodyCatalog,
    bodies: Vec<RenderableBody>,
}

impl BodySet {
    /// Creates one body per catalog entry and shows the first.
    pub fn new(catalog: BodyCatalog) -> Self {
        let spin_scale = catalog.spin_scale;
        let mut bodies: Vec<RenderableBody> = catalog
            .bodies()
            .iter()
            .enumerate()
            .map(|(index, config)| {
                RenderableBody::new(BodyId::new(index), config.clone(), spin_scale)
            })
            .collect();
        if let Some(first) = bodies.first_mut() {
            first.visible = true;
        }
        Self { catalog, bodies }
    }

    /// Builds the set for a view mode, focusing `focus` when given.
    ///
    /// In [`ViewMode::Single`] only the focused body is loaded.
    pub fn for_mode(
        catalog: &BodyCatalog,
        mode: ViewMode,
        focus: Option<&str>,
    ) -> Result<Self, SelectionError> {
        let id = match focus {
            Some(name) => catalog
                .id_of(name)
                .ok_or_else(|| SelectionError::UnknownBody(name.to_string()))?,
            None => BodyId::new(0),
        };
        match mode {
            ViewMode::Gallery => {
                let mut set = Self::new(catalog.clone());
                set.select_id(id)?;
                Ok(set)
            }
            ViewMode::Single => {
                let single = catalog
                    .only(id)
                    .ok_or(SelectionError::InvalidHandle(id.index()))?;
                Ok(Self::new(single))
            }
        }
    }

    pub fn catalog(&self) -> &BodyCatalog {
        &self.catalog
    }

    pub fn bodies(&self) -> &[RenderableBody] {
        &self.bodies
    }

    pub fn get(&self, id: BodyId) -> Option<&RenderableBody> {
        self.bodies.get(id.index())
    }

    pub fn by_name(&self, name: &str) -> Option<&RenderableBody> {
        self.catalog.id_of(name).and_then(|id| self.get(id))
    }

    /// Bodies currently marked visible.
    pub fn visible(&self) -> impl Iterator<Item = &RenderableBody> {
        self.bodies.iter().filter(|body| body.visible)
    }

    /// The first visible body, if any.
    pub fn focused(&self) -> Option<BodyId> {
        self.visible().next().map(RenderableBody::id)
    }

    /// Hides every body, then shows the one called `name`.
    ///
    /// Unknown names leave the current visibility untouched.
    pub fn select(&mut self, name: &str) -> Result<BodyId, SelectionError> {
        let id = self
            .catalog
            .id_of(name)
            .ok_or_else(|| SelectionError::UnknownBody(name.to_string()))?;
        self.select_id(id)
    }

    pub fn select_id(&mut self, id: BodyId) -> Result<BodyId, SelectionError> {
        if id.index() >= self.bodies.len() {
            return Err(SelectionError::InvalidHandle(id.index()));
        }
        for body in &mut self.bodies {
            body.visible = false;
        }
        self.bodies[id.index()].visible = true;
        debug!("focused {}", self.bodies[id.index()].name());
        Ok(id)
    }

    /// Focuses the body after the current one, wrapping around.
    ///
    /// Returns `None` only for an empty set.
    pub fn select_next(&mut self) -> Option<BodyId> {
        let len = self.bodies.len();
        let next = match self.focused() {
            Some(id) => id.index().checked_add(1)?.checked_rem(len)?,
            None => 0,
        };
        self.select_id(BodyId::new(next)).ok()
    }

    /// Focuses the body before the current one, wrapping around.
    ///
    /// Returns `None` only for an empty set.
    pub fn select_previous(&mut self) -> Option<BodyId> {
        let last = self.bodies.len().checked_sub(1)?;
        let previous = match self.focused() {
            Some(id) if id.index() > 0 => id.index() - 1,
            _ => last,
        };
        self.select_id(BodyId::new(previous)).ok()
    }
}

impl Tick for BodySet {
    fn tick(&mut self, delta_ms: f64) {
        for body in self.bodies.iter_mut().filter(|body| body.visible) {
            body.advance(delta_ms);
        }
    }
}
