use std::collections::HashSet;
use std::f64::consts::TAU;
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use glam::Vec3;
use roxmltree::{Document, Node};
use serde::{Deserialize, Serialize};

/// Spin scale applied when a catalog does not specify one.
pub const DEFAULT_SPIN_SCALE: f64 = 0.1;

/// Stable handle for a body, assigned in catalog order at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyId(usize);

impl BodyId {
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

/// Static description of a single celestial body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CelestialBodyConfig {
    pub name: String,
    pub texture: String,
    pub size: f32,
    #[serde(default)]
    pub axial_tilt_degrees: f32,
    /// Rotation period in Earth days; negative spins retrograde.
    #[serde(default)]
    pub rotation_period: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub atmosphere: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ring: Option<String>,
    #[serde(default = "default_color")]
    pub color: Vec3,
}

impl CelestialBodyConfig {
    /// Angular speed in radians per millisecond for the given catalog scale.
    pub fn angular_speed(&self, spin_scale: f64) -> f64 {
        angular_speed(self.rotation_period, spin_scale)
    }
}

/// Background sphere that slowly turns behind the bodies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkyboxConfig {
    pub texture: String,
    pub rotation_period: f64,
}

impl Default for SkyboxConfig {
    fn default() -> Self {
        Self {
            texture: "textures/stars.png".to_string(),
            rotation_period: 20.0,
        }
    }
}

/// Ordered, immutable list of bodies that drives scene construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCatalog")]
pub struct BodyCatalog {
    bodies: Vec<CelestialBodyConfig>,
    pub skybox: SkyboxConfig,
    pub spin_scale: f64,
}

/// Unvalidated catalog fields; deserialisation goes through [`BodyCatalog::new`].
#[derive(Debug, Clone, Deserialize)]
pub struct RawCatalog {
    pub bodies: Vec<CelestialBodyConfig>,
    #[serde(default)]
    pub skybox: SkyboxConfig,
    #[serde(default = "default_spin_scale")]
    pub spin_scale: f64,
}

impl TryFrom<RawCatalog> for BodyCatalog {
    type Error = anyhow::Error;

    fn try_from(raw: RawCatalog) -> Result<Self> {
        Self::new(raw.bodies, raw.skybox, raw.spin_scale)
    }
}

impl BodyCatalog {
    /// Builds a catalog, rejecting empty lists, duplicate names (ignoring
    /// case) and non-finite numbers.
    pub fn new(
        bodies: Vec<CelestialBodyConfig>,
        skybox: SkyboxConfig,
        spin_scale: f64,
    ) -> Result<Self> {
        if bodies.is_empty() {
            bail!("catalog does not define any bodies");
        }
        let mut seen = HashSet::new();
        for body in &bodies {
            if !seen.insert(body.name.to_ascii_lowercase()) {
                bail!("body `{}` is defined more than once", body.name);
            }
            if !(body.size.is_finite() && body.size > 0.0) {
                bail!("body `{}` must have a positive size", body.name);
            }
            if !body.axial_tilt_degrees.is_finite() {
                bail!("body `{}` must have a finite tilt", body.name);
            }
            if !body.rotation_period.is_finite() {
                bail!("body `{}` must have a finite period", body.name);
            }
        }
        if !skybox.rotation_period.is_finite() {
            bail!("skybox period must be finite");
        }
        if !(spin_scale.is_finite() && spin_scale >= 0.0) {
            bail!("spin scale must be finite and non-negative");
        }
        Ok(Self {
            bodies,
            skybox,
            spin_scale,
        })
    }

    /// Loads a catalog XML file from disk.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let xml = std::fs::read_to_string(path)
            .with_context(|| format!("unable to read {}", path.display()))?;
        Self::from_xml(&xml).with_context(|| format!("invalid catalog {}", path.display()))
    }

    /// Parses the catalog XML format.
    pub fn from_xml(xml: &str) -> Result<Self> {
        let document = Document::parse(xml).context("invalid catalog XML")?;
        let root = document.root_element();

        let spin_scale = parse_f64(optional_text(&root, "spin-scale"), DEFAULT_SPIN_SCALE)?;
        let skybox = match root.children().find(|n| n.has_tag_name("skybox")) {
            Some(node) => {
                let defaults = SkyboxConfig::default();
                SkyboxConfig {
                    texture: optional_text(&node, "texture").unwrap_or(defaults.texture),
                    rotation_period: parse_f64(
                        optional_text(&node, "period"),
                        defaults.rotation_period,
                    )?,
                }
            }
            None => SkyboxConfig::default(),
        };

        let mut bodies = Vec::new();
        for node in root.children().filter(|n| n.has_tag_name("body")) {
            let texture = required_text(&node, "texture")?;
            let name = match optional_text(&node, "name") {
                Some(name) => name,
                None => name_from_texture(&texture)
                    .ok_or_else(|| anyhow!("cannot derive a body name from `{texture}`"))?,
            };
            let body = CelestialBodyConfig {
                size: parse_f32(optional_text(&node, "size"), 1.0)
                    .with_context(|| format!("body `{name}` has an invalid size"))?,
                axial_tilt_degrees: parse_f32(optional_text(&node, "tilt"), 0.0)
                    .with_context(|| format!("body `{name}` has an invalid tilt"))?,
                rotation_period: parse_f64(optional_text(&node, "period"), 0.0)
                    .with_context(|| format!("body `{name}` has an invalid period"))?,
                atmosphere: optional_text(&node, "atmosphere"),
                ring: optional_text(&node, "ring"),
                color: parse_color(optional_text(&node, "color"), default_color())
                    .with_context(|| format!("body `{name}` has an invalid color"))?,
                name,
                texture,
            };
            bodies.push(body);
        }

        Self::new(bodies, skybox, spin_scale)
    }

    /// Built-in catalog of the sun, the eight planets and the moon.
    pub fn solar_system() -> Self {
        let bodies = vec![
            body("sun", 1.4, 7.25, 25.38, [255, 200, 80]),
            body("mercury", 1.0, 0.03, 58.65, [150, 140, 130]),
            body("venus", 1.0, 177.36, 243.02, [220, 180, 120]),
            BodyBuilder::new("earth", 1.0, 23.44, 0.997, [70, 110, 200])
                .atmosphere("textures/earth_clouds.png")
                .build(),
            body("mars", 1.0, 25.19, 1.026, [190, 90, 50]),
            body("jupiter", 1.0, 3.13, 0.414, [200, 170, 130]),
            BodyBuilder::new("saturn", 1.0, 26.73, 0.444, [220, 200, 150])
                .ring("textures/saturn_ring.png")
                .build(),
            body("uranus", 1.0, 97.77, 0.718, [150, 210, 220]),
            body("neptune", 1.0, 28.32, 0.671, [70, 100, 220]),
            body("moon", 1.0, 6.68, 27.32, [170, 170, 170]),
        ];
        Self {
            bodies,
            skybox: SkyboxConfig::default(),
            spin_scale: DEFAULT_SPIN_SCALE,
        }
    }

    pub fn bodies(&self) -> &[CelestialBodyConfig] {
        &self.bodies
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn get(&self, id: BodyId) -> Option<&CelestialBodyConfig> {
        self.bodies.get(id.index())
    }

    /// Resolves a body name to its handle.
    pub fn id_of(&self, name: &str) -> Option<BodyId> {
        self.bodies
            .iter()
            .position(|body| body.name.eq_ignore_ascii_case(name))
            .map(BodyId::new)
    }

    /// Every texture path referenced by the catalog, skybox included.
    pub fn texture_refs(&self) -> Vec<&str> {
        let mut refs = vec![self.skybox.texture.as_str()];
        for body in &self.bodies {
            refs.push(&body.texture);
            refs.extend(body.atmosphere.as_deref());
            refs.extend(body.ring.as_deref());
        }
        refs
    }

    /// Narrows the catalog down to a single body, keeping the skybox.
    pub fn only(&self, id: BodyId) -> Option<Self> {
        let body = self.get(id)?.clone();
        Some(Self {
            bodies: vec![body],
            skybox: self.skybox.clone(),
            spin_scale: self.spin_scale,
        })
    }
}

/// Converts a rotation period in Earth days into radians per millisecond.
///
/// `2π / (period × 1000) × spin_scale`: with a scale of one, a body with a
/// one-day period turns once per second. Zero or non-finite periods do not
/// spin.
pub fn angular_speed(period_days: f64, spin_scale: f64) -> f64 {
    if period_days == 0.0 || !period_days.is_finite() || !spin_scale.is_finite() {
        return 0.0;
    }
    TAU / (period_days * 1000.0) * spin_scale
}

/// Derives a body name from a texture path (`textures/earth.png` -> `earth`).
pub fn name_from_texture(texture: &str) -> Option<String> {
    Path::new(texture)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .map(|stem| stem.to_ascii_lowercase())
}

fn body(name: &str, size: f32, tilt: f32, period: f64, color: [u8; 3]) -> CelestialBodyConfig {
    BodyBuilder::new(name, size, tilt, period, color).build()
}

struct BodyBuilder(CelestialBodyConfig);

impl BodyBuilder {
    fn new(name: &str, size: f32, tilt: f32, period: f64, color: [u8; 3]) -> Self {
        Self(CelestialBodyConfig {
            name: name.to_string(),
            texture: format!("textures/{name}.png"),
            size,
            axial_tilt_degrees: tilt,
            rotation_period: period,
            atmosphere: None,
            ring: None,
            color: Vec3::new(
                color[0] as f32 / 255.0,
                color[1] as f32 / 255.0,
                color[2] as f32 / 255.0,
            ),
        })
    }

    fn atmosphere(mut self, texture: &str) -> Self {
        self.0.atmosphere = Some(texture.to_string());
        self
    }

    fn ring(mut self, texture: &str) -> Self {
        self.0.ring = Some(texture.to_string());
        self
    }

    fn build(self) -> CelestialBodyConfig {
        self.0
    }
}

fn default_color() -> Vec3 {
    Vec3::ONE
}

fn default_spin_scale() -> f64 {
    DEFAULT_SPIN_SCALE
}

fn required_text(node: &Node<'_, '_>, tag: &str) -> Result<String> {
    optional_text(node, tag).ok_or_else(|| anyhow!("<{tag}> tag is missing"))
}

fn optional_text(node: &Node<'_, '_>, tag: &str) -> Option<String> {
    node.children()
        .find(|child| child.has_tag_name(tag))
        .and_then(|child| child.text())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(|text| text.to_string())
}

fn parse_color(value: Option<String>, default: Vec3) -> Result<Vec3> {
    let Some(value) = value else {
        return Ok(default);
    };
    let components = value
        .split_whitespace()
        .map(|component| {
            component
                .parse::<u8>()
                .with_context(|| format!("color component `{component}` is not 0-255"))
        })
        .collect::<Result<Vec<_>>>()?;
    let [r, g, b] = components[..] else {
        bail!("color needs 3 components, got {}", components.len());
    };
    Ok(Vec3::new(
        f32::from(r) / 255.0,
        f32::from(g) / 255.0,
        f32::from(b) / 255.0,
    ))
}

fn parse_f32(value: Option<String>, default: f32) -> Result<f32> {
    match value {
        Some(value) => value
            .parse::<f32>()
            .map_err(|err| anyhow!("failed to parse float: {err}")),
        None => Ok(default),
    }
}

fn parse_f64(value: Option<String>, default: f64) -> Result<f64> {
    match value {
        Some(value) => value
            .parse::<f64>()
            .map_err(|err| anyhow!("failed to parse float: {err}")),
        None => Ok(default),
    }
}
