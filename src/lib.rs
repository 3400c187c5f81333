//! Core modules for a small solar-system viewer.
//!
//! A catalog of bodies ([`config`]) is turned into renderable state
//! ([`bodies`]) that an [`animation::AnimationLoop`] advances from frame
//! timestamps. The loop has no dependency on a windowing system, so the
//! timing and animation code can be driven by synthetic clocks in headless
//! runs and tests. Windowing and GPU work live in [`app`] and [`render`].

pub mod animation;
pub mod app;
pub mod assets;
pub mod bodies;
pub mod camera;
pub mod config;
pub mod input;
pub mod look;
pub mod mesh;
pub mod render;
pub mod scene;
pub mod timing;

pub use animation::{AnimationLoop, Spinner, Tick};
pub use bodies::{BodySet, RenderableBody, SelectionError, ViewMode};
pub use camera::CameraRig;
pub use config::{BodyCatalog, BodyId, CelestialBodyConfig, SkyboxConfig};
pub use input::{Action, KeyCode, MouseButton, NamedKey};
pub use look::{CaptureState, LookController};
pub use mesh::{uv_sphere, Mesh};
pub use render::{CameraParams, DrawItem, LightParams, Renderer};
pub use timing::{FrameStats, FrameTick, FrameTimer, MetricsDisplay, MetricsSink};
