//! Per-frame update driven by an externally owned loop.
//!
//! The host (a winit event loop, or a synthetic loop in headless runs and
//! tests) calls [`AnimationLoop::frame`] with a millisecond timestamp. The
//! loop turns that into a delta, publishes smoothed statistics and advances
//! everything that implements [`Tick`].

use std::f64::consts::TAU;

use glam::Quat;

use crate::bodies::BodySet;
use crate::config::{angular_speed, SkyboxConfig};
use crate::timing::{FrameTick, FrameTimer, MetricsSink};

/// Anything advanced by elapsed wall-clock time.
pub trait Tick {
    fn tick(&mut self, delta_ms: f64);
}

/// Constant-rate rotation about the vertical axis.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Spinner {
    angular_speed: f64,
    angle: f64,
}

impl Spinner {
    pub fn new(angular_speed: f64) -> Self {
        Self {
            angular_speed,
            angle: 0.0,
        }
    }

    pub fn for_skybox(skybox: &SkyboxConfig, spin_scale: f64) -> Self {
        Self::new(angular_speed(skybox.rotation_period, spin_scale))
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn orientation(&self) -> Quat {
        Quat::from_rotation_y(self.angle.rem_euclid(TAU) as f32)
    }
}

impl Tick for Spinner {
    fn tick(&mut self, delta_ms: f64) {
        self.angle += self.angular_speed * delta_ms;
    }
}

/// Owns the frame timer, the bodies and the skybox for one scene.
pub struct AnimationLoop {
    timer: FrameTimer,
    bodies: BodySet,
    skybox: Spinner,
    sink: Option<Box<dyn MetricsSink>>,
}

impl AnimationLoop {
    pub fn new(bodies: BodySet) -> Self {
        let catalog = bodies.catalog();
        let skybox = Spinner::for_skybox(&catalog.skybox, catalog.spin_scale);
        Self {
            timer: FrameTimer::new(),
            bodies,
            skybox,
            sink: None,
        }
    }

    /// Attaches the receiver for frame statistics.
    pub fn with_sink(mut self, sink: impl MetricsSink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    /// Runs one frame at `timestamp_ms`.
    ///
    /// The first frame only primes the timer; later frames advance the
    /// scene by the elapsed time.
    pub fn frame(&mut self, timestamp_ms: f64) -> Option<FrameTick> {
        let tick = self.timer.tick(timestamp_ms)?;
        self.bodies.tick(tick.delta_ms);
        self.skybox.tick(tick.delta_ms);
        if let (Some(stats), Some(sink)) = (tick.report.as_ref(), self.sink.as_mut()) {
            sink.publish(stats);
        }
        Some(tick)
    }

    pub fn timer(&self) -> &FrameTimer {
        &self.timer
    }

    pub fn bodies(&self) -> &BodySet {
        &self.bodies
    }

    pub fn bodies_mut(&mut self) -> &mut BodySet {
        &mut self.bodies
    }

    pub fn skybox(&self) -> &Spinner {
        &self.skybox
    }
}
