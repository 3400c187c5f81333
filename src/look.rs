use std::f32::consts::FRAC_PI_2;

use glam::{EulerRot, Quat};
use log::debug;
use serde::{Deserialize, Serialize};

/// Radians of rotation per unit of raw pointer motion.
pub const DEFAULT_SENSITIVITY: f32 = 0.002;

/// Whether raw pointer motion is currently routed to the camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CaptureState {
    #[default]
    Released,
    Captured,
}

/// Turns pointer deltas into a yaw/pitch pair while capture is engaged.
#[derive(Debug, Clone, PartialEq)]
pub struct LookController {
    state: CaptureState,
    yaw: f32,
    pitch: f32,
    sensitivity: f32,
}

impl Default for LookController {
    fn default() -> Self {
        Self::new(DEFAULT_SENSITIVITY)
    }
}

impl LookController {
    pub fn new(sensitivity: f32) -> Self {
        Self {
            state: CaptureState::Released,
            yaw: 0.0,
            pitch: 0.0,
            sensitivity,
        }
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    pub fn is_captured(&self) -> bool {
        self.state == CaptureState::Captured
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Enters capture mode. Returns `false` if capture was already engaged.
    pub fn engage(&mut self) -> bool {
        if self.is_captured() {
            return false;
        }
        debug!("pointer captured");
        self.state = CaptureState::Captured;
        true
    }

    /// Leaves capture mode on request.
    pub fn release(&mut self) {
        if self.is_captured() {
            debug!("pointer released");
        }
        self.state = CaptureState::Released;
    }

    /// The host took the capture away (focus loss, grab refused).
    pub fn capture_lost(&mut self) {
        if self.is_captured() {
            debug!("pointer capture lost");
        }
        self.state = CaptureState::Released;
    }

    /// Applies a raw pointer delta. Ignored unless captured.
    pub fn pointer_moved(&mut self, dx: f32, dy: f32) {
        if !self.is_captured() {
            return;
        }
        self.yaw -= dx * self.sensitivity;
        self.pitch = (self.pitch + dy * self.sensitivity).clamp(-FRAC_PI_2, FRAC_PI_2);
    }

    /// Yaw about Y, then pitch about X, no roll.
    pub fn orientation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_released_and_ignores_motion() {
        let mut look = LookController::default();
        assert_eq!(look.state(), CaptureState::Released);
        look.pointer_moved(120.0, -45.0);
        assert_eq!(look.yaw(), 0.0);
        assert_eq!(look.pitch(), 0.0);
    }

    #[test]
    fn engage_only_from_released() {
        let mut look = LookController::default();
        assert!(look.engage());
        assert!(!look.engage());
        look.release();
        assert!(look.engage());
    }

    #[test]
    fn horizontal_is_negated_vertical_is_not() {
        let mut look = LookController::new(0.01);
        look.engage();
        look.pointer_moved(10.0, 5.0);
        assert!((look.yaw() + 0.1).abs() < 1e-6);
        assert!((look.pitch() - 0.05).abs() < 1e-6);
    }

    #[test]
    fn pitch_is_clamped_to_half_pi() {
        let mut look = LookController::new(0.01);
        look.engage();
        for _ in 0..50 {
            look.pointer_moved(0.0, 100.0);
        }
        assert_eq!(look.pitch(), FRAC_PI_2);
        for _ in 0..50 {
            look.pointer_moved(0.0, -100.0);
        }
        assert_eq!(look.pitch(), -FRAC_PI_2);
    }

    #[test]
    fn yaw_is_unbounded() {
        let mut look = LookController::new(0.01);
        look.engage();
        for _ in 0..10 {
            look.pointer_moved(-100.0, 0.0);
        }
        assert!(look.yaw() > std::f32::consts::TAU);
    }

    #[test]
    fn motion_after_capture_loss_is_ignored() {
        let mut look = LookController::new(0.01);
        look.engage();
        look.pointer_moved(10.0, 0.0);
        look.capture_lost();
        look.pointer_moved(10.0, 10.0);
        assert!((look.yaw() + 0.1).abs() < 1e-6);
        assert_eq!(look.pitch(), 0.0);
    }

    #[test]
    fn orientation_applies_yaw_before_pitch() {
        let mut look = LookController::new(1.0);
        look.engage();
        look.pointer_moved(-0.5, 0.25);
        let expected = Quat::from_rotation_y(0.5) * Quat::from_rotation_x(0.25);
        assert!(look.orientation().abs_diff_eq(expected, 1e-6));
    }
}
