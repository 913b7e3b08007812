// Inverse-kinematics setpoint control of the pen tip

use nalgebra::{Matrix2, Vector2};
use tracing::{debug, warn};

use super::kinematics::{DriveGeometry, Pose, Q};

/// Drives the pen tip toward a 2D target position.
///
/// Each action composes the two kinematic Jacobians into the square
/// joint-to-pen map, inverts it, and applies the inverse to the pen error,
/// clamping the resulting wheel delta to a maximum step.
pub struct Controller {
    geometry: DriveGeometry,
    setpoint: Vector2<f64>,
}

impl Controller {
    pub fn new(geometry: DriveGeometry) -> Self {
        Self {
            geometry,
            setpoint: Vector2::zeros(),
        }
    }

    /// True when the pen tip is within `tolerance` of the setpoint.
    pub fn at_target(&self, pose: &Pose, tolerance: f64) -> bool {
        (self.setpoint - self.geometry.pen_position(pose)).norm() < tolerance
    }

    /// Compute the wheel delta that moves the pen toward the setpoint.
    ///
    /// Returns `None` when the joint-to-pen map is singular (degenerate
    /// heading alignment); the caller skips the tick and retries on the
    /// next sample.
    pub fn action(&self, pose: &Pose, max_step: f64) -> Option<Q> {
        let pen_from_joint: Matrix2<f64> =
            self.geometry.pen_from_state(pose) * self.geometry.state_from_joint(pose);
        let Some(joint_from_pen) = pen_from_joint.try_inverse() else {
            warn!("controller: joint-to-pen map is singular, skipping tick");
            return None;
        };

        let error = self.setpoint - self.geometry.pen_position(pose);
        let dq = joint_from_pen * error;

        // Clamp the norm, preserving direction.
        let dq_norm = dq.norm();
        let dq_cmd = if dq_norm > max_step {
            dq * (max_step / dq_norm)
        } else {
            dq
        };

        debug!(
            "controller: error=({:.3}, {:.3}) dq=({:.2}, {:.2}) cmd=({:.2}, {:.2})",
            error.x, error.y, dq.x, dq.y, dq_cmd.x, dq_cmd.y
        );

        Some(dq_cmd)
    }

    pub fn target(&self) -> Vector2<f64> {
        self.setpoint
    }

    pub fn set_target(&mut self, setpoint: Vector2<f64>) {
        self.setpoint = setpoint;
    }

    pub fn reset(&mut self) {
        self.setpoint = Vector2::zeros();
    }

    pub fn status(&self) -> String {
        format!(
            "controller: setpoint ({:.3}, {:.3})",
            self.setpoint.x, self.setpoint.y
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> Controller {
        Controller::new(DriveGeometry::new(117.0, 125.0))
    }

    #[test]
    fn at_target_uses_pen_position() {
        let ctl = controller();
        let pose = Pose::start(125.0);
        // Pen starts at the origin, which is the default setpoint.
        assert!(ctl.at_target(&pose, 1.0));
        assert!(!ctl.at_target(&pose, 0.0));
    }

    #[test]
    fn forward_error_drives_both_wheels_forward() {
        let mut ctl = controller();
        let pose = Pose::start(125.0);
        ctl.set_target(Vector2::new(2.0, 0.0));
        let dq = ctl.action(&pose, 5.0).unwrap();
        assert!((dq.x - 2.0).abs() < 1e-9);
        assert!((dq.y - 2.0).abs() < 1e-9);
    }

    #[test]
    fn action_clamps_norm_to_max_step() {
        let mut ctl = controller();
        let pose = Pose::start(125.0);
        ctl.set_target(Vector2::new(1000.0, 0.0));
        let dq = ctl.action(&pose, 5.0).unwrap();
        assert!((dq.norm() - 5.0).abs() < 1e-9);
        // Direction preserved: both wheels equal and positive.
        assert!(dq.x > 0.0);
        assert!((dq.x - dq.y).abs() < 1e-9);
    }

    #[test]
    fn singular_map_skips_the_tick() {
        // Zero pen offset collapses the map's rotation column; heading
        // error becomes unobservable and the inverse must not panic.
        let mut ctl = Controller::new(DriveGeometry::new(117.0, 0.0));
        let pose = Pose::start(0.0);
        ctl.set_target(Vector2::new(0.0, 5.0));
        assert!(ctl.action(&pose, 5.0).is_none());
    }

    #[test]
    fn reset_returns_target_to_zero() {
        let mut ctl = controller();
        ctl.set_target(Vector2::new(3.0, 4.0));
        ctl.reset();
        assert_eq!(ctl.target(), Vector2::zeros());
    }
}
