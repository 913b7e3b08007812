// Dead-reckoning pose estimation from cumulative wheel samples

use nalgebra::Vector2;
use tracing::debug;

use super::kinematics::{DriveGeometry, Pose, Q};

/// Integrates joint-position deltas into a pose estimate.
///
/// First-order (Euler) integration: the state Jacobian is evaluated at the
/// current pose and applied to the delta since the previous sample. Valid
/// because per-tick wheel deltas are small; drift is the accepted error
/// source, bounded by heading renormalization on every update.
pub struct Estimator {
    geometry: DriveGeometry,
    pose: Pose,
    q_prev: Q,
}

impl Estimator {
    pub fn new(geometry: DriveGeometry) -> Self {
        Self {
            geometry,
            pose: Pose::start(geometry.pen_offset),
            q_prev: Q::zeros(),
        }
    }

    /// Fold a new cumulative joint sample into the pose.
    pub fn update(&mut self, q: Q) {
        let jacobian = self.geometry.state_from_joint(&self.pose);
        let dq = q - self.q_prev;
        let dstate = jacobian * dq;
        self.pose.apply_delta(dstate);

        debug!(
            "estimator: dq=({:.3}, {:.3}) dstate=({:.3}, {:.3}, {:.4})",
            dq.x, dq.y, dstate.x, dstate.y, dstate.z
        );

        self.q_prev = q;
    }

    pub fn pose(&self) -> &Pose {
        &self.pose
    }

    pub fn pen_position(&self) -> Vector2<f64> {
        self.geometry.pen_position(&self.pose)
    }

    /// Return the pose to the canonical start.
    ///
    /// The previous joint sample is intentionally kept: the wheels have not
    /// moved, and clearing it would inject a spurious encoder discontinuity
    /// on the next update.
    pub fn reset(&mut self) {
        self.pose = Pose::start(self.geometry.pen_offset);
    }

    pub fn status(&self) -> String {
        let pen = self.pen_position();
        format!(
            "estimator: state ({:.3}, {:.3}) angle [{:.3}, {:.3}] - pen ({:.3}, {:.3}), q_prev ({:.3}, {:.3})",
            self.pose.x, self.pose.y, self.pose.cos, self.pose.sin, pen.x, pen.y, self.q_prev.x, self.q_prev.y
        )
    }
}
