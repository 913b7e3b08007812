// Differential-drive kinematic model
//
// Pose orientation is stored as a unit vector (cos, sin) instead of an
// angle, so integration never calls trigonometric functions on an
// accumulated heading. Two Jacobians map joint-space wheel deltas to body
// deltas and body deltas to pen-tip deltas; they compose to the full
// joint-to-pen map used by the controller.

use nalgebra::{Matrix2x3, Matrix3x2, Vector2, Vector3};

/// Joint-space sample or delta: (right wheel, left wheel) travel in length
/// units. Only differences between consecutive samples are meaningful.
pub type Q = Vector2<f64>;

/// Planar pose of the drive-axle midpoint.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    pub cos: f64,
    pub sin: f64,
}

impl Pose {
    /// Canonical start pose: axle placed so the pen tip sits at the origin,
    /// heading along +x.
    pub fn start(pen_offset: f64) -> Self {
        Self {
            x: -pen_offset,
            y: 0.0,
            cos: 1.0,
            sin: 0.0,
        }
    }

    /// Integrate a small body-frame delta (dx, dy, dtheta).
    ///
    /// The heading vector is rotated with the angle-sum identities applied
    /// to cos(dtheta), sin(dtheta), then renormalized to hold the
    /// cos^2 + sin^2 = 1 invariant.
    pub fn apply_delta(&mut self, delta: Vector3<f64>) {
        self.x += delta.x;
        self.y += delta.y;

        // cos(a + b) = cos a cos b - sin a sin b
        // sin(a + b) = sin a cos b + cos a sin b
        let (sin_d, cos_d) = delta.z.sin_cos();
        let new_cos = self.cos * cos_d - self.sin * sin_d;
        let new_sin = self.sin * cos_d + self.cos * sin_d;

        let norm = (new_cos * new_cos + new_sin * new_sin).sqrt();
        self.cos = new_cos / norm;
        self.sin = new_sin / norm;
    }

    pub fn position(&self) -> Vector2<f64> {
        Vector2::new(self.x, self.y)
    }

    pub fn heading_norm(&self) -> f64 {
        (self.cos * self.cos + self.sin * self.sin).sqrt()
    }
}

/// Fixed geometry of the drive base.
#[derive(Clone, Copy, Debug)]
pub struct DriveGeometry {
    /// Wheel separation
    pub track_width: f64,

    /// Axle midpoint to pen tip, along the heading
    pub pen_offset: f64,
}

impl DriveGeometry {
    pub fn new(track_width: f64, pen_offset: f64) -> Self {
        Self {
            track_width,
            pen_offset,
        }
    }

    /// Jacobian of the body state (x, y, theta) with respect to the joint
    /// positions (right, left).
    ///
    /// Rows 0/1 project wheel motion onto the heading, each wheel weighted
    /// one half. Row 2 is the limit of atan(dl / track) / dl as the wheel
    /// travel difference goes to zero, i.e. 1 / track_width.
    pub fn state_from_joint(&self, pose: &Pose) -> Matrix3x2<f64> {
        Matrix3x2::new(
            pose.cos / 2.0,
            pose.cos / 2.0,
            pose.sin / 2.0,
            pose.sin / 2.0,
            1.0 / self.track_width,
            -1.0 / self.track_width,
        )
    }

    /// Jacobian of the pen-tip position with respect to the body state:
    /// identity on position, plus the lever arm of the heading column.
    pub fn pen_from_state(&self, pose: &Pose) -> Matrix2x3<f64> {
        Matrix2x3::new(
            1.0,
            0.0,
            -pose.sin * self.pen_offset,
            0.0,
            1.0,
            pose.cos * self.pen_offset,
        )
    }

    /// Forward kinematics of the pen tip.
    pub fn pen_position(&self, pose: &Pose) -> Vector2<f64> {
        Vector2::new(
            pose.x + pose.cos * self.pen_offset,
            pose.y + pose.sin * self.pen_offset,
        )
    }
}
