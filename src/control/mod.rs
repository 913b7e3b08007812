// Closed-loop control for the differential-drive base
//
// Provides:
// - Differential-drive kinematics and the joint/pen Jacobians
// - Dead-reckoning pose estimation from cumulative wheel samples
// - Inverse-kinematics setpoint control of the pen tip

mod controller;
mod estimator;
pub mod kinematics;

pub use controller::Controller;
pub use estimator::Estimator;
pub use kinematics::{DriveGeometry, Pose, Q};
