// Control runtime for a two-wheeled differential-drive drawing robot.
//
// The pipeline: a G-code program is parsed into a bounded instruction
// sequence, the program player walks it one tick at a time, feeding pen-tip
// setpoints to the inverse-kinematics controller, while the estimator
// dead-reckons the robot pose from cumulative wheel-encoder samples.

pub mod actuator;
pub mod command;
pub mod config;
pub mod control;
pub mod program;
pub mod runtime;
