// Control runtime for a ring-launcher robot: four-wheel omni drivetrain,
// closed-loop flywheel launcher, position-controlled arm with a coupled
// gripper, driven at a fixed cadence from operator commands over zenoh.

pub mod config;
pub mod control;
pub mod hardware;
pub mod messages;
pub mod runtime;
