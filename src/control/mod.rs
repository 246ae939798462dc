// Actuator control and readiness core.
//
// Provides:
// - Unit conversions between physical and encoder-native units
// - Closed-loop launcher velocity control with a readiness band
// - Arm position control with a dead-band power policy and gripper coupling
// - The per-tick control loop driver that orders every subsystem
//
// Everything here talks to hardware through the small traits in
// `actuator`, so the control math runs against mocks in tests.

pub mod actuator;
pub mod arm;
pub mod drive;
pub mod launcher;
pub mod robot;
pub mod units;

pub use actuator::{
    ActuatorError, PositionActuator, PowerActuator, ServoOutput, VelocityActuator,
};
pub use arm::{ArmConfig, ArmController};
pub use drive::DriveBase;
pub use launcher::{LauncherConfig, LauncherController};
pub use robot::{NullSink, Robot, TelemetrySink};
