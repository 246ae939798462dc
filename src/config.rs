// Loop cadence, topics, and per-device calibration constants.
//
// Calibration constants are fixed at build time and must all be strictly
// positive; wrong values are not detectable at runtime and show up only as
// wrong physical behavior.

use std::time::Duration;

use crate::hardware::registry::{DeviceKind, DeviceMap};

// Control loop frequency
pub const LOOP_HZ: u64 = 50;

// Operator command timeout for the watchdog
pub const CMD_TIMEOUT: Duration = Duration::from_millis(250);

// Zenoh topics
pub const TOPIC_CMD: &str = "ringbot/cmd"; // operator commands
pub const TOPIC_READINESS: &str = "ringbot/state/readiness"; // readiness flags
pub const TOPIC_TELEMETRY: &str = "ringbot/state/telemetry"; // per-tick telemetry
pub const TOPIC_HEALTH: &str = "ringbot/state/health"; // health status

// Serial port for the servo bus
pub const BUS_PORT: &str = "/dev/ttyUSB0";

// Launcher flywheel calibration
pub const LAUNCHER_TARGET_RPM: f64 = 2600.0;
pub const LAUNCHER_COUNTS_PER_REV: f64 = 28.0;
pub const LAUNCHER_RPM_TOLERANCE: f64 = 100.0;

// Arm calibration
pub const ARM_COUNTS_PER_REV: f64 = 288.0;
pub const ARM_EXTEND_DEGREES: f64 = 160.0;
pub const ARM_DEADBAND_COUNTS: i32 = 25;
pub const GRIPPER_CLOSED: f64 = 0.0;

// Drivetrain calibration (consumed by the external localizer)
pub const DRIVE_COUNTS_PER_REV: f64 = 8192.0;
pub const WHEEL_DIAMETER_IN: f64 = 4.0;

/// Bus wiring for the nine required devices.
pub fn device_map() -> DeviceMap {
    DeviceMap::new(&[
        ("front_left", DeviceKind::Motor, 1),
        ("front_right", DeviceKind::Motor, 2),
        ("back_left", DeviceKind::Motor, 3),
        ("back_right", DeviceKind::Motor, 4),
        ("launcher", DeviceKind::Motor, 5),
        ("intake", DeviceKind::Motor, 6),
        ("elevator", DeviceKind::Motor, 7),
        ("arm", DeviceKind::Motor, 8),
        ("gripper_servo", DeviceKind::Servo, 9),
    ])
}
