// Message types crossing the zenoh boundary.

use serde::{Deserialize, Serialize};

/// Command from teleop/autonomous -> runtime.
///
/// Last-write-wins: the runtime drains pending commands each tick and acts
/// on the newest. The default is the all-safe command (everything off, arm
/// retracted), which is also what the watchdog decays to.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OperatorCommand {
    /// Signed forward drive power, -1.0..=1.0
    pub drive_power: f64,
    /// Signed intake power, -1.0..=1.0
    pub intake_power: f64,
    /// Signed elevator power, -1.0..=1.0
    pub elevator_power: f64,
    /// Spin the launcher up to its target RPM
    pub spin_launcher: bool,
    /// Extend the arm (gripper is forced closed while retracted)
    pub extend_arm: bool,
}

/// Readiness flags published by the runtime after each tick, for the
/// operator layer to gate firing on. Reflects the most recent completed
/// tick; a single out-of-band sensor reading may make these flicker, poll
/// rather than latch.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ReadinessReport {
    pub can_fire: bool,
    pub arm_in_position: bool,
    pub launcher_rpm: f64,
}

/// Health status published by the runtime.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum RuntimeHealth {
    Ok,
    CmdStale,
}
