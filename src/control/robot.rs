// Control loop driver: runs every subsystem once per tick in a fixed order.
//
// The order is total and deterministic: arm, launcher, drive, intake,
// elevator, then telemetry. No step is ever skipped, because a skipped
// re-assertion would leave an actuator holding a stale target indefinitely.

use super::actuator::{PositionActuator, PowerActuator, Result, ServoOutput, VelocityActuator};
use super::arm::ArmController;
use super::drive::DriveBase;
use super::launcher::LauncherController;

/// Per-tick telemetry consumer. Fire-and-forget: implementations must not
/// fail and must not block the loop; delivery is best-effort.
pub trait TelemetrySink {
    fn put(&mut self, label: &str, value: String);
}

/// Sink that drops everything, for callers that don't publish telemetry.
pub struct NullSink;

impl TelemetrySink for NullSink {
    fn put(&mut self, _label: &str, _value: String) {}
}

/// The robot's actuator subsystems plus the operator intents read each tick.
///
/// Intent setters only record the new value; all hardware writes happen in
/// [`tick`](Self::tick), and readiness queries reflect the most recent
/// completed tick.
pub struct Robot<V, P, S, D>
where
    V: VelocityActuator,
    P: PositionActuator,
    S: ServoOutput,
    D: PowerActuator,
{
    launcher: LauncherController<V>,
    arm: ArmController<P, S>,
    drive: DriveBase<D>,
    intake: D,
    elevator: D,
    drive_power: f64,
    intake_power: f64,
    elevator_power: f64,
}

impl<V, P, S, D> Robot<V, P, S, D>
where
    V: VelocityActuator,
    P: PositionActuator,
    S: ServoOutput,
    D: PowerActuator,
{
    pub fn new(
        launcher: LauncherController<V>,
        arm: ArmController<P, S>,
        drive: DriveBase<D>,
        intake: D,
        elevator: D,
    ) -> Self {
        Self {
            launcher,
            arm,
            drive,
            intake,
            elevator,
            drive_power: 0.0,
            intake_power: 0.0,
            elevator_power: 0.0,
        }
    }

    // --- intent setters (idempotent, applied on the next tick) ---

    pub fn set_launcher_enabled(&mut self, enabled: bool) {
        self.launcher.set_enabled(enabled);
    }

    pub fn set_arm_extended(&mut self, extended: bool) {
        self.arm.set_extended(extended);
    }

    pub fn set_drive_power(&mut self, power: f64) {
        self.drive_power = power.clamp(-1.0, 1.0);
    }

    pub fn set_intake_power(&mut self, power: f64) {
        self.intake_power = power.clamp(-1.0, 1.0);
    }

    pub fn set_elevator_power(&mut self, power: f64) {
        self.elevator_power = power.clamp(-1.0, 1.0);
    }

    // --- readiness queries (state of the last completed tick) ---

    /// True iff the launcher is spinning within its tolerance band.
    pub fn can_fire(&self) -> bool {
        self.launcher.is_ready()
    }

    /// True iff the arm settled within the dead-band of its current target.
    pub fn is_arm_in_position(&self) -> bool {
        self.arm.is_in_position()
    }

    /// Measured flywheel speed from the last tick, in RPM.
    pub fn launcher_rpm(&self) -> f64 {
        self.launcher.measured_rpm()
    }

    pub fn counts_per_inch(&self) -> f64 {
        self.drive.counts_per_inch()
    }

    /// Run one control tick. Issues exactly one position command, one
    /// velocity command, and the open-loop powers, then publishes telemetry.
    ///
    /// Any hardware fault is fatal to the session; there is no partial-tick
    /// recovery.
    pub fn tick(&mut self, telemetry: &mut impl TelemetrySink) -> Result<()> {
        self.arm.tick()?;
        self.launcher.tick()?;
        self.drive.drive(self.drive_power)?;
        self.intake.set_power(self.intake_power)?;
        self.elevator.set_power(self.elevator_power)?;

        telemetry.put("launcher_rpm", format!("{:.1}", self.launcher.measured_rpm()));
        telemetry.put("launcher_ready", self.launcher.is_ready().to_string());
        telemetry.put(
            "arm_counts_from_target",
            self.arm.counts_from_target().to_string(),
        );
        telemetry.put("arm_in_position", self.arm.is_in_position().to_string());
        Ok(())
    }
}
