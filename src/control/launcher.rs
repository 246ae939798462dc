// Closed-loop velocity controller for the flywheel launcher.
//
// Two states, driven by the current intent value on every tick:
// - Idle: commanded rate is zero
// - Spinning: commanded rate is the fixed target RPM in counts/sec
//
// The command is level-triggered and re-asserted each tick rather than
// edge-triggered, so a dropped tick self-corrects on the next one.

use tracing::debug;

use super::actuator::{Result, VelocityActuator};
use super::units;

/// Calibration for one launcher motor. All values strictly positive.
#[derive(Debug, Clone, Copy)]
pub struct LauncherConfig {
    /// Flywheel speed to hold while spinning, in RPM.
    pub target_rpm: f64,
    /// Encoder counts per output-shaft revolution.
    pub counts_per_rev: f64,
    /// Half-width of the readiness band around the target, in RPM.
    pub rpm_tolerance: f64,
}

/// Velocity controller for the launcher flywheel.
pub struct LauncherController<M: VelocityActuator> {
    motor: M,
    config: LauncherConfig,
    spinning: bool,
    measured_rpm: f64,
}

impl<M: VelocityActuator> LauncherController<M> {
    pub fn new(motor: M, config: LauncherConfig) -> Self {
        debug_assert!(config.target_rpm > 0.0);
        debug_assert!(config.counts_per_rev > 0.0);
        debug_assert!(config.rpm_tolerance > 0.0);
        Self {
            motor,
            config,
            spinning: false,
            measured_rpm: 0.0,
        }
    }

    /// Update the spin intent. Idempotent; no hardware write happens here,
    /// the new target is issued on the next [`tick`](Self::tick).
    pub fn set_enabled(&mut self, enabled: bool) {
        self.spinning = enabled;
    }

    /// Run one control step: re-assert the velocity target for the current
    /// state, then read back the measured speed. Exactly one write and one
    /// read per call.
    pub fn tick(&mut self) -> Result<()> {
        let target_cps = if self.spinning {
            units::rpm_to_counts_per_sec(self.config.target_rpm, self.config.counts_per_rev)
        } else {
            0.0
        };
        self.motor.set_velocity(target_cps)?;

        let measured_cps = self.motor.velocity()?;
        self.measured_rpm = units::counts_per_sec_to_rpm(measured_cps, self.config.counts_per_rev);
        debug!(
            target_cps,
            measured_rpm = self.measured_rpm,
            "launcher tick"
        );
        Ok(())
    }

    /// True iff the controller is spinning and the measured speed from the
    /// last tick is within the tolerance band of the target.
    ///
    /// Never true while idle: a flywheel coasting down through the band
    /// right after being disabled must not read as ready.
    pub fn is_ready(&self) -> bool {
        self.spinning
            && (self.measured_rpm - self.config.target_rpm).abs() <= self.config.rpm_tolerance
    }

    /// Measured flywheel speed from the last tick, in RPM.
    pub fn measured_rpm(&self) -> f64 {
        self.measured_rpm
    }
}
