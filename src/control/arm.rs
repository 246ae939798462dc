// Position controller for the rotary arm, with a coupled gripper servo.
//
// The arm's home position is captured once at construction and every target
// is an offset from it. Two target states, re-asserted every tick:
// - Retracted: target = home, gripper forced closed
// - Extended:  target = home + extend offset
//
// Power policy: full drive power while outside the dead-band, zero power
// once inside it, so the motor does not hold torque against a settled load.

use tracing::debug;

use super::actuator::{PositionActuator, Result, ServoOutput};
use super::units;

/// Calibration for the arm joint and its gripper.
#[derive(Debug, Clone, Copy)]
pub struct ArmConfig {
    /// Encoder counts per revolution of the arm's output shaft.
    pub counts_per_rev: f64,
    /// Extension angle from home, in degrees.
    pub extend_degrees: f64,
    /// Dead-band half-width in encoder counts: within this distance of the
    /// target the arm counts as in position and drive power is cut.
    pub deadband_counts: i32,
    /// Gripper servo position for the closed state.
    pub gripper_closed: f64,
}

/// Position controller for the arm joint.
///
/// Precondition: the arm must physically rest at its mechanical home when
/// the controller is constructed. The power-on encoder reading becomes the
/// reference for every later target, and an arm that starts away from home
/// offsets all of them by the same error. This is not detectable at
/// runtime; there is no homing routine.
pub struct ArmController<M: PositionActuator, S: ServoOutput> {
    motor: M,
    gripper: S,
    config: ArmConfig,
    /// Encoder reading captured at construction; basis for all targets.
    home_counts: i32,
    extended: bool,
    target_counts: i32,
    counts_from_target: i32,
}

impl<M: PositionActuator, S: ServoOutput> ArmController<M, S> {
    /// Capture the home position and park the arm there with the gripper
    /// closed. Reads the encoder before issuing any command.
    pub fn new(mut motor: M, mut gripper: S, config: ArmConfig) -> Result<Self> {
        debug_assert!(config.counts_per_rev > 0.0);
        debug_assert!(config.deadband_counts > 0);
        let home_counts = motor.position()?;
        motor.set_target(home_counts)?;
        gripper.set_position(config.gripper_closed)?;
        debug!(home_counts, "arm home position captured");
        Ok(Self {
            motor,
            gripper,
            config,
            home_counts,
            extended: false,
            target_counts: home_counts,
            counts_from_target: 0,
        })
    }

    /// Update the extension intent. Idempotent; takes effect on the next
    /// [`tick`](Self::tick).
    pub fn set_extended(&mut self, extended: bool) {
        self.extended = extended;
    }

    /// Run one control step: re-assert the target for the current state,
    /// read the measured position, and apply the dead-band power policy.
    /// While retracted, the gripper is also forced to its closed position.
    pub fn tick(&mut self) -> Result<()> {
        self.target_counts = if self.extended {
            self.home_counts
                + units::degrees_to_counts(self.config.extend_degrees, self.config.counts_per_rev)
        } else {
            self.gripper.set_position(self.config.gripper_closed)?;
            self.home_counts
        };
        self.motor.set_target(self.target_counts)?;

        let measured = self.motor.position()?;
        self.counts_from_target = (self.target_counts - measured).abs();

        let power = if self.counts_from_target <= self.config.deadband_counts {
            0.0
        } else {
            1.0
        };
        self.motor.set_power(power)?;
        Ok(())
    }

    /// True iff the last tick measured the arm within the dead-band of its
    /// target, whichever target state is active.
    pub fn is_in_position(&self) -> bool {
        self.counts_from_target <= self.config.deadband_counts
    }

    /// Distance from target measured on the last tick, in encoder counts.
    pub fn counts_from_target(&self) -> i32 {
        self.counts_from_target
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockJoint {
        targets: Vec<i32>,
        powers: Vec<f64>,
        measured: i32,
    }

    impl MockJoint {
        fn at(position: i32) -> Self {
            Self {
                targets: Vec::new(),
                powers: Vec::new(),
                measured: position,
            }
        }
    }

    impl PositionActuator for MockJoint {
        fn set_target(&mut self, counts: i32) -> Result<()> {
            self.targets.push(counts);
            Ok(())
        }

        fn position(&mut self) -> Result<i32> {
            Ok(self.measured)
        }

        fn set_power(&mut self, power: f64) -> Result<()> {
            self.powers.push(power);
            Ok(())
        }
    }

    #[derive(Default)]
    struct MockGripper {
        positions: Vec<f64>,
    }

    impl ServoOutput for MockGripper {
        fn set_position(&mut self, position: f64) -> Result<()> {
            self.positions.push(position);
            Ok(())
        }
    }

    fn test_config() -> ArmConfig {
        ArmConfig {
            counts_per_rev: 288.0,
            extend_degrees: 160.0,
            deadband_counts: 25,
            gripper_closed: 0.0,
        }
    }

    fn arm_at(position: i32) -> ArmController<MockJoint, MockGripper> {
        ArmController::new(MockJoint::at(position), MockGripper::default(), test_config()).unwrap()
    }

    #[test]
    fn test_home_captured_before_any_command() {
        let arm = arm_at(500);
        assert_eq!(arm.home_counts, 500);
        // The only command issued at construction parks the arm at home.
        assert_eq!(arm.motor.targets, vec![500]);
    }

    #[test]
    fn test_extended_target_is_home_plus_offset() {
        // home 500 + 160 degrees at 288 counts/rev = 500 + 128 = 628
        let mut arm = arm_at(500);
        arm.set_extended(true);
        arm.tick().unwrap();
        assert_eq!(*arm.motor.targets.last().unwrap(), 628);
    }

    #[test]
    fn test_retracted_target_is_home() {
        let mut arm = arm_at(500);
        arm.set_extended(true);
        arm.tick().unwrap();
        arm.set_extended(false);
        arm.tick().unwrap();
        assert_eq!(*arm.motor.targets.last().unwrap(), 500);
    }

    #[test]
    fn test_deadband_boundary() {
        // dead-band 25, target 1000, measured 975: distance 25, in position
        let mut arm = arm_at(1000);
        arm.motor.measured = 975;
        arm.tick().unwrap();
        assert!(arm.is_in_position());
        assert_eq!(*arm.motor.powers.last().unwrap(), 0.0);

        // measured 974: distance 26, out of position, full power
        arm.motor.measured = 974;
        arm.tick().unwrap();
        assert!(!arm.is_in_position());
        assert_eq!(*arm.motor.powers.last().unwrap(), 1.0);
    }

    #[test]
    fn test_full_power_outside_deadband() {
        let mut arm = arm_at(500);
        arm.set_extended(true); // target jumps 128 counts away
        arm.tick().unwrap();
        assert_eq!(*arm.motor.powers.last().unwrap(), 1.0);
        assert!(!arm.is_in_position());
    }

    #[test]
    fn test_in_position_at_both_targets() {
        let mut arm = arm_at(500);

        // Settled at retracted.
        arm.tick().unwrap();
        assert!(arm.is_in_position());

        // Settled at extended.
        arm.set_extended(true);
        arm.motor.measured = 628;
        arm.tick().unwrap();
        assert!(arm.is_in_position());
    }

    #[test]
    fn test_gripper_forced_closed_while_retracted() {
        let mut arm = arm_at(500);
        let writes_after_init = arm.gripper.positions.len();

        // Extended ticks leave the gripper alone.
        arm.set_extended(true);
        arm.tick().unwrap();
        assert_eq!(arm.gripper.positions.len(), writes_after_init);

        // Every retracted tick re-asserts the closed position.
        arm.set_extended(false);
        arm.tick().unwrap();
        arm.tick().unwrap();
        assert_eq!(arm.gripper.positions.len(), writes_after_init + 2);
        assert!(arm.gripper.positions.iter().all(|&p| p == 0.0));
    }

    #[test]
    fn test_target_reasserted_every_tick() {
        let mut arm = arm_at(500);
        for _ in 0..4 {
            arm.tick().unwrap();
        }
        // One target write at construction plus one per tick.
        assert_eq!(arm.motor.targets.len(), 5);
        assert_eq!(arm.motor.powers.len(), 4);
    }
}
