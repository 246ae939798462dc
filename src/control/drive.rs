// Four-wheel omni drivetrain adapter.
//
// Static wiring, no feedback loop: the right-side pair is direction-inverted
// at device construction, so writing the same signed power to all four
// wheels produces symmetric forward motion. The adapter also carries the
// encoder counts-per-inch scalar consumed by the pose/localizer collaborator.

use super::actuator::{PowerActuator, Result};

/// Four power actuators plus the distance calibration scalar.
/// Configuration is immutable after construction.
pub struct DriveBase<M: PowerActuator> {
    front_left: M,
    front_right: M,
    back_left: M,
    back_right: M,
    counts_per_inch: f64,
}

impl<M: PowerActuator> DriveBase<M> {
    pub fn new(
        front_left: M,
        front_right: M,
        back_left: M,
        back_right: M,
        counts_per_inch: f64,
    ) -> Self {
        debug_assert!(counts_per_inch > 0.0);
        Self {
            front_left,
            front_right,
            back_left,
            back_right,
            counts_per_inch,
        }
    }

    /// Apply one signed forward power to all four wheels. Mirroring of the
    /// right side happens in the actuators, not here.
    pub fn drive(&mut self, power: f64) -> Result<()> {
        self.front_left.set_power(power)?;
        self.front_right.set_power(power)?;
        self.back_left.set_power(power)?;
        self.back_right.set_power(power)?;
        Ok(())
    }

    /// Stop all four wheels.
    pub fn stop(&mut self) -> Result<()> {
        self.drive(0.0)
    }

    /// Encoder counts per inch of travel, for the pose collaborator.
    pub fn counts_per_inch(&self) -> f64 {
        self.counts_per_inch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct MockWheel {
        powers: Vec<f64>,
    }

    impl PowerActuator for MockWheel {
        fn set_power(&mut self, power: f64) -> Result<()> {
            self.powers.push(power);
            Ok(())
        }
    }

    fn base() -> DriveBase<MockWheel> {
        DriveBase::new(
            MockWheel::default(),
            MockWheel::default(),
            MockWheel::default(),
            MockWheel::default(),
            651.9,
        )
    }

    #[test]
    fn test_drive_writes_all_four_wheels() {
        let mut drive = base();
        drive.drive(0.4).unwrap();
        assert_eq!(drive.front_left.powers, vec![0.4]);
        assert_eq!(drive.front_right.powers, vec![0.4]);
        assert_eq!(drive.back_left.powers, vec![0.4]);
        assert_eq!(drive.back_right.powers, vec![0.4]);
    }

    #[test]
    fn test_stop_zeroes_all_wheels() {
        let mut drive = base();
        drive.drive(0.8).unwrap();
        drive.stop().unwrap();
        assert_eq!(*drive.front_left.powers.last().unwrap(), 0.0);
        assert_eq!(*drive.back_right.powers.last().unwrap(), 0.0);
    }

    #[test]
    fn test_counts_per_inch_exposed() {
        assert!((base().counts_per_inch() - 651.9).abs() < 1e-9);
    }
}
