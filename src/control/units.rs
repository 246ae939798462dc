// Unit conversions between physical units and encoder-native units.
// All functions are pure; calibration constants are passed in by the caller.
//
// Precondition for every function here: the counts-per-revolution constant
// is strictly positive. A zero constant is a mis-calibration, not a runtime
// condition, so it is only debug-asserted.

use std::f64::consts::PI;

/// Convert a speed in revolutions per minute to encoder counts per second.
pub fn rpm_to_counts_per_sec(rpm: f64, counts_per_rev: f64) -> f64 {
    debug_assert!(counts_per_rev > 0.0);
    rpm * counts_per_rev / 60.0
}

/// Convert a speed in encoder counts per second to revolutions per minute.
///
/// Exact inverse of [`rpm_to_counts_per_sec`] up to floating-point rounding.
pub fn counts_per_sec_to_rpm(counts_per_sec: f64, counts_per_rev: f64) -> f64 {
    debug_assert!(counts_per_rev > 0.0);
    counts_per_sec * 60.0 / counts_per_rev
}

/// Convert an angle in degrees to encoder counts, rounded to the nearest count.
pub fn degrees_to_counts(degrees: f64, counts_per_rev: f64) -> i32 {
    debug_assert!(counts_per_rev > 0.0);
    (degrees * counts_per_rev / 360.0).round() as i32
}

/// Encoder counts per inch of travel for a wheel of the given diameter.
///
/// Consumed by the external pose/localizer collaborator; the control core
/// itself never integrates distance.
pub fn counts_per_inch(counts_per_rev: f64, wheel_diameter_in: f64) -> f64 {
    debug_assert!(counts_per_rev > 0.0 && wheel_diameter_in > 0.0);
    counts_per_rev / (PI * wheel_diameter_in)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_launcher_target_rate() {
        // 2600 RPM at 28 counts/rev = 2600 * 28 / 60 counts/sec
        let cps = rpm_to_counts_per_sec(2600.0, 28.0);
        assert!((cps - 1213.333_333_333_333_3).abs() < 1e-9);
    }

    #[test]
    fn test_rpm_round_trip() {
        for rpm in [1.0, 42.5, 2600.0, 6000.0, 123_456.789] {
            let back = counts_per_sec_to_rpm(rpm_to_counts_per_sec(rpm, 28.0), 28.0);
            assert!(
                (back - rpm).abs() <= rpm * f64::EPSILON * 4.0,
                "round trip drifted: {} -> {}",
                rpm,
                back
            );
        }
    }

    #[test]
    fn test_arm_extension_counts() {
        // 160 degrees at 288 counts/rev is exactly 128 counts
        assert_eq!(degrees_to_counts(160.0, 288.0), 128);
    }

    #[test]
    fn test_degrees_rounds_to_nearest() {
        // 1 degree at 288 counts/rev = 0.8 counts, rounds up
        assert_eq!(degrees_to_counts(1.0, 288.0), 1);
        // 0.5 degrees = 0.4 counts, rounds down
        assert_eq!(degrees_to_counts(0.5, 288.0), 0);
    }

    #[test]
    fn test_counts_per_inch() {
        // 8192 counts/rev on a 4.0 inch wheel
        let cpi = counts_per_inch(8192.0, 4.0);
        assert!((cpi - 8192.0 / (PI * 4.0)).abs() < 1e-9);
        assert!((cpi - 651.898_6).abs() < 1e-3);
    }
}
