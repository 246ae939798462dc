// Trait seams between the control core and physical devices.
//
// Controllers only ever talk to these traits, so the control math can be
// exercised in tests with in-process mocks and the bus-servo backend can be
// swapped without touching the per-tick logic.

/// Fault raised by an actuator backend during a hardware read or write.
///
/// A control tick has no recovery path: the runtime treats any `ActuatorError`
/// as fatal to the session, since a loop that fails mid-tick would leave an
/// actuator holding an undefined command.
#[derive(Debug, thiserror::Error)]
#[error("actuator '{device}' fault: {details}")]
pub struct ActuatorError {
    pub device: String,
    pub details: String,
}

impl ActuatorError {
    pub fn new(device: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            details: details.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ActuatorError>;

/// A motor driven in closed-loop velocity mode, with encoder feedback.
///
/// Units are the device's native rate (encoder counts per second); callers
/// convert to and from physical units via [`crate::control::units`].
pub trait VelocityActuator {
    /// Command a target velocity in counts per second.
    fn set_velocity(&mut self, counts_per_sec: f64) -> Result<()>;

    /// Read the measured velocity in counts per second.
    fn velocity(&mut self) -> Result<f64>;
}

/// A motor driven in closed-loop position mode, with a separately
/// commanded drive power.
pub trait PositionActuator {
    /// Command a target position in encoder counts.
    fn set_target(&mut self, counts: i32) -> Result<()>;

    /// Read the measured position in encoder counts.
    fn position(&mut self) -> Result<i32>;

    /// Command the drive power used to chase the target, in `[0.0, 1.0]`.
    fn set_power(&mut self, power: f64) -> Result<()>;
}

/// A motor driven open-loop by a signed power in `[-1.0, 1.0]`.
///
/// Direction inversion (mirrored drivetrain sides) is a construction-time
/// property of the implementation, not something callers compensate for.
pub trait PowerActuator {
    fn set_power(&mut self, power: f64) -> Result<()>;
}

/// A positional servo output with no feedback, commanded in `[0.0, 1.0]`.
pub trait ServoOutput {
    fn set_position(&mut self, position: f64) -> Result<()>;
}
