// Bus-backed implementations of the control-core actuator traits.
//
// All adapters share one serial bus behind a mutex; the control loop is the
// only task touching it, the lock just keeps the adapters independently
// ownable. Direction inversion for mirrored devices is fixed here at
// construction so controllers never compensate for wiring.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::control::actuator::{
    ActuatorError, PositionActuator, PowerActuator, Result, ServoOutput, VelocityActuator,
};

use super::bus::{BusError, ServoBus};

/// Serial bus handle shared by every device adapter.
pub type SharedBus = Arc<Mutex<ServoBus>>;

/// Full-scale raw velocity for open-loop power commands.
const POWER_FULL_SCALE: i16 = 3000;

/// Servo position register full-scale (12-bit).
const SERVO_FULL_SCALE: f64 = 4095.0;

fn lock(bus: &SharedBus) -> MutexGuard<'_, ServoBus> {
    // A poisoned bus mutex means the session is already lost; keep the guard.
    bus.lock().unwrap_or_else(PoisonError::into_inner)
}

fn fault(device: &str, err: BusError) -> ActuatorError {
    ActuatorError::new(device, err.to_string())
}

/// Closed-loop velocity device (launcher flywheel).
pub struct BusVelocityActuator {
    bus: SharedBus,
    name: String,
    id: u8,
    inverted: bool,
}

impl BusVelocityActuator {
    pub fn new(bus: SharedBus, name: impl Into<String>, id: u8, inverted: bool) -> Self {
        Self {
            bus,
            name: name.into(),
            id,
            inverted,
        }
    }
}

impl VelocityActuator for BusVelocityActuator {
    fn set_velocity(&mut self, counts_per_sec: f64) -> Result<()> {
        let sign = if self.inverted { -1.0 } else { 1.0 };
        let raw = (counts_per_sec * sign)
            .round()
            .clamp(i16::MIN as f64, i16::MAX as f64) as i16;
        lock(&self.bus)
            .set_velocity(self.id, raw)
            .map_err(|e| fault(&self.name, e))
    }

    fn velocity(&mut self) -> Result<f64> {
        let raw = lock(&self.bus)
            .get_velocity(self.id)
            .map_err(|e| fault(&self.name, e))?;
        let sign = if self.inverted { -1.0 } else { 1.0 };
        Ok(raw as f64 * sign)
    }
}

/// Closed-loop position device (arm joint). Power maps to the torque limit
/// so zero power releases the joint without losing the position target.
pub struct BusPositionActuator {
    bus: SharedBus,
    name: String,
    id: u8,
}

impl BusPositionActuator {
    pub fn new(bus: SharedBus, name: impl Into<String>, id: u8) -> Self {
        Self {
            bus,
            name: name.into(),
            id,
        }
    }
}

impl PositionActuator for BusPositionActuator {
    fn set_target(&mut self, counts: i32) -> Result<()> {
        let raw = counts.clamp(0, u16::MAX as i32) as u16;
        lock(&self.bus)
            .set_goal_position(self.id, raw)
            .map_err(|e| fault(&self.name, e))
    }

    fn position(&mut self) -> Result<i32> {
        lock(&self.bus)
            .get_position(self.id)
            .map(|raw| raw as i32)
            .map_err(|e| fault(&self.name, e))
    }

    fn set_power(&mut self, power: f64) -> Result<()> {
        lock(&self.bus)
            .set_torque_limit(self.id, power)
            .map_err(|e| fault(&self.name, e))
    }
}

/// Open-loop power device (drive wheels, intake, elevator): power is scaled
/// onto the raw velocity register.
pub struct BusPowerActuator {
    bus: SharedBus,
    name: String,
    id: u8,
    inverted: bool,
}

impl BusPowerActuator {
    pub fn new(bus: SharedBus, name: impl Into<String>, id: u8, inverted: bool) -> Self {
        Self {
            bus,
            name: name.into(),
            id,
            inverted,
        }
    }
}

impl PowerActuator for BusPowerActuator {
    fn set_power(&mut self, power: f64) -> Result<()> {
        let sign = if self.inverted { -1.0 } else { 1.0 };
        let raw = (power.clamp(-1.0, 1.0) * sign * POWER_FULL_SCALE as f64).round() as i16;
        lock(&self.bus)
            .set_velocity(self.id, raw)
            .map_err(|e| fault(&self.name, e))
    }
}

/// Positional servo with no feedback (gripper).
pub struct BusServo {
    bus: SharedBus,
    name: String,
    id: u8,
}

impl BusServo {
    pub fn new(bus: SharedBus, name: impl Into<String>, id: u8) -> Self {
        Self {
            bus,
            name: name.into(),
            id,
        }
    }
}

impl ServoOutput for BusServo {
    fn set_position(&mut self, position: f64) -> Result<()> {
        let raw = (position.clamp(0.0, 1.0) * SERVO_FULL_SCALE).round() as u16;
        lock(&self.bus)
            .set_goal_position(self.id, raw)
            .map_err(|e| fault(&self.name, e))
    }
}
