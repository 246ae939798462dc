// Hardware bring-up: resolve every named device, verify it answers on the
// bus, configure operating modes, and assemble the Robot.
//
// Initialization is all-or-nothing. Every name is resolved and every device
// pinged before the first mode or command write, so a configuration error
// never leaves the robot partially commanded.

use std::sync::{Arc, Mutex};

use tracing::{debug, info};

use crate::config;
use crate::control::actuator::ActuatorError;
use crate::control::units;
use crate::control::{
    ArmConfig, ArmController, DriveBase, LauncherConfig, LauncherController, Robot,
};

use super::bus::{BusError, OperatingMode, ServoBus};
use super::devices::{
    BusPositionActuator, BusPowerActuator, BusServo, BusVelocityActuator, SharedBus,
};
use super::registry::{DeviceKind, DeviceMap, RegistryError};

/// The robot as wired to the serial servo bus.
pub type BusRobot = Robot<BusVelocityActuator, BusPositionActuator, BusServo, BusPowerActuator>;

/// Fatal startup failure. Nothing has been commanded unless initialization
/// got past the configuration checks.
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Bus(#[from] BusError),

    #[error(transparent)]
    Actuator(#[from] ActuatorError),
}

/// Acquire all nine devices, configure them, capture the arm home position,
/// and return the assembled robot.
pub fn initialize_hardware(port: &str, map: &DeviceMap) -> Result<BusRobot, InitError> {
    // Resolve every name first; a missing device aborts before any bus traffic.
    let front_left = map.acquire(DeviceKind::Motor, "front_left")?;
    let front_right = map.acquire(DeviceKind::Motor, "front_right")?;
    let back_left = map.acquire(DeviceKind::Motor, "back_left")?;
    let back_right = map.acquire(DeviceKind::Motor, "back_right")?;
    let launcher = map.acquire(DeviceKind::Motor, "launcher")?;
    let intake = map.acquire(DeviceKind::Motor, "intake")?;
    let elevator = map.acquire(DeviceKind::Motor, "elevator")?;
    let arm = map.acquire(DeviceKind::Motor, "arm")?;
    let gripper = map.acquire(DeviceKind::Servo, "gripper_servo")?;

    info!("Opening servo bus on {}", port);
    let mut bus = ServoBus::open(port)?;

    let named = [
        ("front_left", front_left),
        ("front_right", front_right),
        ("back_left", back_left),
        ("back_right", back_right),
        ("launcher", launcher),
        ("intake", intake),
        ("elevator", elevator),
        ("arm", arm),
        ("gripper_servo", gripper),
    ];
    for (name, id) in named {
        if !bus.ping(id)? {
            return Err(RegistryError::Unresponsive {
                name: name.to_string(),
                id,
            }
            .into());
        }
        debug!("Device '{}' (id {}) responding", name, id);
    }

    // Operating modes. Torque must be off while the mode changes.
    let velocity_motors = [front_left, front_right, back_left, back_right, launcher, intake, elevator];
    for id in velocity_motors {
        bus.disable_torque(id)?;
        bus.set_operating_mode(id, OperatingMode::Velocity)?;
        bus.enable_torque(id)?;
    }
    for id in [arm, gripper] {
        bus.disable_torque(id)?;
        bus.set_operating_mode(id, OperatingMode::Position)?;
        bus.enable_torque(id)?;
    }

    let bus: SharedBus = Arc::new(Mutex::new(bus));

    // The launcher spins reversed relative to its positive encoder direction.
    let launcher = LauncherController::new(
        BusVelocityActuator::new(bus.clone(), "launcher", launcher, true),
        LauncherConfig {
            target_rpm: config::LAUNCHER_TARGET_RPM,
            counts_per_rev: config::LAUNCHER_COUNTS_PER_REV,
            rpm_tolerance: config::LAUNCHER_RPM_TOLERANCE,
        },
    );

    // Captures the power-on home position; the arm must be resting at
    // mechanical home here (calibration precondition).
    let arm = ArmController::new(
        BusPositionActuator::new(bus.clone(), "arm", arm),
        BusServo::new(bus.clone(), "gripper_servo", gripper),
        ArmConfig {
            counts_per_rev: config::ARM_COUNTS_PER_REV,
            extend_degrees: config::ARM_EXTEND_DEGREES,
            deadband_counts: config::ARM_DEADBAND_COUNTS,
            gripper_closed: config::GRIPPER_CLOSED,
        },
    )?;

    // Right-side wheels mirror the left side.
    let drive = DriveBase::new(
        BusPowerActuator::new(bus.clone(), "front_left", front_left, false),
        BusPowerActuator::new(bus.clone(), "front_right", front_right, true),
        BusPowerActuator::new(bus.clone(), "back_left", back_left, false),
        BusPowerActuator::new(bus.clone(), "back_right", back_right, true),
        units::counts_per_inch(config::DRIVE_COUNTS_PER_REV, config::WHEEL_DIAMETER_IN),
    );

    let robot = Robot::new(
        launcher,
        arm,
        drive,
        BusPowerActuator::new(bus.clone(), "intake", intake, false),
        BusPowerActuator::new(bus, "elevator", elevator, false),
    );

    info!(
        counts_per_inch = robot.counts_per_inch(),
        "Hardware initialized, drive calibration published for the localizer"
    );
    Ok(robot)
}
