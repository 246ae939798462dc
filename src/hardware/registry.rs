// Device registry: maps stable device names to bus IDs.
//
// Initialization acquires every required device by name before any command
// is issued; a missing or mis-typed name is a configuration error that
// aborts startup. No partial-hardware operation is attempted.

use std::collections::HashMap;

/// What kind of device a name refers to. Acquiring a name as the wrong kind
/// is a configuration error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceKind {
    Motor,
    Servo,
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("device not found: no '{name}' in the device map")]
    DeviceNotFound { name: String },

    #[error("device '{name}' is mapped as {found:?}, expected {expected:?}")]
    KindMismatch {
        name: String,
        expected: DeviceKind,
        found: DeviceKind,
    },

    #[error("device '{name}' (bus id {id}) did not respond to ping")]
    Unresponsive { name: String, id: u8 },
}

/// Name-to-bus-ID wiring for one robot. Built once from config, immutable
/// afterwards.
pub struct DeviceMap {
    entries: HashMap<String, (DeviceKind, u8)>,
}

impl DeviceMap {
    pub fn new(entries: &[(&str, DeviceKind, u8)]) -> Self {
        Self {
            entries: entries
                .iter()
                .map(|&(name, kind, id)| (name.to_string(), (kind, id)))
                .collect(),
        }
    }

    /// Resolve a device name to its bus ID, checking the kind.
    pub fn acquire(&self, kind: DeviceKind, name: &str) -> Result<u8, RegistryError> {
        match self.entries.get(name) {
            None => Err(RegistryError::DeviceNotFound {
                name: name.to_string(),
            }),
            Some(&(found, _)) if found != kind => Err(RegistryError::KindMismatch {
                name: name.to_string(),
                expected: kind,
                found,
            }),
            Some(&(_, id)) => Ok(id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map() -> DeviceMap {
        DeviceMap::new(&[
            ("launcher", DeviceKind::Motor, 5),
            ("gripper_servo", DeviceKind::Servo, 9),
        ])
    }

    #[test]
    fn test_acquire_known_device() {
        assert_eq!(map().acquire(DeviceKind::Motor, "launcher").unwrap(), 5);
    }

    #[test]
    fn test_unknown_name_is_not_found() {
        let err = map().acquire(DeviceKind::Motor, "launcherr").unwrap_err();
        assert!(matches!(err, RegistryError::DeviceNotFound { .. }));
    }

    #[test]
    fn test_wrong_kind_is_rejected() {
        let err = map().acquire(DeviceKind::Motor, "gripper_servo").unwrap_err();
        assert!(matches!(
            err,
            RegistryError::KindMismatch {
                expected: DeviceKind::Motor,
                found: DeviceKind::Servo,
                ..
            }
        ));
    }
}
