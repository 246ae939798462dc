// Serial-bus hardware backend
//
// Provides:
// - The servo-bus wire protocol
// - A name-to-bus-ID device registry with typed acquisition errors
// - Adapters implementing the control-core actuator traits per device
// - All-or-nothing hardware bring-up

pub mod bus;
pub mod devices;
pub mod driver;
pub mod registry;

pub use bus::{BusError, ServoBus};
pub use driver::{BusRobot, InitError, initialize_hardware};
pub use registry::{DeviceKind, DeviceMap, RegistryError};
