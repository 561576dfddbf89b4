//! Hardware abstraction traits
//!
//! These traits define the interface between the device controller
//! and board-specific implementations.

pub mod actuator;
pub mod sensor;

pub use actuator::{ActuatorError, PanelOutput, PowerRail, ServoActuator};
pub use sensor::{PositionSensor, SensorError};
