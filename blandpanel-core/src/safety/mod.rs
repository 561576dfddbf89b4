//! Safety interlocks
//!
//! The emergency stop latch gating the actuator power rail.

pub mod estop;

pub use estop::{EstopEvent, EstopState};
