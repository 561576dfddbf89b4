//! Board-agnostic core logic for the shutter and flat panel firmware
//!
//! This crate contains all device logic that does not depend on
//! specific hardware implementations:
//!
//! - Hardware abstraction traits (servo, position sensor, panel, power rail)
//! - Calibration model (angle/pulse and sensor/angle linear maps)
//! - Device controller owning brightness, enable and estop state
//! - Shutter position classification
//! - Emergency stop latch
//! - Configuration type definitions

#![no_std]
#![deny(unsafe_code)]

pub mod calibration;
pub mod config;
pub mod controller;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod safety;
pub mod state;
pub mod traits;
