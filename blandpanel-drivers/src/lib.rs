//! Hardware driver implementations
//!
//! Concrete implementations of the blandpanel-core hardware traits over
//! `embedded-hal` 1.0:
//!
//! - Hobby servo on a PWM channel
//! - Flat panel brightness on a PWM channel
//! - Actuator power rail on a GPIO enable pin
//! - 12-bit ADC reading widening for the position sensor

#![no_std]
#![deny(unsafe_code)]

pub mod panel;
pub mod rail;
pub mod sensor;
pub mod servo;
