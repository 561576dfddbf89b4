//! Configuration types
//!
//! Board-agnostic configuration structures. The firmware fills these from
//! its build-time `panel.toml`; `Default` reproduces the reference board.

pub mod device;

pub use device::*;
