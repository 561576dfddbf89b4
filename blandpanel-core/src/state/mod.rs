//! Shutter state definitions
//!
//! Shutter position is never stored. It is a projection of a fresh
//! sensor read, classified against the reference angles.

pub mod shutter;

pub use shutter::{ShutterPosition, TargetState};
