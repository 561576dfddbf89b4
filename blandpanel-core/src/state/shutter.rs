//! Shutter position classification
//!
//! A measured angle is `Closed` when within tolerance of 0°, `Opened`
//! when within tolerance of 270°, and `Intermediate` otherwise.

use crate::calibration::{CLOSED_REFERENCE_DEG, OPENED_REFERENCE_DEG};

/// Classified shutter position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ShutterPosition {
    /// Within tolerance of the fully-open reference angle
    Opened,
    /// Within tolerance of the closed reference angle
    Closed,
    /// Anywhere else, including travel and stalls
    Intermediate,
}

impl ShutterPosition {
    /// Classify a measured angle
    ///
    /// Bounds are exclusive: an angle exactly `tolerance` away from a
    /// reference is `Intermediate`.
    pub fn classify(angle: f32, tolerance: f32) -> Self {
        if within(angle, CLOSED_REFERENCE_DEG, tolerance) {
            ShutterPosition::Closed
        } else if within(angle, OPENED_REFERENCE_DEG, tolerance) {
            ShutterPosition::Opened
        } else {
            ShutterPosition::Intermediate
        }
    }

    /// Upper-case wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            ShutterPosition::Opened => "OPENED",
            ShutterPosition::Closed => "CLOSED",
            ShutterPosition::Intermediate => "INTERMEDIATE",
        }
    }
}

impl core::fmt::Display for ShutterPosition {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Positions the shutter can be commanded to
///
/// `Intermediate` cannot be commanded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TargetState {
    /// Drive to 270°
    Opened,
    /// Drive to 0°
    Closed,
}

impl TargetState {
    /// Parse a target name (case-insensitive)
    ///
    /// Accepts `OPEN`/`OPENED` and `CLOSE`/`CLOSED`.
    pub fn from_name(name: &str) -> Option<Self> {
        if name.eq_ignore_ascii_case("OPENED") || name.eq_ignore_ascii_case("OPEN") {
            Some(TargetState::Opened)
        } else if name.eq_ignore_ascii_case("CLOSED") || name.eq_ignore_ascii_case("CLOSE") {
            Some(TargetState::Closed)
        } else {
            None
        }
    }

    /// Canonical angle for this target (degrees)
    pub fn angle(&self) -> f32 {
        match self {
            TargetState::Opened => OPENED_REFERENCE_DEG,
            TargetState::Closed => CLOSED_REFERENCE_DEG,
        }
    }

    /// Position reported once this target has been reached
    pub fn position(&self) -> ShutterPosition {
        match self {
            TargetState::Opened => ShutterPosition::Opened,
            TargetState::Closed => ShutterPosition::Closed,
        }
    }
}

impl core::fmt::Display for TargetState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.position().as_str())
    }
}

/// `|a - b| < tolerance` without needing `f32::abs` from std
pub(crate) fn within(a: f32, b: f32, tolerance: f32) -> bool {
    a - b < tolerance && b - a < tolerance
}
