//! Calibration model
//!
//! Two-point linear maps between logical units (shutter degrees) and the
//! physical units seen by the hardware: servo pulse-width fraction on the
//! way out, raw position-sensor counts on the way back.
//!
//! The maps extrapolate freely beyond the two control points. Range limits
//! belong to the caller (see [`crate::controller`]).

use crate::config::CalibrationPoints;

/// Shutter angle of the closed calibration point, in degrees
pub const CLOSED_REFERENCE_DEG: f32 = 0.0;

/// Shutter angle of the fully-open calibration point, in degrees
pub const OPENED_REFERENCE_DEG: f32 = 270.0;

/// Errors detected while building a calibration curve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CalibrationError {
    /// Both control points share the same logical or physical value
    ZeroSpan,
    /// A control point is NaN or infinite
    NotFinite,
}

impl core::fmt::Display for CalibrationError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            CalibrationError::ZeroSpan => f.write_str("Calibration span is zero"),
            CalibrationError::NotFinite => f.write_str("Calibration point is not finite"),
        }
    }
}

/// Linear map through two control points `(x0, y0)` and `(x1, y1)`
///
/// `x` is the logical value, `y` the physical one.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibrationCurve {
    x0: f32,
    y0: f32,
    x1: f32,
    y1: f32,
}

impl CalibrationCurve {
    /// Create a curve, rejecting degenerate control points
    ///
    /// Both spans must be non-zero so the curve can be used forward and
    /// inverted.
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Result<Self, CalibrationError> {
        if !(x0.is_finite() && y0.is_finite() && x1.is_finite() && y1.is_finite()) {
            return Err(CalibrationError::NotFinite);
        }
        if x0 == x1 || y0 == y1 {
            return Err(CalibrationError::ZeroSpan);
        }
        Ok(Self { x0, y0, x1, y1 })
    }

    /// Map a logical value to its physical value
    pub fn forward(&self, x: f32) -> f32 {
        (x - self.x0) / (self.x1 - self.x0) * (self.y1 - self.y0) + self.y0
    }

    /// Map a physical value back to its logical value
    pub fn inverse(&self, y: f32) -> f32 {
        (y - self.y0) * (self.x1 - self.x0) / (self.y1 - self.y0) + self.x0
    }
}

/// Calibration of the shutter servo and its position sensor
///
/// Both curves share the 0° and 270° reference angles.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ShutterCalibration {
    pulse: CalibrationCurve,
    sensor: CalibrationCurve,
}

impl ShutterCalibration {
    /// Build both curves from factory calibration points
    pub fn new(points: &CalibrationPoints) -> Result<Self, CalibrationError> {
        Ok(Self {
            pulse: CalibrationCurve::new(
                CLOSED_REFERENCE_DEG,
                points.pulse_at_0,
                OPENED_REFERENCE_DEG,
                points.pulse_at_270,
            )?,
            sensor: CalibrationCurve::new(
                CLOSED_REFERENCE_DEG,
                points.sensor_at_0,
                OPENED_REFERENCE_DEG,
                points.sensor_at_270,
            )?,
        })
    }

    /// Servo pulse-width fraction commanding `angle` degrees
    pub fn angle_to_pulse_fraction(&self, angle: f32) -> f32 {
        self.pulse.forward(angle)
    }

    /// Angle the servo settles at for a given pulse-width fraction
    pub fn pulse_fraction_to_angle(&self, fraction: f32) -> f32 {
        self.pulse.inverse(fraction)
    }

    /// Angle corresponding to a raw sensor reading
    pub fn sensor_to_angle(&self, raw: f32) -> f32 {
        self.sensor.inverse(raw)
    }

    /// Raw sensor reading expected at `angle` degrees
    pub fn angle_to_sensor(&self, angle: f32) -> f32 {
        self.sensor.forward(angle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32, tol: f32) -> bool {
        a - b < tol && b - a < tol
    }

    fn reference() -> ShutterCalibration {
        ShutterCalibration::new(&CalibrationPoints::default()).unwrap()
    }

    #[test]
    fn test_pulse_endpoints() {
        let cal = reference();
        assert!(close(cal.angle_to_pulse_fraction(0.0), -0.026, 1e-6));
        assert!(close(cal.angle_to_pulse_fraction(270.0), 0.951, 1e-6));
    }

    #[test]
    fn test_pulse_midpoint() {
        let cal = reference();
        // (135 / 270) * (0.951 + 0.026) - 0.026
        assert!(close(cal.angle_to_pulse_fraction(135.0), 0.4625, 1e-5));
    }

    #[test]
    fn test_sensor_endpoints() {
        let cal = reference();
        assert!(close(cal.sensor_to_angle(60850.8), 0.0, 1e-3));
        assert!(close(cal.sensor_to_angle(6985.0), 270.0, 1e-3));
    }

    #[test]
    fn test_sensor_is_inverted() {
        // Sensor counts fall as the shutter opens
        let cal = reference();
        assert!(cal.sensor_to_angle(30000.0) > cal.sensor_to_angle(40000.0));
    }

    #[test]
    fn test_extrapolation_not_clamped() {
        let cal = reference();
        assert!(cal.angle_to_pulse_fraction(-20.0) < -0.026);
        assert!(cal.angle_to_pulse_fraction(290.0) > 0.951);
        assert!(cal.sensor_to_angle(65535.0) < 0.0);
    }

    #[test]
    fn test_curve_inverse() {
        let curve = CalibrationCurve::new(0.0, 10.0, 100.0, 30.0).unwrap();
        assert!(close(curve.forward(50.0), 20.0, 1e-5));
        assert!(close(curve.inverse(20.0), 50.0, 1e-5));
    }

    #[test]
    fn test_zero_span_rejected() {
        assert_eq!(
            CalibrationCurve::new(0.0, 5.0, 270.0, 5.0),
            Err(CalibrationError::ZeroSpan)
        );
        assert_eq!(
            CalibrationCurve::new(10.0, 1.0, 10.0, 2.0),
            Err(CalibrationError::ZeroSpan)
        );

        let points = CalibrationPoints {
            sensor_at_0: 1000.0,
            sensor_at_270: 1000.0,
            ..CalibrationPoints::default()
        };
        assert_eq!(
            ShutterCalibration::new(&points),
            Err(CalibrationError::ZeroSpan)
        );
    }

    #[test]
    fn test_non_finite_rejected() {
        assert_eq!(
            CalibrationCurve::new(0.0, f32::NAN, 270.0, 1.0),
            Err(CalibrationError::NotFinite)
        );
    }
}
