//! Device configuration types
//!
//! Calibration points, shutter motion limits, panel defaults and the
//! identity reported over the structured protocol.

/// Reference-board device name reported by `COMMAND:INFO`
pub const DEFAULT_NAME: &str = "BLandPanel v0";

/// Reference-board identifier reported by `COMMAND:PING`
pub const DEFAULT_GUID: &str = "some-kind-of-unique-identifier";

/// Factory calibration points for the shutter servo and position sensor
///
/// Pulse values are fractions of the servo's pulse-width range; sensor
/// values are raw readings scaled to 16 bits.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibrationPoints {
    /// Pulse-width fraction at 0°
    pub pulse_at_0: f32,
    /// Pulse-width fraction at 270°
    pub pulse_at_270: f32,
    /// Sensor reading at 0°
    pub sensor_at_0: f32,
    /// Sensor reading at 270°
    pub sensor_at_270: f32,
}

impl Default for CalibrationPoints {
    fn default() -> Self {
        Self {
            pulse_at_0: -0.026,
            pulse_at_270: 0.951,
            sensor_at_0: 60850.8,
            sensor_at_270: 6985.0,
        }
    }
}

/// Shutter motion limits and read-back settings
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ShutterConfig {
    /// Lowest angle accepted by `set_angle` (degrees)
    pub min_angle: f32,
    /// Highest angle accepted by `set_angle` (degrees)
    pub max_angle: f32,
    /// Classification and verification tolerance (degrees)
    pub tolerance: f32,
    /// Time the servo is given to reach a commanded position (ms)
    pub settle_ms: u32,
    /// Sensor reads averaged per angle measurement
    pub average_samples: u16,
}

impl Default for ShutterConfig {
    fn default() -> Self {
        Self {
            min_angle: -20.0,
            max_angle: 290.0,
            tolerance: 10.0,
            settle_ms: 2000,
            average_samples: 10,
        }
    }
}

/// Complete device configuration
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceConfig {
    /// Device name and version
    pub name: &'static str,
    /// Unique device identifier
    pub guid: &'static str,
    /// Servo and sensor calibration
    pub calibration: CalibrationPoints,
    /// Shutter limits
    pub shutter: ShutterConfig,
    /// Brightness at power-on and for `CALIBRATOR:ON` without a value
    pub default_brightness: f32,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME,
            guid: DEFAULT_GUID,
            calibration: CalibrationPoints::default(),
            shutter: ShutterConfig::default(),
            default_brightness: 0.75,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_defaults() {
        let config = DeviceConfig::default();
        assert_eq!(config.name, "BLandPanel v0");
        assert_eq!(config.shutter.settle_ms, 2000);
        assert_eq!(config.shutter.average_samples, 10);
        assert_eq!(config.default_brightness, 0.75);
        assert!(config.shutter.min_angle < config.shutter.max_angle);
    }
}
