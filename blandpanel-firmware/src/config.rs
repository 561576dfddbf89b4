//! Device configuration
//!
//! Built from panel.toml at compile time; see build.rs.

use blandpanel_core::config::{CalibrationPoints, DeviceConfig, ShutterConfig};
use blandpanel_drivers::servo::ServoConfig;

mod generated {
    include!(concat!(env!("OUT_DIR"), "/panel_config.rs"));
}

/// Controller configuration for this board
pub const DEVICE_CONFIG: DeviceConfig = DeviceConfig {
    name: generated::DEVICE_NAME,
    guid: generated::DEVICE_GUID,
    calibration: CalibrationPoints {
        pulse_at_0: generated::PULSE_AT_0,
        pulse_at_270: generated::PULSE_AT_270,
        sensor_at_0: generated::SENSOR_AT_0,
        sensor_at_270: generated::SENSOR_AT_270,
    },
    shutter: ShutterConfig {
        min_angle: generated::MIN_ANGLE,
        max_angle: generated::MAX_ANGLE,
        tolerance: generated::TOLERANCE,
        settle_ms: generated::SETTLE_MS,
        average_samples: generated::AVERAGE_SAMPLES,
    },
    default_brightness: generated::DEFAULT_BRIGHTNESS,
};

/// Servo pulse timing for this board
pub const SERVO_CONFIG: ServoConfig = ServoConfig {
    period_us: generated::SERVO_PERIOD_US,
    min_pulse_us: generated::SERVO_MIN_PULSE_US,
    pulse_span_us: generated::SERVO_PULSE_SPAN_US,
};
