//! Build script for blandpanel-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates panel.toml and generates the device configuration constants

use std::env;
use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Deserialize;

fn main() {
    setup_linker();
    let config = load_config();
    validate_config(&config);
    generate_config(&config);
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    if env::var_os("CARGO_FEATURE_DEFMT").is_some() {
        println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
    }

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PanelToml {
    device: DeviceSection,
    calibration: CalibrationSection,
    shutter: ShutterSection,
    servo: ServoSection,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DeviceSection {
    name: String,
    guid: String,
    default_brightness: f32,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CalibrationSection {
    pulse_at_0: f32,
    pulse_at_270: f32,
    sensor_at_0: f32,
    sensor_at_270: f32,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ShutterSection {
    min_angle: f32,
    max_angle: f32,
    tolerance: f32,
    settle_ms: u32,
    average_samples: u16,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ServoSection {
    period_us: u32,
    min_pulse_us: u32,
    pulse_span_us: u32,
}

/// Longest name or GUID that fits a protocol response
const MAX_IDENTITY_LEN: usize = 64;

/// Read and parse panel.toml
fn load_config() -> PanelToml {
    // Re-run if panel.toml changes
    println!("cargo:rerun-if-changed=panel.toml");

    let config_path = Path::new("panel.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: panel.toml not found!                                    ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a panel.toml configuration file.          ║\n\
            ║  Please create one in the blandpanel-firmware directory.         ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read panel.toml                                ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    match toml::from_str(&config_content) {
        Ok(config) => config,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid panel.toml                                       ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&e.to_string())
            );
        }
    }
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Check values the firmware cannot recover from at runtime
fn validate_config(config: &PanelToml) {
    let mut errors: Vec<String> = Vec::new();

    let device = &config.device;
    if device.name.trim().is_empty() {
        errors.push("[device] name cannot be empty".into());
    }
    if device.guid.trim().is_empty() {
        errors.push("[device] guid cannot be empty".into());
    }
    for (key, value) in [("name", &device.name), ("guid", &device.guid)] {
        if value.len() > MAX_IDENTITY_LEN {
            errors.push(format!("[device] {} must be at most {} bytes", key, MAX_IDENTITY_LEN));
        }
        if value.contains(['\r', '\n']) {
            errors.push(format!("[device] {} cannot contain line breaks", key));
        }
    }
    if !(0.0..=1.0).contains(&device.default_brightness) {
        errors.push("[device] default_brightness must be 0.0-1.0".into());
    }

    let cal = &config.calibration;
    if cal.pulse_at_0 == cal.pulse_at_270 {
        errors.push("[calibration] pulse_at_0 and pulse_at_270 must differ".into());
    }
    if cal.sensor_at_0 == cal.sensor_at_270 {
        errors.push("[calibration] sensor_at_0 and sensor_at_270 must differ".into());
    }
    for (key, value) in [("sensor_at_0", cal.sensor_at_0), ("sensor_at_270", cal.sensor_at_270)] {
        if !(0.0..=65535.0).contains(&value) {
            errors.push(format!("[calibration] {} must be 0-65535", key));
        }
    }

    let shutter = &config.shutter;
    if shutter.min_angle >= shutter.max_angle {
        errors.push("[shutter] min_angle must be below max_angle".into());
    }
    if shutter.min_angle > 0.0 || shutter.max_angle < 270.0 {
        errors.push("[shutter] angle bounds must include 0-270".into());
    }
    if shutter.tolerance <= 0.0 || shutter.tolerance >= 135.0 {
        errors.push("[shutter] tolerance must be between 0 and 135".into());
    }
    if shutter.average_samples == 0 {
        errors.push("[shutter] average_samples must be at least 1".into());
    }

    let servo = &config.servo;
    if servo.period_us == 0 {
        errors.push("[servo] period_us must be positive".into());
    }
    if servo.min_pulse_us + servo.pulse_span_us > servo.period_us {
        errors.push("[servo] pulse range must fit within period_us".into());
    }

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid panel.toml configuration                         ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    println!("cargo:warning=panel.toml validated successfully");
}

/// Write panel_config.rs into OUT_DIR
fn generate_config(config: &PanelToml) {
    let mut src = String::new();
    src.push_str("// Generated from panel.toml by build.rs\n\n");

    let device = &config.device;
    let cal = &config.calibration;
    let shutter = &config.shutter;
    let servo = &config.servo;

    // `{:?}` keeps a decimal point on every float literal
    let _ = writeln!(src, "pub const DEVICE_NAME: &str = {:?};", device.name);
    let _ = writeln!(src, "pub const DEVICE_GUID: &str = {:?};", device.guid);
    let _ = writeln!(src, "pub const DEFAULT_BRIGHTNESS: f32 = {:?};", device.default_brightness);
    let _ = writeln!(src, "pub const PULSE_AT_0: f32 = {:?};", cal.pulse_at_0);
    let _ = writeln!(src, "pub const PULSE_AT_270: f32 = {:?};", cal.pulse_at_270);
    let _ = writeln!(src, "pub const SENSOR_AT_0: f32 = {:?};", cal.sensor_at_0);
    let _ = writeln!(src, "pub const SENSOR_AT_270: f32 = {:?};", cal.sensor_at_270);
    let _ = writeln!(src, "pub const MIN_ANGLE: f32 = {:?};", shutter.min_angle);
    let _ = writeln!(src, "pub const MAX_ANGLE: f32 = {:?};", shutter.max_angle);
    let _ = writeln!(src, "pub const TOLERANCE: f32 = {:?};", shutter.tolerance);
    let _ = writeln!(src, "pub const SETTLE_MS: u32 = {};", shutter.settle_ms);
    let _ = writeln!(src, "pub const AVERAGE_SAMPLES: u16 = {};", shutter.average_samples);
    let _ = writeln!(src, "pub const SERVO_PERIOD_US: u32 = {};", servo.period_us);
    let _ = writeln!(src, "pub const SERVO_MIN_PULSE_US: u32 = {};", servo.min_pulse_us);
    let _ = writeln!(src, "pub const SERVO_PULSE_SPAN_US: u32 = {};", servo.pulse_span_us);

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    fs::write(out_dir.join("panel_config.rs"), src).unwrap();
}
