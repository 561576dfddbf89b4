//! Device controller
//!
//! Owns the actuation state (brightness, panel enable, estop latch) and is
//! the only way to change it. Every operation runs synchronously to
//! completion, including the servo settle wait.
//!
//! Operations validate their arguments before touching hardware or state,
//! so a rejected call leaves the device exactly as it was.

use embedded_hal::delay::DelayNs;

use crate::calibration::{CalibrationError, ShutterCalibration};
use crate::config::DeviceConfig;
use crate::safety::{EstopEvent, EstopState};
use crate::state::shutter::within;
use crate::state::{ShutterPosition, TargetState};
use crate::traits::{
    ActuatorError, PanelOutput, PositionSensor, PowerRail, SensorError, ServoActuator,
};

/// Quantity that failed a range check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Quantity {
    Angle,
    Brightness,
}

/// Errors returned by controller operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControllerError {
    /// Argument outside the accepted bounds
    OutOfRange(Quantity),
    /// Position sensor failed
    Sensor(SensorError),
    /// Servo, panel or rail write failed
    Actuator(ActuatorError),
    /// Calibration points are unusable
    Calibration(CalibrationError),
}

impl From<SensorError> for ControllerError {
    fn from(e: SensorError) -> Self {
        ControllerError::Sensor(e)
    }
}

impl From<ActuatorError> for ControllerError {
    fn from(e: ActuatorError) -> Self {
        ControllerError::Actuator(e)
    }
}

impl From<CalibrationError> for ControllerError {
    fn from(e: CalibrationError) -> Self {
        ControllerError::Calibration(e)
    }
}

impl core::fmt::Display for ControllerError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ControllerError::OutOfRange(Quantity::Angle) => f.write_str("Angle out of bounds"),
            ControllerError::OutOfRange(Quantity::Brightness) => {
                f.write_str("Brightness out of bounds")
            }
            ControllerError::Sensor(e) => write!(f, "{}", e),
            ControllerError::Actuator(e) => write!(f, "{}", e),
            ControllerError::Calibration(e) => write!(f, "{}", e),
        }
    }
}

/// The peripherals a controller drives
pub struct Hardware<S, A, P, R, D> {
    /// Shutter servo
    pub servo: S,
    /// Shutter position feedback
    pub sensor: A,
    /// Panel light output
    pub panel: P,
    /// Actuator power rail
    pub rail: R,
    /// Blocking delay used for the settle wait
    pub delay: D,
}

/// Mutable device state
///
/// Shutter position is intentionally absent; see [`DeviceController::get_state`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceState {
    /// Last commanded brightness (0.0-1.0)
    pub brightness: f32,
    /// Panel output energized
    pub enabled: bool,
    /// Emergency stop latch
    pub estop: EstopState,
}

impl DeviceState {
    /// Power-on state
    pub fn new(brightness: f32) -> Self {
        Self {
            brightness,
            enabled: false,
            estop: EstopState::Armed,
        }
    }
}

/// Shutter and panel controller
pub struct DeviceController<S, A, P, R, D> {
    config: DeviceConfig,
    calibration: ShutterCalibration,
    state: DeviceState,
    hw: Hardware<S, A, P, R, D>,
}

impl<S, A, P, R, D> DeviceController<S, A, P, R, D>
where
    S: ServoActuator,
    A: PositionSensor,
    P: PanelOutput,
    R: PowerRail,
    D: DelayNs,
{
    /// Create a controller and bring outputs to their power-on levels
    ///
    /// The panel is switched off and the actuator rail energized. The
    /// servo is left untouched until the first motion command.
    pub fn new(
        config: DeviceConfig,
        hardware: Hardware<S, A, P, R, D>,
    ) -> Result<Self, ControllerError> {
        let calibration = ShutterCalibration::new(&config.calibration)?;
        check_brightness(config.default_brightness)?;

        let mut controller = Self {
            config,
            calibration,
            state: DeviceState::new(config.default_brightness),
            hw: hardware,
        };

        controller.hw.panel.set_level(0.0)?;
        controller.hw.rail.set_energized(true)?;

        Ok(controller)
    }

    /// Get the active configuration
    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    // -- Shutter --

    /// Move the shutter to `angle` degrees and wait for it to settle
    ///
    /// Rejects angles outside the configured bounds (NaN included). While
    /// estopped the command is still sent but the unpowered servo does not
    /// move; this never touches the rail.
    pub fn set_angle(&mut self, angle: f32) -> Result<(), ControllerError> {
        let shutter = &self.config.shutter;
        if !(shutter.min_angle..=shutter.max_angle).contains(&angle) {
            return Err(ControllerError::OutOfRange(Quantity::Angle));
        }
        let fraction = self.calibration.angle_to_pulse_fraction(angle);
        self.drive_servo(fraction)
    }

    /// Send a raw pulse-width fraction to the servo and wait to settle
    ///
    /// Factory calibration only: no bounds check, no calibration curve.
    pub fn set_raw_pulse(&mut self, fraction: f32) -> Result<(), ControllerError> {
        self.drive_servo(fraction)
    }

    fn drive_servo(&mut self, fraction: f32) -> Result<(), ControllerError> {
        self.hw.servo.set_pulse_fraction(fraction)?;
        self.hw.delay.delay_ms(self.config.shutter.settle_ms);
        Ok(())
    }

    /// Measure the shutter angle in degrees
    ///
    /// Averages the configured number of sensor reads.
    pub fn get_angle(&mut self) -> Result<f32, ControllerError> {
        let samples = self.config.shutter.average_samples;
        self.get_angle_averaged(samples)
    }

    /// Measure the shutter angle averaging `samples` sensor reads
    pub fn get_angle_averaged(&mut self, samples: u16) -> Result<f32, ControllerError> {
        let raw = self.sample_mean(samples)?;
        Ok(self.calibration.sensor_to_angle(raw))
    }

    /// Mean raw sensor reading, for factory calibration
    pub fn get_raw_reading(&mut self) -> Result<f32, ControllerError> {
        self.sample_mean(self.config.shutter.average_samples)
    }

    fn sample_mean(&mut self, samples: u16) -> Result<f32, ControllerError> {
        let samples = samples.max(1);
        let mut sum: u32 = 0;
        for _ in 0..samples {
            sum += self.hw.sensor.read_raw()? as u32;
        }
        Ok(sum as f32 / samples as f32)
    }

    /// Classify the shutter position from a fresh measurement
    pub fn get_state(&mut self) -> Result<ShutterPosition, ControllerError> {
        let angle = self.get_angle()?;
        Ok(ShutterPosition::classify(angle, self.config.shutter.tolerance))
    }

    /// Drive the shutter to `target` unless it is already there
    ///
    /// When the shutter already reads as `target`, no servo command is
    /// issued and no settle wait occurs.
    pub fn set_state(&mut self, target: TargetState) -> Result<(), ControllerError> {
        if self.get_state()? == target.position() {
            return Ok(());
        }
        self.set_angle(target.angle())
    }

    /// Check whether a measured angle is within tolerance of `target`
    pub fn angle_matches(&self, measured: f32, target: f32) -> bool {
        within(measured, target, self.config.shutter.tolerance)
    }

    // -- Panel --

    /// Switch the panel output on at the stored brightness, or off
    ///
    /// Not gated by the estop latch: the panel is not on the actuator rail.
    pub fn set_enabled(&mut self, enabled: bool) -> Result<(), ControllerError> {
        let level = if enabled { self.state.brightness } else { 0.0 };
        self.hw.panel.set_level(level)?;
        self.state.enabled = enabled;
        Ok(())
    }

    /// Store a new brightness (inclusive 0.0-1.0)
    ///
    /// If the panel is on, its output follows immediately.
    pub fn set_brightness(&mut self, value: f32) -> Result<(), ControllerError> {
        self.check_brightness(value)?;
        if self.state.enabled {
            self.hw.panel.set_level(value)?;
        }
        self.state.brightness = value;
        Ok(())
    }

    /// Check that `value` would be accepted by [`set_brightness`](Self::set_brightness)
    ///
    /// Lets a multi-step command reject a bad level before it moves anything.
    pub fn check_brightness(&self, value: f32) -> Result<(), ControllerError> {
        check_brightness(value)
    }

    /// Get the stored brightness
    pub fn get_brightness(&self) -> f32 {
        self.state.brightness
    }

    /// Check if the panel output is on
    pub fn get_enabled(&self) -> bool {
        self.state.enabled
    }

    // -- Safety --

    /// Latch the emergency stop and cut the actuator rail
    ///
    /// The latch is set even when the rail write fails, so a failed stop
    /// still needs an all-clear.
    pub fn estop(&mut self) -> Result<(), ControllerError> {
        self.state.estop = self.state.estop.transition(EstopEvent::Estop);
        self.hw.rail.set_energized(false)?;
        Ok(())
    }

    /// Clear the latch and re-energize the rail
    ///
    /// Does nothing unless estopped. This is the only operation that
    /// re-energizes the rail.
    pub fn allclear(&mut self) -> Result<(), ControllerError> {
        if self.state.estop.is_estopped() {
            self.hw.rail.set_energized(true)?;
            self.state.estop = self.state.estop.transition(EstopEvent::AllClear);
        }
        Ok(())
    }

    /// Check if the emergency stop is latched
    pub fn is_estopped(&self) -> bool {
        self.state.estop.is_estopped()
    }
}

fn check_brightness(value: f32) -> Result<(), ControllerError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ControllerError::OutOfRange(Quantity::Brightness))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::Bench;

    #[test]
    fn test_power_on_state() {
        let bench = Bench::closed();
        let ctl = bench.controller();

        assert_eq!(ctl.get_brightness(), 0.75);
        assert!(!ctl.get_enabled());
        assert!(!ctl.is_estopped());
        assert!(bench.rail_energized());
        assert_eq!(bench.panel_level(), 0.0);
        assert_eq!(bench.servo_writes(), 0);
    }

    #[test]
    fn test_rejects_bad_default_brightness() {
        let bench = Bench::closed();
        let config = DeviceConfig {
            default_brightness: 1.5,
            ..DeviceConfig::default()
        };
        let result = DeviceController::new(config, bench.hardware());
        assert!(matches!(
            result,
            Err(ControllerError::OutOfRange(Quantity::Brightness))
        ));
    }

    #[test]
    fn test_set_angle_bounds() {
        let bench = Bench::closed();
        let mut ctl = bench.controller();

        assert_eq!(
            ctl.set_angle(290.1),
            Err(ControllerError::OutOfRange(Quantity::Angle))
        );
        assert_eq!(
            ctl.set_angle(-20.1),
            Err(ControllerError::OutOfRange(Quantity::Angle))
        );
        assert_eq!(
            ctl.set_angle(f32::NAN),
            Err(ControllerError::OutOfRange(Quantity::Angle))
        );
        assert_eq!(bench.servo_writes(), 0);
        assert_eq!(bench.settle_count(), 0);

        assert!(ctl.set_angle(-20.0).is_ok());
        assert!(ctl.set_angle(290.0).is_ok());
        assert_eq!(bench.servo_writes(), 2);
    }

    #[test]
    fn test_set_angle_settles() {
        let bench = Bench::closed();
        let mut ctl = bench.controller();

        ctl.set_angle(135.0).unwrap();
        assert_eq!(bench.settle_count(), 1);
        assert_eq!(bench.settle_ms(), 2000);

        let angle = ctl.get_angle().unwrap();
        assert!(ctl.angle_matches(angle, 135.0));
    }

    #[test]
    fn test_set_raw_pulse_skips_conversion() {
        let bench = Bench::closed();
        let mut ctl = bench.controller();

        ctl.set_raw_pulse(1.2).unwrap();
        assert_eq!(bench.last_pulse(), Some(1.2));
        assert_eq!(bench.settle_count(), 1);
    }

    #[test]
    fn test_get_angle_averages_samples() {
        let bench = Bench::closed();
        let mut ctl = bench.controller();

        ctl.get_angle().unwrap();
        assert_eq!(bench.sensor_reads(), 10);

        ctl.get_angle_averaged(3).unwrap();
        assert_eq!(bench.sensor_reads(), 13);
    }

    #[test]
    fn test_raw_reading_is_uncalibrated() {
        let bench = Bench::closed();
        let mut ctl = bench.controller();

        let raw = ctl.get_raw_reading().unwrap();
        assert!(raw > 60_000.0 && raw < 61_000.0);
    }

    #[test]
    fn test_sensor_fault_propagates() {
        let bench = Bench::closed();
        let mut ctl = bench.controller();

        bench.fail_sensor(true);
        assert_eq!(
            ctl.get_state(),
            Err(ControllerError::Sensor(SensorError::ConversionError))
        );
    }

    #[test]
    fn test_set_state_opens_and_closes() {
        let bench = Bench::closed();
        let mut ctl = bench.controller();

        ctl.set_state(TargetState::Opened).unwrap();
        assert_eq!(ctl.get_state().unwrap(), ShutterPosition::Opened);

        ctl.set_state(TargetState::Closed).unwrap();
        assert_eq!(ctl.get_state().unwrap(), ShutterPosition::Closed);
        assert_eq!(bench.servo_writes(), 2);
    }

    #[test]
    fn test_set_state_idempotent() {
        let bench = Bench::closed();
        let mut ctl = bench.controller();

        ctl.set_state(TargetState::Closed).unwrap();
        assert_eq!(bench.servo_writes(), 0);
        assert_eq!(bench.settle_count(), 0);
    }

    #[test]
    fn test_jammed_shutter_stays_intermediate() {
        let bench = Bench::at_angle(135.0);
        let mut ctl = bench.controller();

        bench.jam(true);
        ctl.set_state(TargetState::Opened).unwrap();
        assert_eq!(ctl.get_state().unwrap(), ShutterPosition::Intermediate);
    }

    #[test]
    fn test_brightness_bounds() {
        let bench = Bench::closed();
        let mut ctl = bench.controller();

        assert_eq!(
            ctl.set_brightness(1.01),
            Err(ControllerError::OutOfRange(Quantity::Brightness))
        );
        assert_eq!(
            ctl.set_brightness(-0.01),
            Err(ControllerError::OutOfRange(Quantity::Brightness))
        );
        assert_eq!(
            ctl.set_brightness(f32::NAN),
            Err(ControllerError::OutOfRange(Quantity::Brightness))
        );
        assert_eq!(ctl.get_brightness(), 0.75);

        assert!(ctl.set_brightness(0.0).is_ok());
        assert!(ctl.set_brightness(1.0).is_ok());
        assert_eq!(ctl.get_brightness(), 1.0);
    }

    #[test]
    fn test_check_brightness_has_no_effect() {
        let bench = Bench::closed();
        let ctl = bench.controller();
        let panel_writes = bench.panel_writes();

        assert!(ctl.check_brightness(0.3).is_ok());
        assert_eq!(
            ctl.check_brightness(2.0),
            Err(ControllerError::OutOfRange(Quantity::Brightness))
        );
        assert_eq!(ctl.get_brightness(), 0.75);
        assert_eq!(bench.panel_writes(), panel_writes);
    }

    #[test]
    fn test_brightness_follows_when_enabled() {
        let bench = Bench::closed();
        let mut ctl = bench.controller();

        ctl.set_brightness(0.4).unwrap();
        assert_eq!(bench.panel_level(), 0.0);

        ctl.set_enabled(true).unwrap();
        assert_eq!(bench.panel_level(), 0.4);

        ctl.set_brightness(0.9).unwrap();
        assert_eq!(bench.panel_level(), 0.9);

        ctl.set_enabled(false).unwrap();
        assert_eq!(bench.panel_level(), 0.0);
        assert_eq!(ctl.get_brightness(), 0.9);
    }

    #[test]
    fn test_estop_cuts_rail() {
        let bench = Bench::closed();
        let mut ctl = bench.controller();

        ctl.estop().unwrap();
        assert!(ctl.is_estopped());
        assert!(!bench.rail_energized());

        ctl.estop().unwrap();
        assert!(ctl.is_estopped());
        assert!(!bench.rail_energized());
    }

    #[test]
    fn test_estop_latches_when_rail_write_fails() {
        let bench = Bench::closed();
        let mut ctl = bench.controller();

        bench.fail_rail(true);
        assert_eq!(
            ctl.estop(),
            Err(ControllerError::Actuator(ActuatorError::Pin))
        );
        assert!(ctl.is_estopped());

        // Clearing needs a working rail
        assert!(ctl.allclear().is_err());
        assert!(ctl.is_estopped());

        bench.fail_rail(false);
        ctl.allclear().unwrap();
        assert!(!ctl.is_estopped());
        assert!(bench.rail_energized());
    }

    #[test]
    fn test_motion_never_energizes_rail() {
        let bench = Bench::closed();
        let mut ctl = bench.controller();

        ctl.estop().unwrap();
        let rail_writes = bench.rail_writes();

        ctl.set_angle(135.0).unwrap();
        ctl.set_state(TargetState::Opened).unwrap();

        assert!(!bench.rail_energized());
        assert_eq!(bench.rail_writes(), rail_writes);
        assert_eq!(ctl.get_state().unwrap(), ShutterPosition::Closed);

        ctl.allclear().unwrap();
        assert!(bench.rail_energized());
        assert!(!ctl.is_estopped());

        ctl.set_state(TargetState::Opened).unwrap();
        assert_eq!(ctl.get_state().unwrap(), ShutterPosition::Opened);
    }

    #[test]
    fn test_allclear_without_estop_is_noop() {
        let bench = Bench::closed();
        let mut ctl = bench.controller();

        let rail_writes = bench.rail_writes();
        ctl.allclear().unwrap();
        assert_eq!(bench.rail_writes(), rail_writes);
    }

    #[test]
    fn test_panel_not_gated_by_estop() {
        let bench = Bench::closed();
        let mut ctl = bench.controller();

        ctl.estop().unwrap();
        ctl.set_enabled(true).unwrap();
        assert!(ctl.get_enabled());
        assert_eq!(bench.panel_level(), 0.75);
    }
}
