//! Simulated hardware for host-side tests
//!
//! A [`Bench`] models one shutter shaft shared by a simulated servo and
//! position sensor, plus a recording panel output, actuator rail and
//! settle delay. The servo only moves the shaft while the rail is
//! energized and the shaft is not jammed, and the sensor reports the
//! shaft angle through the same calibration the controller uses.
//!
//! All peripherals borrow the bench, so a test keeps the bench on the
//! stack and inspects it while the controller owns the peripherals.
//!
//! Output writes are also kept in order in an [`Event`] log so tests can
//! check the sequence of a multi-step command, not just where it ended.

use core::cell::{Cell, RefCell};

use embedded_hal::delay::DelayNs;
use heapless::Vec;

use crate::calibration::ShutterCalibration;
use crate::config::DeviceConfig;
use crate::controller::{DeviceController, Hardware};
use crate::traits::{
    ActuatorError, PanelOutput, PositionSensor, PowerRail, SensorError, ServoActuator,
};

/// Controller type driven by a [`Bench`]
pub type BenchController<'a> =
    DeviceController<SimServo<'a>, SimSensor<'a>, SimPanel<'a>, SimRail<'a>, SimDelay<'a>>;

/// Capacity of the event log; later writes are dropped
pub const EVENT_LOG_LEN: usize = 64;

/// One output write seen by the bench
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    /// Servo commanded to a pulse fraction
    Servo(f32),
    /// Panel output set to a level
    Panel(f32),
    /// Rail switched
    Rail(bool),
}

/// Shared state of the simulated device
pub struct Bench {
    config: DeviceConfig,
    calibration: ShutterCalibration,
    shaft_angle: Cell<f32>,
    jammed: Cell<bool>,
    sensor_fault: Cell<bool>,
    sensor_reads: Cell<u32>,
    servo_writes: Cell<u32>,
    last_pulse: Cell<Option<f32>>,
    panel_level: Cell<f32>,
    panel_writes: Cell<u32>,
    rail_energized: Cell<bool>,
    rail_writes: Cell<u32>,
    rail_fault: Cell<bool>,
    events: RefCell<Vec<Event, EVENT_LOG_LEN>>,
    settle_count: Cell<u32>,
    settle_ms: Cell<u32>,
}

impl Bench {
    /// Bench using `config`, with the shaft resting at `angle` degrees
    ///
    /// The rail starts de-energized, as on a freshly powered board.
    pub fn new(config: DeviceConfig, angle: f32) -> Self {
        let calibration = ShutterCalibration::new(&config.calibration)
            .expect("bench calibration points must be valid");
        Self {
            config,
            calibration,
            shaft_angle: Cell::new(angle),
            jammed: Cell::new(false),
            sensor_fault: Cell::new(false),
            sensor_reads: Cell::new(0),
            servo_writes: Cell::new(0),
            last_pulse: Cell::new(None),
            panel_level: Cell::new(0.0),
            panel_writes: Cell::new(0),
            rail_energized: Cell::new(false),
            rail_writes: Cell::new(0),
            rail_fault: Cell::new(false),
            events: RefCell::new(Vec::new()),
            settle_count: Cell::new(0),
            settle_ms: Cell::new(0),
        }
    }

    /// Reference-board bench with the shaft at `angle` degrees
    pub fn at_angle(angle: f32) -> Self {
        Self::new(DeviceConfig::default(), angle)
    }

    /// Reference-board bench with the shutter closed
    pub fn closed() -> Self {
        Self::at_angle(0.0)
    }

    /// Reference-board bench with the shutter fully open
    pub fn opened() -> Self {
        Self::at_angle(270.0)
    }

    /// Fresh set of peripherals bound to this bench
    pub fn hardware(
        &self,
    ) -> Hardware<SimServo<'_>, SimSensor<'_>, SimPanel<'_>, SimRail<'_>, SimDelay<'_>> {
        Hardware {
            servo: SimServo { bench: self },
            sensor: SimSensor { bench: self },
            panel: SimPanel { bench: self },
            rail: SimRail { bench: self },
            delay: SimDelay { bench: self },
        }
    }

    /// Controller over this bench with the bench's configuration
    pub fn controller(&self) -> BenchController<'_> {
        DeviceController::new(self.config, self.hardware())
            .expect("bench controller must initialize")
    }

    /// Configuration the bench was built with
    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    /// Current shaft angle (degrees)
    pub fn shaft_angle(&self) -> f32 {
        self.shaft_angle.get()
    }

    /// Stop the shaft from following servo commands
    pub fn jam(&self, jammed: bool) {
        self.jammed.set(jammed);
    }

    /// Make every sensor read fail
    pub fn fail_sensor(&self, fail: bool) {
        self.sensor_fault.set(fail);
    }

    /// Make every rail switch write fail
    pub fn fail_rail(&self, fail: bool) {
        self.rail_fault.set(fail);
    }

    /// Output writes in the order they happened
    pub fn events(&self) -> Vec<Event, EVENT_LOG_LEN> {
        self.events.borrow().clone()
    }

    /// Forget the writes logged so far
    pub fn clear_events(&self) {
        self.events.borrow_mut().clear();
    }

    fn log(&self, event: Event) {
        let _ = self.events.borrow_mut().push(event);
    }

    /// Number of sensor reads taken
    pub fn sensor_reads(&self) -> u32 {
        self.sensor_reads.get()
    }

    /// Number of servo commands received
    pub fn servo_writes(&self) -> u32 {
        self.servo_writes.get()
    }

    /// Last pulse fraction sent to the servo
    pub fn last_pulse(&self) -> Option<f32> {
        self.last_pulse.get()
    }

    /// Current panel output level
    pub fn panel_level(&self) -> f32 {
        self.panel_level.get()
    }

    /// Number of panel output writes
    pub fn panel_writes(&self) -> u32 {
        self.panel_writes.get()
    }

    /// Check if the actuator rail is energized
    pub fn rail_energized(&self) -> bool {
        self.rail_energized.get()
    }

    /// Number of rail switch writes
    pub fn rail_writes(&self) -> u32 {
        self.rail_writes.get()
    }

    /// Number of millisecond delays taken
    pub fn settle_count(&self) -> u32 {
        self.settle_count.get()
    }

    /// Total time spent in millisecond delays
    pub fn settle_ms(&self) -> u32 {
        self.settle_ms.get()
    }
}

/// Simulated servo
pub struct SimServo<'a> {
    bench: &'a Bench,
}

impl ServoActuator for SimServo<'_> {
    fn set_pulse_fraction(&mut self, fraction: f32) -> Result<(), ActuatorError> {
        let bench = self.bench;
        bench.servo_writes.set(bench.servo_writes.get() + 1);
        bench.last_pulse.set(Some(fraction));
        bench.log(Event::Servo(fraction));
        if bench.rail_energized.get() && !bench.jammed.get() {
            bench
                .shaft_angle
                .set(bench.calibration.pulse_fraction_to_angle(fraction));
        }
        Ok(())
    }
}

/// Simulated position sensor
pub struct SimSensor<'a> {
    bench: &'a Bench,
}

impl PositionSensor for SimSensor<'_> {
    fn read_raw(&mut self) -> Result<u16, SensorError> {
        let bench = self.bench;
        bench.sensor_reads.set(bench.sensor_reads.get() + 1);
        if bench.sensor_fault.get() {
            return Err(SensorError::ConversionError);
        }
        let raw = bench.calibration.angle_to_sensor(bench.shaft_angle.get()) + 0.5;
        Ok(raw.clamp(0.0, u16::MAX as f32) as u16)
    }
}

/// Simulated panel output
pub struct SimPanel<'a> {
    bench: &'a Bench,
}

impl PanelOutput for SimPanel<'_> {
    fn set_level(&mut self, level: f32) -> Result<(), ActuatorError> {
        let bench = self.bench;
        bench.panel_writes.set(bench.panel_writes.get() + 1);
        bench.panel_level.set(level);
        bench.log(Event::Panel(level));
        Ok(())
    }
}

/// Simulated actuator rail switch
pub struct SimRail<'a> {
    bench: &'a Bench,
}

impl PowerRail for SimRail<'_> {
    fn set_energized(&mut self, energized: bool) -> Result<(), ActuatorError> {
        let bench = self.bench;
        bench.rail_writes.set(bench.rail_writes.get() + 1);
        if bench.rail_fault.get() {
            return Err(ActuatorError::Pin);
        }
        bench.rail_energized.set(energized);
        bench.log(Event::Rail(energized));
        Ok(())
    }
}

/// Delay that returns immediately and records what was requested
pub struct SimDelay<'a> {
    bench: &'a Bench,
}

impl DelayNs for SimDelay<'_> {
    fn delay_ns(&mut self, _ns: u32) {}

    fn delay_ms(&mut self, ms: u32) {
        let bench = self.bench;
        bench.settle_count.set(bench.settle_count.get() + 1);
        bench.settle_ms.set(bench.settle_ms.get() + ms);
    }
}
