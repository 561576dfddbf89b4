//! Reference board wiring
//!
//! | Function            | Pin    | Peripheral        |
//! |---------------------|--------|-------------------|
//! | Serial TX / RX      | GPIO0/1| UART0, 115200 8N1 |
//! | Actuator rail enable| GPIO12 | GPIO, active-high |
//! | Panel PWM           | GPIO13 | PWM slice 6 B     |
//! | Servo PWM           | GPIO22 | PWM slice 3 A     |
//! | Power LED           | GPIO25 | GPIO              |
//! | Shutter position    | GPIO28 | ADC2              |

use embassy_rp::adc::{self, Adc, Blocking, Channel};
use embassy_rp::gpio::Output;
use embassy_rp::pwm::{self, PwmOutput};
use embassy_time::Delay;

use blandpanel_drivers::panel::PwmPanel;
use blandpanel_drivers::rail::GpioRail;
use blandpanel_drivers::sensor::{Adc12Sensor, Conversion12};
use blandpanel_drivers::servo::PwmServo;
use blandpanel_protocol::Interpreter;

/// System clock feeding the PWM slices
pub const SYS_CLOCK_HZ: u32 = 125_000_000;

/// Panel PWM frequency
pub const PANEL_PWM_HZ: u32 = 10_000;

/// Servo PWM tick after the divider (1 µs)
pub const SERVO_TICK_HZ: u32 = 1_000_000;

pub type BoardServo = PwmServo<PwmOutput<'static>>;
pub type BoardPanel = PwmPanel<PwmOutput<'static>>;
pub type BoardRail = GpioRail<Output<'static>>;
pub type BoardSensor = Adc12Sensor<ShutterAdc>;
pub type BoardInterpreter = Interpreter<BoardServo, BoardSensor, BoardPanel, BoardRail, Delay>;

/// Shutter position potentiometer on ADC2
pub struct ShutterAdc {
    adc: Adc<'static, Blocking>,
    channel: Channel<'static>,
}

impl ShutterAdc {
    pub fn new(adc: Adc<'static, Blocking>, channel: Channel<'static>) -> Self {
        Self { adc, channel }
    }
}

impl Conversion12 for ShutterAdc {
    type Error = adc::Error;

    fn convert(&mut self) -> Result<u16, adc::Error> {
        self.adc.blocking_read(&mut self.channel)
    }
}

/// PWM slice setup for the servo: 1 µs ticks, one period of `period_us`
pub fn servo_pwm_config(period_us: u32) -> pwm::Config {
    let mut config = pwm::Config::default();
    config.divider = ((SYS_CLOCK_HZ / SERVO_TICK_HZ) as u8).into();
    config.top = (period_us.clamp(1, u16::MAX as u32 + 1) - 1) as u16;
    config.compare_a = 0;
    config
}

/// PWM slice setup for the panel: full-speed clock at [`PANEL_PWM_HZ`]
pub fn panel_pwm_config() -> pwm::Config {
    let mut config = pwm::Config::default();
    config.top = (SYS_CLOCK_HZ / PANEL_PWM_HZ - 1) as u16;
    config.compare_b = 0;
    config
}
