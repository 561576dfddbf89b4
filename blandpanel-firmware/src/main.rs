//! BLandPanel - Shutter and Flat Panel Firmware
//!
//! Firmware for an RP2040 telescope flat-field accessory: a servo-driven
//! shutter with analog position feedback in front of a dimmable panel,
//! controlled over a line-oriented serial protocol.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::adc::{Adc, Channel, Config as AdcConfig};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Level, Output, Pull};
use embassy_rp::peripherals::UART0;
use embassy_rp::pwm::Pwm;
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use embassy_time::{Delay, Timer};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use blandpanel_core::controller::{DeviceController, Hardware};
use blandpanel_drivers::panel::PwmPanel;
use blandpanel_drivers::rail::GpioRail;
use blandpanel_drivers::sensor::Adc12Sensor;
use blandpanel_drivers::servo::PwmServo;
use blandpanel_protocol::Interpreter;

use crate::board::ShutterAdc;
use crate::config::{DEVICE_CONFIG, SERVO_CONFIG};

mod board;
mod config;
mod tasks;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("BLandPanel firmware starting...");

    // Initialize RP2040 peripherals
    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    // Power LED on
    let _power_led = Output::new(p.PIN_25, Level::High);

    // Actuator rail enable, held off until the controller is up
    let rail = unwrap!(GpioRail::new_active_high(Output::new(p.PIN_12, Level::Low)));

    // Servo on GPIO22 (slice 3 A), released until the first motion command
    let servo_pwm = Pwm::new_output_a(
        p.PWM_SLICE3,
        p.PIN_22,
        board::servo_pwm_config(SERVO_CONFIG.period_us),
    );
    let servo_out = unwrap!(servo_pwm.split().0);
    let servo = unwrap!(PwmServo::new(servo_out, SERVO_CONFIG));

    // Panel on GPIO13 (slice 6 B), dark at power-on
    let panel_pwm = Pwm::new_output_b(p.PWM_SLICE6, p.PIN_13, board::panel_pwm_config());
    let panel_out = unwrap!(panel_pwm.split().1);
    let panel = unwrap!(PwmPanel::new(panel_out));

    // Shutter position sensor on ADC2
    let adc = Adc::new_blocking(p.ADC, AdcConfig::default());
    let position = Channel::new_pin(p.PIN_28, Pull::None);
    let sensor = Adc12Sensor::new(ShutterAdc::new(adc, position));

    info!("Actuators and sensor initialized");

    let hardware = Hardware {
        servo,
        sensor,
        panel,
        rail,
        delay: Delay,
    };
    let controller = match DeviceController::new(DEVICE_CONFIG, hardware) {
        Ok(controller) => controller,
        Err(e) => defmt::panic!("Controller init failed: {:?}", e),
    };
    info!(
        "{=str} ready, brightness {}",
        DEVICE_CONFIG.name, DEVICE_CONFIG.default_brightness
    );

    // Setup UART for the command channel
    let uart_config = UartConfig::default(); // 115200 baud default

    let tx_buf = TX_BUF.init([0u8; 256]);
    let rx_buf = RX_BUF.init([0u8; 256]);

    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, uart_config);
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    let (tx, rx) = uart.split();

    info!("UART initialized for command channel");

    spawner.spawn(unwrap!(tasks::serial_task(rx, tx, Interpreter::new(controller))));

    info!("All tasks spawned, firmware running");

    loop {
        Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}
