//! Hobby servo on a PWM channel
//!
//! The servo reads the high time of each PWM period as its position
//! command. The PWM channel must already run at `period_us`; this driver
//! only sets the duty cycle.
//!
//! ```ignore
//! let mut servo = PwmServo::new(pwm_channel, ServoConfig::default())?;
//! servo.set_pulse_fraction(0.5)?; // 1500 µs pulse
//! ```

use embedded_hal::pwm::SetDutyCycle;

use blandpanel_core::traits::{ActuatorError, ServoActuator};

/// Servo pulse timing
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ServoConfig {
    /// PWM period in microseconds (10000 = 100 Hz)
    pub period_us: u32,
    /// Pulse width at fraction 0.0
    pub min_pulse_us: u32,
    /// Added pulse width at fraction 1.0
    pub pulse_span_us: u32,
}

impl Default for ServoConfig {
    fn default() -> Self {
        Self {
            period_us: 10_000,
            min_pulse_us: 500,
            pulse_span_us: 2_000,
        }
    }
}

/// Servo driven by a PWM duty cycle
pub struct PwmServo<P> {
    pwm: P,
    config: ServoConfig,
    /// Last commanded pulse width, `None` while released
    pulse_us: Option<f32>,
}

impl<P: SetDutyCycle> PwmServo<P> {
    /// Create a servo driver and release the servo
    pub fn new(pwm: P, config: ServoConfig) -> Result<Self, ActuatorError> {
        let mut servo = Self {
            pwm,
            config,
            pulse_us: None,
        };
        servo.release()?;
        Ok(servo)
    }

    /// Stop sending pulses
    ///
    /// A servo with no pulse holds no position and draws little current.
    pub fn release(&mut self) -> Result<(), ActuatorError> {
        self.pwm
            .set_duty_cycle_fully_off()
            .map_err(|_| ActuatorError::Pwm)?;
        self.pulse_us = None;
        Ok(())
    }

    /// Last commanded pulse width in microseconds
    pub fn pulse_us(&self) -> Option<f32> {
        self.pulse_us
    }

    pub fn config(&self) -> &ServoConfig {
        &self.config
    }

    /// Pulse width for a fraction of the pulse range
    pub fn fraction_to_pulse_us(&self, fraction: f32) -> f32 {
        self.config.min_pulse_us as f32 + fraction * self.config.pulse_span_us as f32
    }

    /// Duty cycle for a pulse width, clamped to the PWM range
    fn pulse_to_duty(&self, pulse_us: f32) -> u16 {
        let max = self.pwm.max_duty_cycle() as f32;
        let duty = pulse_us / self.config.period_us as f32 * max + 0.5;
        duty.clamp(0.0, max) as u16
    }
}

impl<P: SetDutyCycle> ServoActuator for PwmServo<P> {
    fn set_pulse_fraction(&mut self, fraction: f32) -> Result<(), ActuatorError> {
        let pulse_us = self.fraction_to_pulse_us(fraction);
        let duty = self.pulse_to_duty(pulse_us);
        self.pwm
            .set_duty_cycle(duty)
            .map_err(|_| ActuatorError::Pwm)?;
        self.pulse_us = Some(pulse_us);
        Ok(())
    }
}
