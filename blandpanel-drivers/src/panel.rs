//! Flat panel brightness on a PWM channel

use embedded_hal::pwm::SetDutyCycle;

use blandpanel_core::traits::{ActuatorError, PanelOutput};

/// Panel LED driver input driven by PWM duty
pub struct PwmPanel<P> {
    pwm: P,
}

impl<P: SetDutyCycle> PwmPanel<P> {
    /// Create a panel driver with the output off
    pub fn new(pwm: P) -> Result<Self, ActuatorError> {
        let mut panel = Self { pwm };
        panel.set_level(0.0)?;
        Ok(panel)
    }
}

impl<P: SetDutyCycle> PanelOutput for PwmPanel<P> {
    fn set_level(&mut self, level: f32) -> Result<(), ActuatorError> {
        let max = self.pwm.max_duty_cycle();
        let duty = (level.clamp(0.0, 1.0) * max as f32) as u16;
        self.pwm
            .set_duty_cycle(duty)
            .map_err(|_| ActuatorError::Pwm)
    }
}
