//! Actuator traits: shutter servo, panel light output, actuator power rail

/// Errors that can occur when driving an output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ActuatorError {
    /// PWM peripheral rejected the duty cycle
    Pwm,
    /// GPIO write failed
    Pin,
}

impl core::fmt::Display for ActuatorError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ActuatorError::Pwm => f.write_str("Actuator write failed"),
            ActuatorError::Pin => f.write_str("Rail switch failed"),
        }
    }
}

/// Hobby servo positioned by pulse width
///
/// The servo has no feedback of its own; position is verified through a
/// separate [`PositionSensor`](super::PositionSensor).
pub trait ServoActuator {
    /// Command a pulse width as a fraction of the servo's pulse range
    ///
    /// 0.0 is the shortest pulse and 1.0 the longest. Values slightly
    /// outside that range are valid and come from calibration slack.
    fn set_pulse_fraction(&mut self, fraction: f32) -> Result<(), ActuatorError>;
}

/// Dimmable panel light output
pub trait PanelOutput {
    /// Set the output level (0.0 = off, 1.0 = full scale)
    fn set_level(&mut self, level: f32) -> Result<(), ActuatorError>;
}

/// Switchable supply for the actuator subsystem
///
/// De-energizing the rail removes power from the servo. The panel light
/// is not on this rail.
pub trait PowerRail {
    /// Energize or de-energize the rail
    fn set_energized(&mut self, energized: bool) -> Result<(), ActuatorError>;
}
