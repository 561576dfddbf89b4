//! Shutter position sensor trait

/// Errors that can occur while reading the position sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorError {
    /// ADC conversion failed
    ConversionError,
}

impl core::fmt::Display for SensorError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SensorError::ConversionError => f.write_str("Sensor read failed"),
        }
    }
}

/// Analog feedback proportional to the shutter angle
///
/// Readings are raw counts scaled to the full 16-bit range, so the
/// calibration points do not depend on the ADC resolution.
pub trait PositionSensor {
    /// Take a single raw reading
    ///
    /// Takes `&mut self` because ADC reads typically require mutable access.
    fn read_raw(&mut self) -> Result<u16, SensorError>;
}
