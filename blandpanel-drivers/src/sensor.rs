//! Position sensor reading helpers
//!
//! The RP2040 ADC converts to 12 bits. The calibration points are in
//! 16-bit counts, so readings are widened before use.

use blandpanel_core::traits::{PositionSensor, SensorError};

/// Largest 12-bit ADC count
pub const ADC_12BIT_MAX: u16 = 0x0FFF;

/// Widen a 12-bit ADC count to the full 16-bit range
///
/// Replicates the top bits into the low nibble so 0 maps to 0 and
/// 0xFFF maps to 0xFFFF.
pub fn widen_12bit(raw: u16) -> u16 {
    let raw = raw.min(ADC_12BIT_MAX);
    (raw << 4) | (raw >> 8)
}

/// One blocking 12-bit conversion on a fixed channel
pub trait Conversion12 {
    type Error;

    /// Convert once and return the raw 12-bit count
    fn convert(&mut self) -> Result<u16, Self::Error>;
}

/// Position sensor over a 12-bit converter
pub struct Adc12Sensor<C> {
    converter: C,
}

impl<C: Conversion12> Adc12Sensor<C> {
    pub fn new(converter: C) -> Self {
        Self { converter }
    }
}

impl<C: Conversion12> PositionSensor for Adc12Sensor<C> {
    fn read_raw(&mut self) -> Result<u16, SensorError> {
        let raw = self
            .converter
            .convert()
            .map_err(|_| SensorError::ConversionError)?;
        Ok(widen_12bit(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Converter returning a fixed count, or failing
    struct FixedConverter(Option<u16>);

    impl Conversion12 for FixedConverter {
        type Error = ();

        fn convert(&mut self) -> Result<u16, ()> {
            self.0.ok_or(())
        }
    }

    #[test]
    fn test_widen_endpoints() {
        assert_eq!(widen_12bit(0), 0);
        assert_eq!(widen_12bit(ADC_12BIT_MAX), u16::MAX);
        assert_eq!(widen_12bit(0x800), 0x8008);
    }

    #[test]
    fn test_widen_saturates() {
        assert_eq!(widen_12bit(0xFFFF), u16::MAX);
    }

    #[test]
    fn test_sensor_reads_widened() {
        let mut sensor = Adc12Sensor::new(FixedConverter(Some(0x123)));
        assert_eq!(sensor.read_raw(), Ok(0x1231));
    }

    #[test]
    fn test_sensor_error_mapped() {
        let mut sensor = Adc12Sensor::new(FixedConverter(None));
        assert_eq!(sensor.read_raw(), Err(SensorError::ConversionError));
    }
}
