//! Actuator power rail on a GPIO enable pin
//!
//! The enable pin drives the regulator that feeds the servo. The pin can
//! be active-high (default) or active-low.

use embedded_hal::digital::OutputPin;

use blandpanel_core::traits::{ActuatorError, PowerRail};

/// Rail switched by a GPIO output
pub struct GpioRail<P> {
    pin: P,
    /// If true, rail ON = pin LOW
    inverted: bool,
}

impl<P: OutputPin> GpioRail<P> {
    /// Create a rail driver, leaving the rail de-energized
    pub fn new(pin: P, inverted: bool) -> Result<Self, ActuatorError> {
        let mut rail = Self { pin, inverted };
        rail.set_energized(false)?;
        Ok(rail)
    }

    /// Create a rail driver with an active-high enable
    pub fn new_active_high(pin: P) -> Result<Self, ActuatorError> {
        Self::new(pin, false)
    }

    /// Create a rail driver with an active-low enable
    pub fn new_active_low(pin: P) -> Result<Self, ActuatorError> {
        Self::new(pin, true)
    }
}

impl<P: OutputPin> PowerRail for GpioRail<P> {
    fn set_energized(&mut self, energized: bool) -> Result<(), ActuatorError> {
        let result = if energized != self.inverted {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        result.map_err(|_| ActuatorError::Pin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct PinFault;

    impl embedded_hal::digital::Error for PinFault {
        fn kind(&self) -> embedded_hal::digital::ErrorKind {
            embedded_hal::digital::ErrorKind::Other
        }
    }

    /// Mock GPIO pin for testing
    struct MockPin {
        high: bool,
        broken: bool,
    }

    impl MockPin {
        fn new() -> Self {
            Self {
                high: false,
                broken: false,
            }
        }
    }

    impl embedded_hal::digital::ErrorType for MockPin {
        type Error = PinFault;
    }

    impl OutputPin for MockPin {
        fn set_high(&mut self) -> Result<(), Self::Error> {
            if self.broken {
                return Err(PinFault);
            }
            self.high = true;
            Ok(())
        }

        fn set_low(&mut self) -> Result<(), Self::Error> {
            if self.broken {
                return Err(PinFault);
            }
            self.high = false;
            Ok(())
        }
    }

    #[test]
    fn test_active_high_rail() {
        let mut rail = GpioRail::new_active_high(MockPin::new()).unwrap();

        // Initially off
        assert!(!rail.pin.high);

        rail.set_energized(true).unwrap();
        assert!(rail.pin.high);

        rail.set_energized(false).unwrap();
        assert!(!rail.pin.high);
    }

    #[test]
    fn test_active_low_rail() {
        let mut rail = GpioRail::new_active_low(MockPin::new()).unwrap();

        // Off means pin high for active-low
        assert!(rail.pin.high);

        rail.set_energized(true).unwrap();
        assert!(!rail.pin.high);
    }

    #[test]
    fn test_pin_failure_reported() {
        let mut rail = GpioRail::new_active_high(MockPin::new()).unwrap();

        rail.pin.broken = true;
        assert_eq!(rail.set_energized(true), Err(ActuatorError::Pin));
        assert!(!rail.pin.high);
    }
}
