//! Pin Driver Module
//!
//! Abstraction over the hardware that validated operations are applied to.
//! `SimulatedPins` keeps pin levels in memory and is used when no real GPIO
//! backend is wired in.

use super::PIN_COUNT;
use std::collections::HashMap;

/// Errors reported by a pin driver
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DriverError {
    #[error("pin {pin} is not available")]
    PinUnavailable { pin: u8 },
}

/// Low-level pin access
///
/// Implementations are driven from a single task at a time; the executor
/// serialises access, so methods take `&mut self`.
pub trait PinDriver: Send {
    /// Drive the pin high or low
    fn digital_write(&mut self, pin: u8, high: bool) -> Result<(), DriverError>;

    /// Set the PWM duty cycle (0 = off, 255 = fully on)
    fn pwm_write(&mut self, pin: u8, duty_cycle: u8) -> Result<(), DriverError>;

    /// Read the current level of the pin
    fn read(&mut self, pin: u8) -> Result<u8, DriverError>;
}

/// In-memory pin bank
///
/// Every pin starts at level 0. Digital writes store 0 or 1, PWM writes store
/// the duty cycle, and reads return whatever was stored last.
#[derive(Debug, Default)]
pub struct SimulatedPins {
    levels: HashMap<u8, u8>,
}

impl SimulatedPins {
    pub fn new() -> Self {
        Self::default()
    }

    fn check_pin(pin: u8) -> Result<(), DriverError> {
        if pin < PIN_COUNT {
            Ok(())
        } else {
            Err(DriverError::PinUnavailable { pin })
        }
    }
}

impl PinDriver for SimulatedPins {
    fn digital_write(&mut self, pin: u8, high: bool) -> Result<(), DriverError> {
        Self::check_pin(pin)?;
        self.levels.insert(pin, u8::from(high));
        Ok(())
    }

    fn pwm_write(&mut self, pin: u8, duty_cycle: u8) -> Result<(), DriverError> {
        Self::check_pin(pin)?;
        self.levels.insert(pin, duty_cycle);
        Ok(())
    }

    fn read(&mut self, pin: u8) -> Result<u8, DriverError> {
        Self::check_pin(pin)?;
        Ok(self.levels.get(&pin).copied().unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pins_start_low() {
        let mut pins = SimulatedPins::new();
        assert_eq!(pins.read(17), Ok(0));
    }

    #[test]
    fn test_writes_are_read_back() {
        let mut pins = SimulatedPins::new();
        pins.digital_write(4, true).unwrap();
        pins.pwm_write(17, 128).unwrap();

        assert_eq!(pins.read(4), Ok(1));
        assert_eq!(pins.read(17), Ok(128));

        pins.digital_write(17, false).unwrap();
        assert_eq!(pins.read(17), Ok(0));
    }

    #[test]
    fn test_every_registrable_pin_is_available() {
        let mut pins = SimulatedPins::new();
        assert_eq!(pins.read(crate::registry::MAX_PIN), Ok(0));
        assert_eq!(PIN_COUNT, crate::registry::MAX_PIN + 1);
    }

    #[test]
    fn test_out_of_range_pin_is_unavailable() {
        let mut pins = SimulatedPins::new();
        assert_eq!(pins.read(PIN_COUNT), Err(DriverError::PinUnavailable { pin: PIN_COUNT }));
        assert!(pins.pwm_write(200, 1).is_err());
    }
}
