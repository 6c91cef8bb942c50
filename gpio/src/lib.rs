pub mod button;
pub mod debounce;
pub mod delay;
pub mod lcd;
pub mod led;
pub mod raw;
pub mod sim;

use std::fmt::Debug;
use thiserror::Error;

#[derive(Debug, Error, Eq, PartialEq, Clone)]
pub enum GpioError {
    #[error("invalid argument")]
    InvalidArgument,
    #[error("unsupported bus width: {0} data pins (only 4-bit mode is supported)")]
    UnsupportedBusWidth(usize),
    #[error("unsupported display geometry: {cols}x{rows} (only 16x2 is supported)")]
    UnsupportedGeometry { rows: u8, cols: u8 },
    #[error("IO error: {0}")]
    Io(std::io::ErrorKind),
}

impl From<std::io::Error> for GpioError {
    fn from(err: std::io::Error) -> Self {
        GpioError::Io(err.kind())
    }
}

pub type GpioResult<T> = Result<T, GpioError>;

/// The function a GPIO pin is switched to.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum PinMode {
    #[default] Input,
    Output,
}

/// Access to a block of GPIO pins, addressed by their BCM numbers.
///
/// All the methods take `&self`, so a single port can be shared by the LCD, the button and the
/// LEDs at once. Implementations are not expected to be thread-safe.
pub trait GpioPort: Debug {
    /// Switches the pin to input or output.
    fn set_mode(&self, pin: usize, mode: PinMode) -> GpioResult<()>;

    /// Drives the pin high (`true`) or low (`false`).
    fn write(&self, pin: usize, level: bool) -> GpioResult<()>;

    /// Reads the current level of the pin.
    fn read(&self, pin: usize) -> GpioResult<bool>;
}

impl dyn GpioPort + '_ {
    /// Writes the values to the given pins.
    /// The values are written as a nibble, LSb first, so `pins[0]` receives bit 0.
    pub fn write_nibble(&self, pins: &[usize; 4], value: u8) -> GpioResult<()> {
        if value > 0b1111 {
            return Err(GpioError::InvalidArgument);
        }

        for (i, &pin) in pins.iter().enumerate() {
            self.write(pin, (value & (1 << i)) != 0)?;
        }
        Ok(())
    }

    /// Configures all the given pins at once, driving them low first when they become outputs.
    pub fn set_mode_all(&self, pins: &[usize], mode: PinMode) -> GpioResult<()> {
        for &pin in pins {
            if mode == PinMode::Output {
                self.write(pin, false)?;
            }
            self.set_mode(pin, mode)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{SimEvent, SimGpio};

    #[test]
    fn write_nibble_is_lsb_first() {
        let sim = SimGpio::new();
        let port: &dyn GpioPort = &sim;

        port.write_nibble(&[4, 5, 6, 7], 0b0110).unwrap();

        assert_eq!(
            sim.events(),
            vec![
                SimEvent::Write(4, false),
                SimEvent::Write(5, true),
                SimEvent::Write(6, true),
                SimEvent::Write(7, false),
            ]
        );
    }

    #[test]
    fn write_nibble_rejects_wide_values() {
        let sim = SimGpio::new();
        let port: &dyn GpioPort = &sim;

        assert_eq!(port.write_nibble(&[0, 1, 2, 3], 0x10), Err(GpioError::InvalidArgument));
        assert!(sim.events().is_empty());
    }

    #[test]
    fn outputs_are_driven_low_before_switching() {
        let sim = SimGpio::new();
        let port: &dyn GpioPort = &sim;

        port.set_mode_all(&[3, 9], PinMode::Output).unwrap();

        assert_eq!(
            sim.events(),
            vec![
                SimEvent::Write(3, false),
                SimEvent::Mode(3, PinMode::Output),
                SimEvent::Write(9, false),
                SimEvent::Mode(9, PinMode::Output),
            ]
        );
    }
}
