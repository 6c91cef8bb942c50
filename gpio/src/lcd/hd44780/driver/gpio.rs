use crate::delay::Clock;
use crate::lcd::hd44780::driver::{CMD_CLEAR, CMD_FUNCTION_SET, CMD_HOME, FUNCTION_DL, HD44780Driver};
use crate::{GpioError, GpioPort, GpioResult, PinMode};
use log::{debug, trace};
use std::fmt::{Debug, Formatter};
use std::time::Duration;

/// Data pins of the parallel bus, in bit order (`D0` or `D4` first).
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum LcdDataPins {
    Bus8Bit([usize; 8]),
    Bus4Bit([usize; 4]),
}

impl LcdDataPins {
    /// Gets the number of data lines.
    pub fn width(&self) -> usize {
        match self {
            LcdDataPins::Bus8Bit(_) => 8,
            LcdDataPins::Bus4Bit(_) => 4,
        }
    }
}

impl TryFrom<&[usize]> for LcdDataPins {
    type Error = GpioError;

    fn try_from(pins: &[usize]) -> GpioResult<Self> {
        if let Ok(pins) = <[usize; 4]>::try_from(pins) {
            Ok(LcdDataPins::Bus4Bit(pins))
        } else if let Ok(pins) = <[usize; 8]>::try_from(pins) {
            Ok(LcdDataPins::Bus8Bit(pins))
        } else {
            Err(GpioError::UnsupportedBusWidth(pins.len()))
        }
    }
}

/// Wiring of the display. There is no RW pin: the controller is write-only.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct LcdPins {
    /// Register select, `0` for commands and `1` for data.
    pub rs: usize,
    /// Enable (strobe); data is latched on its falling edge.
    pub strobe: usize,
    pub data: LcdDataPins,
}

/// HD44780 driver over a 4-bit parallel bus made of individual GPIO writes.
///
/// Nothing can be read back from the controller, so every step is followed by a fixed delay long
/// enough for the slowest controllers. The delays must not be shortened.
pub struct GpioHD44780Driver<'a> {
    port: &'a dyn GpioPort,
    clock: &'a dyn Clock,
    pin_rs: usize,
    pin_e: usize,
    data_pins: [usize; 4],
}

impl<'a> GpioHD44780Driver<'a> {
    /// Width of each half of the strobe pulse.
    pub const STROBE_PULSE: Duration = Duration::from_micros(50);
    /// Execution time of a regular command.
    pub const COMMAND_EXECUTION: Duration = Duration::from_millis(2);
    /// Execution time of clear and home.
    pub const LONG_COMMAND_EXECUTION: Duration = Duration::from_millis(5);
    /// Delay between the steps of the power-on synchronization.
    pub const SYNC_DELAY: Duration = Duration::from_millis(35);

    /// Binds the driver to its pins. Only the 4-bit bus is supported; an 8-bit bus fails with
    /// [GpioError::UnsupportedBusWidth] before anything is written.
    pub fn new(port: &'a dyn GpioPort, clock: &'a dyn Clock, pins: LcdPins) -> GpioResult<Self> {
        let data_pins = match pins.data {
            LcdDataPins::Bus4Bit(data_pins) => data_pins,
            LcdDataPins::Bus8Bit(_) => {
                return Err(GpioError::UnsupportedBusWidth(pins.data.width()));
            }
        };

        Ok(GpioHD44780Driver {
            port,
            clock,
            pin_rs: pins.rs,
            pin_e: pins.strobe,
            data_pins,
        })
    }

    fn execution_time(command: u8) -> Duration {
        // Home ignores its lowest bit
        if command == CMD_CLEAR || command & !1 == CMD_HOME {
            Self::LONG_COMMAND_EXECUTION
        } else {
            Self::COMMAND_EXECUTION
        }
    }

    fn pulse_e(&self) -> GpioResult<()> {
        // Set E pin to high
        self.port.write(self.pin_e, true)?;
        self.clock.sleep(Self::STROBE_PULSE);
        // Set E pin to low
        self.port.write(self.pin_e, false)?;
        self.clock.sleep(Self::STROBE_PULSE);
        Ok(())
    }

    fn write_nibble(&self, nibble: u8) -> GpioResult<()> {
        self.port.write_nibble(&self.data_pins, nibble)?;
        self.pulse_e()
    }

    /// Sends a lone nibble in command mode. Only meaningful during synchronization, when the
    /// controller may still be in 8-bit mode.
    fn send_nibble(&mut self, nibble: u8) -> GpioResult<()> {
        trace!("Sending nibble: {:04b}", nibble);
        self.port.write(self.pin_rs, false)?;
        self.write_nibble(nibble)
    }

    fn send(&mut self, data: u8, rs: bool) -> GpioResult<()> {
        trace!("Sending data: {:08b}, RS: {}", data, rs);

        // RS must settle before the first strobe and stay put for both nibbles
        self.port.write(self.pin_rs, rs)?;

        let high_nibble = (data >> 4) & 0x0F;
        let low_nibble = data & 0x0F;
        self.write_nibble(high_nibble)?;
        self.write_nibble(low_nibble)?;

        Ok(())
    }
}

impl Debug for GpioHD44780Driver<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "GpioHD44780Driver({:?}, RS: {}, E: {}, D4-D7: {:?})",
            self.port, self.pin_rs, self.pin_e, self.data_pins
        )
    }
}

impl HD44780Driver for GpioHD44780Driver<'_> {
    fn init(&mut self, multiline: bool) -> GpioResult<()> {
        debug!("Synchronizing HD44780 on {:?}", self);

        self.port.set_mode_all(&[self.pin_rs, self.pin_e], PinMode::Output)?;
        self.port.set_mode_all(&self.data_pins, PinMode::Output)?;
        self.clock.sleep(Self::SYNC_DELAY);

        // Three times 8-bit mode gets the controller out of any state, including the middle of
        // a 4-bit transfer
        for _ in 0..3 {
            self.send_nibble((CMD_FUNCTION_SET | FUNCTION_DL) >> 4)?;
            self.clock.sleep(Self::SYNC_DELAY);
        }
        self.send_nibble(CMD_FUNCTION_SET >> 4)?;
        self.clock.sleep(Self::SYNC_DELAY);

        // Lines can only be set once in 4-bit mode
        self.function_set(false, multiline, false)?;
        self.clock.sleep(Self::SYNC_DELAY);

        Ok(())
    }

    fn send_command(&mut self, command: u8) -> GpioResult<()> {
        self.send(command, false)?;
        self.clock.sleep(Self::execution_time(command));
        Ok(())
    }

    fn send_data(&mut self, data: u8) -> GpioResult<()> {
        self.send(data, true)
    }
}
