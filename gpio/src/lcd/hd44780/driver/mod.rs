//! Low-level HD44780 command set.
//!
//! [HD44780Driver] builds the controller's command bytes and leaves the transfer itself to the
//! implementation. [GpioHD44780Driver] transfers them over a write-only 4-bit parallel bus.

mod gpio;

use crate::{GpioError, GpioResult};
pub use gpio::*;
use std::fmt::Debug;

pub const CMD_CLEAR: u8 = 0b0000_0001;
pub const CMD_HOME: u8 = 0b0000_0010;
pub const CMD_ENTRY_MODE: u8 = 0b0000_0100;
pub const CMD_DISPLAY_CONTROL: u8 = 0b0000_1000;
pub const CMD_FUNCTION_SET: u8 = 0b0010_0000;
pub const CMD_SET_CGRAM_ADDRESS: u8 = 0b0100_0000;
pub const CMD_SET_DDRAM_ADDRESS: u8 = 0b1000_0000;

/// Function set: 8-bit interface.
pub const FUNCTION_DL: u8 = 0b0001_0000;
/// Function set: two display lines.
pub const FUNCTION_N: u8 = 0b0000_1000;
/// Function set: 5x10 font.
pub const FUNCTION_F: u8 = 0b0000_0100;

pub trait HD44780Driver: Debug {
    /// Runs the power-on synchronization and puts the controller in 4-bit mode with one or two
    /// lines. Display control, entry mode and clearing are left to the caller.
    fn init(&mut self, multiline: bool) -> GpioResult<()>;

    /// Clears the display and sets the cursor to the home position.
    fn clear_display(&mut self) -> GpioResult<()> {
        self.send_command(CMD_CLEAR)
    }

    /// Sets the cursor to the home position.
    fn return_home(&mut self) -> GpioResult<()> {
        self.send_command(CMD_HOME)
    }

    /// Sets the display to the specified entry mode.
    fn set_entry_mode(&mut self, cursor_direction: CursorDirection, shift: bool) -> GpioResult<()> {
        let mut command = CMD_ENTRY_MODE;
        if cursor_direction == CursorDirection::Right {
            command |= 0b00000010;
        }
        if shift {
            command |= 0b00000001;
        }
        self.send_command(command)
    }

    /// Sets the display on/off, cursor on/off, and blinking on/off.
    fn set_display_control(
        &mut self,
        display_on: bool,
        cursor_on: bool,
        blink_on: bool,
    ) -> GpioResult<()> {
        let mut command = CMD_DISPLAY_CONTROL;
        if display_on {
            command |= 0b00000100;
        }
        if cursor_on {
            command |= 0b00000010;
        }
        if blink_on {
            command |= 0b00000001;
        }
        self.send_command(command)
    }

    /// Sets the function set.
    fn function_set(&mut self, data_length: bool, two_lines: bool, font: bool) -> GpioResult<()> {
        let mut command = CMD_FUNCTION_SET;
        if data_length {
            command |= FUNCTION_DL;
        }
        if two_lines {
            command |= FUNCTION_N;
        }
        if font {
            command |= FUNCTION_F;
        }
        self.send_command(command)
    }

    /// Sets the CGRAM address.
    fn set_cgram_address(&mut self, address: u8) -> GpioResult<()> {
        if address > 0b00111111 {
            return Err(GpioError::InvalidArgument);
        }
        self.send_command(CMD_SET_CGRAM_ADDRESS | address)
    }

    /// Sets the DDRAM address.
    fn set_ddram_address(&mut self, address: u8) -> GpioResult<()> {
        if address > 0b01111111 {
            return Err(GpioError::InvalidArgument);
        }
        self.send_command(CMD_SET_DDRAM_ADDRESS | address)
    }

    // Low-level transfers, implemented by the bus-specific driver.

    /// Sends a command to the HD44780 controller and waits until it has been executed.
    /// Sets the RS pin to 0 (command).
    fn send_command(&mut self, command: u8) -> GpioResult<()>;

    /// Sends data to the HD44780 controller.
    /// Sets the RS pin to 1 (data).
    fn send_data(&mut self, data: u8) -> GpioResult<()>;
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum CursorDirection {
    /// Moves the cursor to the left after writing data.
    Left,
    /// Moves the cursor to the right after writing data.
    Right,
}
