use crate::delay::Clock;
use crate::lcd::hd44780::driver::{CursorDirection, GpioHD44780Driver, HD44780Driver, LcdPins};
use crate::{GpioError, GpioPort, GpioResult};
use log::{debug, trace, warn};
use std::fmt::Debug;

/// Number of rows of the supported display.
pub const LCD_ROWS: u8 = 2;
/// Number of columns of the supported display.
pub const LCD_COLS: u8 = 16;

/// DDRAM address of the first column of each row.
const ROW_OFFSETS: [u8; LCD_ROWS as usize] = [0x00, 0x40];

/// Shadow of the controller's display control register, which cannot be read back.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct DisplayControl {
    pub display_on: bool,
    pub cursor_on: bool,
    pub blink_on: bool,
}

/// A 16x2 character display.
///
/// Keeps track of the logical cursor so that text wraps from the end of one row to the start of
/// the next, which the controller's own address counter does not do (row 1 starts at `0x40`, not
/// right after row 0).
#[derive(Debug)]
pub struct Lcd<D: HD44780Driver> {
    driver: D,
    rows: u8,
    cols: u8,
    cursor_x: u8,
    cursor_y: u8,
    control: DisplayControl,
}

impl<'a> Lcd<GpioHD44780Driver<'a>> {
    /// Binds the display to its pins and runs the whole initialization.
    ///
    /// # Errors
    /// - [GpioError::UnsupportedGeometry] for anything but 16x2.
    /// - [GpioError::UnsupportedBusWidth] for an 8-bit bus.
    ///
    /// Both are reported before any pin is touched.
    pub fn initialize(
        port: &'a dyn GpioPort,
        clock: &'a dyn Clock,
        pins: LcdPins,
        rows: u8,
        cols: u8,
    ) -> GpioResult<Self> {
        Self::check_geometry(rows, cols)?;
        let driver = GpioHD44780Driver::new(port, clock, pins)?;
        Self::new(driver, rows, cols)
    }
}

impl<D: HD44780Driver> Lcd<D> {
    /// Initializes the controller behind `driver`: synchronization, display on with cursor and
    /// blinking off, clear, and left-to-right entry mode.
    pub fn new(mut driver: D, rows: u8, cols: u8) -> GpioResult<Self> {
        Self::check_geometry(rows, cols)?;

        driver.init(rows > 1)?;

        let mut lcd = Lcd {
            driver,
            rows,
            cols,
            cursor_x: 0,
            cursor_y: 0,
            control: DisplayControl::default(),
        };

        lcd.set_display(true)?;
        lcd.set_cursor(false)?;
        lcd.set_cursor_blink(false)?;
        lcd.clear()?;
        lcd.driver.set_entry_mode(CursorDirection::Right, false)?;

        debug!("{:?} initialized.", lcd.driver);

        Ok(lcd)
    }

    fn check_geometry(rows: u8, cols: u8) -> GpioResult<()> {
        if rows != LCD_ROWS || cols != LCD_COLS {
            return Err(GpioError::UnsupportedGeometry { rows, cols });
        }
        Ok(())
    }

    fn address(x: u8, y: u8) -> u8 {
        ROW_OFFSETS[y as usize] + x
    }

    /// Gets the cursor position as `(x, y)`.
    pub fn cursor(&self) -> (u8, u8) {
        (self.cursor_x, self.cursor_y)
    }

    pub fn control(&self) -> DisplayControl {
        self.control
    }

    /// Clears the display and moves the cursor home.
    pub fn clear(&mut self) -> GpioResult<()> {
        self.driver.clear_display()?;
        self.driver.return_home()?;
        self.cursor_x = 0;
        self.cursor_y = 0;
        Ok(())
    }

    /// Moves the cursor to the top-left corner without touching the contents.
    pub fn home(&mut self) -> GpioResult<()> {
        self.driver.return_home()?;
        self.cursor_x = 0;
        self.cursor_y = 0;
        Ok(())
    }

    /// Moves the cursor to column `x` of row `y`. Positions outside the display are ignored.
    pub fn set_position(&mut self, x: u8, y: u8) -> GpioResult<()> {
        if x >= self.cols || y >= self.rows {
            trace!("Ignoring cursor position ({}, {}) outside the display", x, y);
            return Ok(());
        }

        self.driver.set_ddram_address(Self::address(x, y))?;
        self.cursor_x = x;
        self.cursor_y = y;
        Ok(())
    }

    /// Writes a character at the cursor and advances it. Past the last column, the cursor wraps
    /// to the start of the next row, and from the last row back to the first.
    pub fn put_char(&mut self, c: u8) -> GpioResult<()> {
        self.driver.send_data(c)?;

        self.cursor_x += 1;
        if self.cursor_x == self.cols {
            self.cursor_x = 0;
            self.cursor_y = (self.cursor_y + 1) % self.rows;

            self.driver.set_ddram_address(Self::address(self.cursor_x, self.cursor_y))?;
        }
        Ok(())
    }

    /// Writes the string character by character. Characters outside ASCII are shown as `?`.
    pub fn put_string(&mut self, s: &str) -> GpioResult<()> {
        for c in s.chars() {
            if c.is_ascii() {
                self.put_char(c as u8)?;
            } else {
                warn!("Non-ASCII character: {}", c);
                self.put_char(b'?')?;
            }
        }
        Ok(())
    }

    fn update_control(&mut self, control: DisplayControl) -> GpioResult<()> {
        self.control = control;
        self.driver.set_display_control(control.display_on, control.cursor_on, control.blink_on)
    }

    pub fn set_display(&mut self, on: bool) -> GpioResult<()> {
        self.update_control(DisplayControl { display_on: on, ..self.control })
    }

    pub fn set_cursor(&mut self, on: bool) -> GpioResult<()> {
        self.update_control(DisplayControl { cursor_on: on, ..self.control })
    }

    pub fn set_cursor_blink(&mut self, on: bool) -> GpioResult<()> {
        self.update_control(DisplayControl { blink_on: on, ..self.control })
    }

    /// Defines custom character `index` (0–7) from 8 rows of 5 pixels, top row first, each in the
    /// lowest 5 bits. Writing byte `index` afterward shows the glyph.
    ///
    /// The cursor position is kept.
    pub fn define_char(&mut self, index: u8, pattern: &[u8; 8]) -> GpioResult<()> {
        if index > 7 {
            return Err(GpioError::InvalidArgument);
        }

        self.driver.set_cgram_address(index << 3)?;
        for row in pattern {
            self.driver.send_data(row & 0b11111)?;
        }

        // CGRAM writes moved the address counter away from the display
        self.driver.set_ddram_address(Self::address(self.cursor_x, self.cursor_y))
    }
}
