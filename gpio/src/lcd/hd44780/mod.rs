//! HD44780 LCD module.
//!
//! [driver] holds the raw command set and the GPIO transfer protocol; [Lcd] sits on top of it and
//! keeps the cursor and the display control register in sync with the controller.

pub mod driver;
mod display;

pub use display::*;
