//! Where the game shows its two lines of text.

use crate::score::Score;
use mastermind_gpio::GpioResult;
use mastermind_gpio::lcd::hd44780::driver::HD44780Driver;
use mastermind_gpio::lcd::hd44780::{LCD_COLS, Lcd};

/// A two-line text surface.
pub trait Screen {
    /// Replaces the contents with `top` and `bottom`.
    fn show(&mut self, top: &str, bottom: &str) -> GpioResult<()>;
}

impl<D: HD44780Driver> Screen for Lcd<D> {
    fn show(&mut self, top: &str, bottom: &str) -> GpioResult<()> {
        self.clear()?;
        self.set_position(0, 0)?;
        self.put_string(&clip(top))?;
        self.set_position(0, 1)?;
        self.put_string(&clip(bottom))
    }
}

/// Prints the lines on standard output, for playing without the display.
#[derive(Debug, Default)]
pub struct ConsoleScreen;

impl Screen for ConsoleScreen {
    fn show(&mut self, top: &str, bottom: &str) -> GpioResult<()> {
        println!("{}", top);
        if !bottom.is_empty() {
            println!("{}", bottom);
        }
        Ok(())
    }
}

/// Cuts the line to the width of the display.
fn clip(line: &str) -> String {
    line.chars().take(LCD_COLS as usize).collect()
}

/// Top line after a guess, e.g. `Guess 3: 1 2`.
pub fn result_line(tries: u32, score: &Score) -> String {
    format!("Guess {}: {} {}", tries, score.exact_matches, score.value_matches)
}

/// Bottom line after a guess: each digit followed by a space.
pub fn guess_line(guess: &[u32]) -> String {
    guess.iter().map(|digit| format!("{} ", digit)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mastermind_gpio::lcd::hd44780::driver::{LcdDataPins, LcdPins};
    use mastermind_gpio::lcd::hd44780::LCD_ROWS;
    use mastermind_gpio::sim::SimGpio;

    const PINS: LcdPins = LcdPins {
        rs: 25,
        strobe: 24,
        data: LcdDataPins::Bus4Bit([23, 10, 27, 22]),
    };

    #[test]
    fn formats_result_lines() {
        let score = Score { won: false, exact_matches: 1, value_matches: 2 };

        assert_eq!(result_line(3, &score), "Guess 3: 1 2");
        assert_eq!(guess_line(&[1, 0, 4]), "1 0 4 ");
        assert_eq!(guess_line(&[]), "");
    }

    #[test]
    fn lcd_lines_are_clipped_to_the_display() {
        let sim = SimGpio::new();
        let mut lcd = Lcd::initialize(&sim, &sim, PINS, LCD_ROWS, LCD_COLS).unwrap();
        sim.clear_events();

        lcd.show("Guess 1: 0 0", "1 2 3 4 5 6 7 8 9 ").unwrap();

        let data: Vec<u8> = sim
            .latched_nibbles(PINS.rs, PINS.strobe, [23, 10, 27, 22])
            .chunks(2)
            .filter(|pair| pair[0].rs)
            .map(|pair| pair[0].nibble << 4 | pair[1].nibble)
            .collect();
        assert_eq!(data, b"Guess 1: 0 01 2 3 4 5 6 7 8 ".to_vec());
    }
}
