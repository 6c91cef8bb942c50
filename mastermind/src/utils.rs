use eyre::eyre;
use std::io::{BufRead, Write};
use std::ops::{RangeBounds, RangeInclusive};
use std::str::FromStr;

pub trait WithinExt {
    fn within(&self, range: impl RangeBounds<Self>) -> bool;
}

impl <T: PartialOrd<T>> WithinExt for T {
    fn within(&self, range: impl RangeBounds<Self>) -> bool {
        range.contains(self)
    }
}

/// Asks for a number in `range` until one is given.
///
/// # Errors
/// If the input ends or cannot be read.
pub fn prompt_number<T>(
    input: &mut impl BufRead,
    output: &mut impl Write,
    prompt: &str,
    range: RangeInclusive<T>,
) -> eyre::Result<T>
where
    T: FromStr + PartialOrd + Clone + std::fmt::Display,
{
    loop {
        writeln!(output, "{}", prompt)?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Err(eyre!("input ended before {} was entered", prompt));
        }

        match line.trim().parse::<T>() {
            Ok(value) if value.within(range.clone()) => return Ok(value),
            _ => writeln!(
                output,
                "Please enter a number from {} to {}.",
                range.start(),
                range.end()
            )?,
        }
    }
}
