//! Plain on/off LED used for blink feedback.
use crate::delay::Clock;
use crate::{GpioPort, GpioResult, PinMode};
use std::fmt::{Debug, Formatter};
use std::time::Duration;

pub struct Led<'a> {
    port: &'a dyn GpioPort,
    clock: &'a dyn Clock,
    pin: usize,
}

impl<'a> Led<'a> {
    pub const ON_TIME: Duration = Duration::from_millis(300);
    pub const OFF_TIME: Duration = Duration::from_millis(200);

    /// Creates an LED on `pin`, switching it to a low output.
    pub fn new(port: &'a dyn GpioPort, clock: &'a dyn Clock, pin: usize) -> GpioResult<Self> {
        port.write(pin, false)?;
        port.set_mode(pin, PinMode::Output)?;
        Ok(Led { port, clock, pin })
    }

    pub fn set(&self, on: bool) -> GpioResult<()> {
        self.port.write(self.pin, on)
    }

    /// Blinks `count` times. Blocks for `count * (ON_TIME + OFF_TIME)`.
    pub fn blink(&self, count: u32) -> GpioResult<()> {
        for _ in 0..count {
            self.set(true)?;
            self.clock.sleep(Self::ON_TIME);
            self.set(false)?;
            self.clock.sleep(Self::OFF_TIME);
        }
        Ok(())
    }
}

impl Debug for Led<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Led({:?}[{}])", self.port, self.pin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{SimEvent, SimGpio};

    #[test]
    fn blinks_the_requested_number_of_times() {
        let sim = SimGpio::new();
        let led = Led::new(&sim, &sim, 13).unwrap();
        sim.clear_events();

        led.blink(2).unwrap();

        let on = SimEvent::Write(13, true);
        let off = SimEvent::Write(13, false);
        let on_time = SimEvent::Sleep(Led::ON_TIME);
        let off_time = SimEvent::Sleep(Led::OFF_TIME);
        assert_eq!(
            sim.events(),
            vec![on, on_time, off, off_time, on, on_time, off, off_time]
        );
        assert_eq!(sim.elapsed(), Duration::from_millis(1000));
    }

    #[test]
    fn zero_blinks_do_nothing() {
        let sim = SimGpio::new();
        let led = Led::new(&sim, &sim, 5).unwrap();
        sim.clear_events();

        led.blink(0).unwrap();

        assert!(sim.events().is_empty());
        assert_eq!(sim.mode(5), Some(PinMode::Output));
    }
}
