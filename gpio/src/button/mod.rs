//! Turns presses of a single pushbutton into numbers.
//!
//! The player enters a digit by pressing the button that many times within a fixed window. See
//! [ButtonSampler::sample_guess] for the exact timing.

use crate::debounce::RisingEdge;
use crate::delay::Clock;
use crate::{GpioError, GpioPort, GpioResult, PinMode};
use log::{debug, trace};
use std::fmt::{Debug, Formatter};
use std::time::Duration;

/// Counts button presses within a time window.
pub struct ButtonSampler<'a> {
    port: &'a dyn GpioPort,
    clock: &'a dyn Clock,
    pin: usize,
    poll_interval: Duration,
}

impl<'a> ButtonSampler<'a> {
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(200);
    /// Sampling time granted per unit of the value range.
    pub const WINDOW_PER_UNIT: Duration = Duration::from_millis(1500);

    /// Creates a sampler for the button on `pin`, switching the pin to input.
    pub fn new(port: &'a dyn GpioPort, clock: &'a dyn Clock, pin: usize) -> GpioResult<Self> {
        port.set_mode(pin, PinMode::Input)?;
        Ok(ButtonSampler {
            port,
            clock,
            pin,
            poll_interval: Self::DEFAULT_POLL_INTERVAL,
        })
    }

    /// Sets the delay between two consecutive polls of the button. It has to be non-zero, since
    /// the sampling window only advances while waiting between polls.
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> GpioResult<Self> {
        if poll_interval.is_zero() {
            return Err(GpioError::InvalidArgument);
        }
        self.poll_interval = poll_interval;
        Ok(self)
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Samples a single digit in `0..=num_range`.
    ///
    /// The button is polled in bursts of `num_range * 2` polls, [Self::poll_interval] apart. A
    /// press ends the burst early. Bursts repeat until `num_range * WINDOW_PER_UNIT` has elapsed
    /// since the call; the deadline is only checked between bursts, so the call always finishes
    /// the burst it is in. Presses beyond `num_range` are counted as `num_range`.
    ///
    /// This always blocks for the whole window, no matter how many presses were seen.
    ///
    /// # Errors
    /// [GpioError::InvalidArgument] if `num_range` is so large that the window cannot be
    /// represented.
    pub fn sample_guess(&self, num_range: u32) -> GpioResult<u32> {
        let start = self.clock.now();
        let budget = Self::WINDOW_PER_UNIT
            .checked_mul(num_range)
            .ok_or(GpioError::InvalidArgument)?;
        let polls = num_range.checked_mul(2).ok_or(GpioError::InvalidArgument)?;

        let mut edge = RisingEdge::new();
        let mut count = 0;

        while self.clock.now().duration_since(start) < budget {
            for _ in 0..polls {
                if edge.update(self.port.read(self.pin)?) {
                    count = (count + 1).min(num_range);
                    trace!("Button press registered, count={}", count);
                    break;
                }
                self.clock.sleep(self.poll_interval);
            }
        }

        debug!("Sampled {} press(es) on GPIO {}", count, self.pin);
        Ok(count)
    }

    /// Samples `length` digits one after another, each with its own window.
    pub fn sample_sequence(&self, length: usize, num_range: u32) -> GpioResult<Vec<u32>> {
        (0..length).map(|_| self.sample_guess(num_range)).collect()
    }
}

impl Debug for ButtonSampler<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "ButtonSampler({:?}[{}])", self.port, self.pin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{SimEvent, SimGpio};

    const BUTTON: usize = 19;

    fn pressed_between(windows: &'static [(u64, u64)]) -> impl Fn(Duration) -> bool {
        move |t| {
            let ms = t.as_millis() as u64;
            windows.iter().any(|&(from, to)| ms >= from && ms < to)
        }
    }

    #[test]
    fn never_pressed_returns_zero_after_full_window() {
        let sim = SimGpio::new();
        let sampler = ButtonSampler::new(&sim, &sim, BUTTON).unwrap();

        assert_eq!(sampler.sample_guess(4).unwrap(), 0);
        assert!(sim.elapsed() >= Duration::from_secs(6));
    }

    #[test]
    fn counts_distinct_presses() {
        let sim = SimGpio::new();
        sim.drive_input(BUTTON, pressed_between(&[(1000, 1300), (2000, 2300)]));
        let sampler = ButtonSampler::new(&sim, &sim, BUTTON).unwrap();

        assert_eq!(sampler.sample_guess(4).unwrap(), 2);
    }

    #[test]
    fn holding_the_button_counts_once() {
        let sim = SimGpio::new();
        sim.drive_input(BUTTON, |_| true);
        let sampler = ButtonSampler::new(&sim, &sim, BUTTON).unwrap();

        assert_eq!(sampler.sample_guess(4).unwrap(), 1);
    }

    #[test]
    fn held_button_saturates_single_unit_range() {
        let sim = SimGpio::new();
        sim.drive_input(BUTTON, |_| true);
        let sampler = ButtonSampler::new(&sim, &sim, BUTTON).unwrap();

        assert_eq!(sampler.sample_guess(1).unwrap(), 1);
    }

    #[test]
    fn excess_presses_saturate() {
        let sim = SimGpio::new();
        // A new press every 400 ms, far more than 3 in a 4.5 s window
        sim.drive_input(BUTTON, |t| (t.as_millis() / 200) % 2 == 1);
        let sampler = ButtonSampler::new(&sim, &sim, BUTTON).unwrap();

        assert_eq!(sampler.sample_guess(3).unwrap(), 3);
    }

    #[test]
    fn window_is_bounded_by_one_extra_burst() {
        let sim = SimGpio::new();
        let sampler = ButtonSampler::new(&sim, &sim, BUTTON).unwrap();

        sampler.sample_guess(2).unwrap();

        let budget = Duration::from_secs(3);
        let burst = Duration::from_millis(200) * 4;
        assert!(sim.elapsed() >= budget);
        assert!(sim.elapsed() <= budget + burst);
    }

    #[test]
    fn each_digit_starts_with_a_released_button() {
        let sim = SimGpio::new();
        sim.drive_input(BUTTON, |_| true);
        let sampler = ButtonSampler::new(&sim, &sim, BUTTON).unwrap();

        assert_eq!(sampler.sample_sequence(3, 3).unwrap(), vec![1, 1, 1]);
    }

    #[test]
    fn zero_range_returns_immediately() {
        let sim = SimGpio::new();
        let sampler = ButtonSampler::new(&sim, &sim, BUTTON).unwrap();

        assert_eq!(sampler.sample_guess(0).unwrap(), 0);
        assert_eq!(sim.elapsed(), Duration::ZERO);
    }

    #[test]
    fn zero_poll_interval_is_rejected() {
        let sim = SimGpio::new();
        let sampler = ButtonSampler::new(&sim, &sim, BUTTON).unwrap();

        assert_eq!(
            sampler.with_poll_interval(Duration::ZERO).err(),
            Some(GpioError::InvalidArgument)
        );
    }

    #[test]
    fn custom_poll_interval_paces_the_bursts() {
        let sim = SimGpio::new();
        let sampler = ButtonSampler::new(&sim, &sim, BUTTON)
            .unwrap()
            .with_poll_interval(Duration::from_millis(50))
            .unwrap();

        sampler.sample_guess(1).unwrap();

        assert_eq!(sampler.poll_interval(), Duration::from_millis(50));
        assert!(sim.events().contains(&SimEvent::Sleep(Duration::from_millis(50))));
        assert!(!sim.events().contains(&SimEvent::Sleep(ButtonSampler::DEFAULT_POLL_INTERVAL)));
    }

    #[test]
    fn oversized_range_is_rejected_before_polling() {
        let sim = SimGpio::new();
        let sampler = ButtonSampler::new(&sim, &sim, BUTTON).unwrap();
        sim.clear_events();

        assert_eq!(sampler.sample_guess(u32::MAX), Err(GpioError::InvalidArgument));
        assert!(sim.events().is_empty());
    }

    #[test]
    fn pin_is_switched_to_input() {
        let sim = SimGpio::new();
        let _sampler = ButtonSampler::new(&sim, &sim, BUTTON).unwrap();

        assert_eq!(sim.mode(BUTTON), Some(PinMode::Input));
    }
}
