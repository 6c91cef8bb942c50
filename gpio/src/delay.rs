//! Blocking time source used by everything that has to wait on the hardware.
//!
//! The wiring has no ready signal, so fixed sleeps stand in for it. They go through [Clock] so
//! that the simulated port can run the same code on a virtual timeline.

use std::fmt::Debug;
use std::thread;
use std::time::{Duration, Instant};

pub trait Clock: Debug {
    /// Gets the current instant.
    fn now(&self) -> Instant;

    /// Blocks the calling thread for at least `duration`.
    fn sleep(&self, duration: Duration);
}

/// The wall clock, sleeping with [thread::sleep].
#[derive(Copy, Clone, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            thread::sleep(duration);
        }
    }
}
