//! Simulated GPIO port running on a virtual clock.
//!
//! [SimGpio] implements both [GpioPort] and [Clock]. Sleeping only advances the virtual time, and
//! every mode change, write, read and sleep is recorded, so tests can check exact bus activity
//! without touching hardware or waiting in real time.

use crate::delay::Clock;
use crate::{GpioPort, GpioResult, PinMode};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter};
use std::time::{Duration, Instant};

/// A single recorded interaction with the simulated port.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SimEvent {
    Mode(usize, PinMode),
    Write(usize, bool),
    Read(usize, bool),
    Sleep(Duration),
}

/// A nibble latched by the LCD controller on the falling edge of the strobe.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct LatchedNibble {
    /// Level of the register select pin while the strobe was high.
    pub rs: bool,
    pub nibble: u8,
}

type InputScript = Box<dyn Fn(Duration) -> bool>;

pub struct SimGpio {
    epoch: Instant,
    elapsed: Cell<Duration>,
    levels: RefCell<BTreeMap<usize, bool>>,
    modes: RefCell<BTreeMap<usize, PinMode>>,
    inputs: RefCell<BTreeMap<usize, InputScript>>,
    events: RefCell<Vec<SimEvent>>,
}

impl SimGpio {
    pub fn new() -> Self {
        SimGpio {
            epoch: Instant::now(),
            elapsed: Cell::new(Duration::ZERO),
            levels: RefCell::new(BTreeMap::new()),
            modes: RefCell::new(BTreeMap::new()),
            inputs: RefCell::new(BTreeMap::new()),
            events: RefCell::new(Vec::new()),
        }
    }

    /// Makes reads of `pin` return `script(elapsed)`, where `elapsed` is the virtual time since
    /// the port was created.
    pub fn drive_input(&self, pin: usize, script: impl Fn(Duration) -> bool + 'static) {
        self.inputs.borrow_mut().insert(pin, Box::new(script));
    }

    /// Gets the virtual time since the port was created.
    pub fn elapsed(&self) -> Duration {
        self.elapsed.get()
    }

    /// Gets the last level written to the pin.
    pub fn level(&self, pin: usize) -> bool {
        self.levels.borrow().get(&pin).copied().unwrap_or(false)
    }

    /// Gets the last mode the pin was switched to.
    pub fn mode(&self, pin: usize) -> Option<PinMode> {
        self.modes.borrow().get(&pin).copied()
    }

    pub fn events(&self) -> Vec<SimEvent> {
        self.events.borrow().clone()
    }

    pub fn clear_events(&self) {
        self.events.borrow_mut().clear();
    }

    /// Replays the recorded writes and collects every nibble an HD44780 wired to `rs`, `strobe`
    /// and `data` (LSb first) would have latched.
    pub fn latched_nibbles(&self, rs: usize, strobe: usize, data: [usize; 4]) -> Vec<LatchedNibble> {
        let mut levels: BTreeMap<usize, bool> = BTreeMap::new();
        let mut latched = Vec::new();

        for event in self.events.borrow().iter() {
            if let SimEvent::Write(pin, level) = *event {
                let was_high = levels.get(&pin).copied().unwrap_or(false);
                if pin == strobe && was_high && !level {
                    let mut nibble = 0u8;
                    for (i, data_pin) in data.iter().enumerate() {
                        if levels.get(data_pin).copied().unwrap_or(false) {
                            nibble |= 1 << i;
                        }
                    }
                    latched.push(LatchedNibble {
                        rs: levels.get(&rs).copied().unwrap_or(false),
                        nibble,
                    });
                }
                levels.insert(pin, level);
            }
        }

        latched
    }
}

impl Default for SimGpio {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for SimGpio {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "SimGpio(t={:?})", self.elapsed.get())
    }
}

impl GpioPort for SimGpio {
    fn set_mode(&self, pin: usize, mode: PinMode) -> GpioResult<()> {
        self.modes.borrow_mut().insert(pin, mode);
        self.events.borrow_mut().push(SimEvent::Mode(pin, mode));
        Ok(())
    }

    fn write(&self, pin: usize, level: bool) -> GpioResult<()> {
        self.levels.borrow_mut().insert(pin, level);
        self.events.borrow_mut().push(SimEvent::Write(pin, level));
        Ok(())
    }

    fn read(&self, pin: usize) -> GpioResult<bool> {
        let level = match self.inputs.borrow().get(&pin) {
            Some(script) => script(self.elapsed.get()),
            None => self.level(pin),
        };
        self.events.borrow_mut().push(SimEvent::Read(pin, level));
        Ok(level)
    }
}

impl Clock for SimGpio {
    fn now(&self) -> Instant {
        self.epoch + self.elapsed.get()
    }

    fn sleep(&self, duration: Duration) {
        self.elapsed.set(self.elapsed.get() + duration);
        self.events.borrow_mut().push(SimEvent::Sleep(duration));
    }
}
