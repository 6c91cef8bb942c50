/// Detects the LOW→HIGH transitions of a polled level.
///
/// A press is reported once, on the first HIGH sample after a LOW one. Holding the button does not
/// re-trigger, and how long it is held is ignored.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct RisingEdge {
    previous_state: bool,
}

impl RisingEdge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds a new sample. Returns `true` if it completes a LOW→HIGH transition.
    pub fn update(&mut self, level: bool) -> bool {
        let rising = level && !self.previous_state;
        self.previous_state = level;
        rising
    }

    pub fn previous_state(&self) -> bool {
        self.previous_state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_each_press_once() {
        let mut edge = RisingEdge::new();
        let samples = [false, true, true, true, false, false, true, false];
        let rising: Vec<bool> = samples.iter().map(|&s| edge.update(s)).collect();

        assert_eq!(rising, vec![false, true, false, false, false, false, true, false]);
    }

    #[test]
    fn starts_low() {
        let mut edge = RisingEdge::new();
        assert!(!edge.previous_state());
        assert!(edge.update(true));
        assert!(edge.previous_state());
    }
}
