//! Shift-register debouncer for the power button.
//!
//! Eight raw samples live in one byte, newest in the low bit. Masked pattern
//! matches pick out the instant a press or release has settled; each match
//! fires once and then saturates the history so it cannot refire until a
//! genuinely new transition accumulates. The caller samples at a fixed
//! cadence ([`crate::sequencer::SAMPLE_PERIOD`]); the debouncer itself has no
//! notion of time.

use crate::lines::LineId;

/// History pattern the instant a press has settled: two stable high samples,
/// bounce bits ignored, three stable low samples.
pub const PRESSED: u8 = 0b1100_0000;
/// History pattern the instant a release has settled.
pub const RELEASED: u8 = 0b0000_0111;
/// Bits of history that take part in pattern matching.
pub const MASK: u8 = 0b1100_0111;
/// Fully settled history for a button at rest (the pull-up keeps it high).
pub const UP: u8 = 0b1111_1111;
/// Fully settled history with the button held down.
pub const DOWN: u8 = 0b0000_0000;

/// Debounces one active-low contact.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Debouncer {
    line: LineId,
    history: u8,
}

impl Debouncer {
    /// Creates a debouncer that assumes the contact starts open.
    #[must_use]
    pub const fn new(line: LineId) -> Self {
        Self { line, history: UP }
    }

    /// Logical line this debouncer conditions.
    #[must_use]
    pub const fn line(&self) -> LineId {
        self.line
    }

    /// Shifts one raw sample into the history.
    pub fn update(&mut self, raw_high: bool) {
        self.history = (self.history << 1) | u8::from(raw_high);
    }

    /// Reports a settled press exactly once, then saturates the history.
    pub fn is_pressed(&mut self) -> bool {
        if self.history & MASK == PRESSED {
            self.history = DOWN;
            true
        } else {
            false
        }
    }

    /// Reports a settled release exactly once, then saturates the history.
    pub fn is_released(&mut self) -> bool {
        if self.history & MASK == RELEASED {
            self.history = UP;
            true
        } else {
            false
        }
    }

    /// True while the contact is settled open.
    #[must_use]
    pub const fn is_up(&self) -> bool {
        self.history == UP
    }

    /// True while the contact is settled closed.
    #[must_use]
    pub const fn is_down(&self) -> bool {
        self.history == DOWN
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(debouncer: &mut Debouncer, samples: &[u8]) {
        for sample in samples {
            debouncer.update(*sample != 0);
        }
    }

    #[test]
    fn clean_press_fires_once() {
        let mut button = Debouncer::new(LineId::Power);
        feed(&mut button, &[0, 0, 0]);
        assert!(button.is_pressed());
        assert!(button.is_down());

        // Further held samples must not refire.
        feed(&mut button, &[0, 0, 0, 0]);
        assert!(!button.is_pressed());
        assert!(button.is_down());
    }

    #[test]
    fn bouncy_press_still_fires_once() {
        let mut button = Debouncer::new(LineId::Power);
        // Two clean highs, two bounce samples, three settled lows.
        feed(&mut button, &[1, 1, 0, 1, 0, 0, 0]);
        assert!(button.is_pressed());
        feed(&mut button, &[0, 0, 0]);
        assert!(!button.is_pressed());
    }

    #[test]
    fn release_after_press_fires_once() {
        let mut button = Debouncer::new(LineId::Power);
        feed(&mut button, &[0, 0, 0]);
        assert!(button.is_pressed());

        feed(&mut button, &[1, 1, 1]);
        assert!(button.is_released());
        assert!(button.is_up());
        feed(&mut button, &[1, 1, 1]);
        assert!(!button.is_released());
    }

    #[test]
    fn short_noise_burst_reports_nothing() {
        let mut button = Debouncer::new(LineId::Power);
        feed(&mut button, &[0, 1, 0, 1, 1]);
        assert!(!button.is_pressed());
        assert!(!button.is_released());
        assert!(!button.is_down());
    }

    #[test]
    fn level_queries_do_not_consume_events() {
        let mut button = Debouncer::new(LineId::Power);
        feed(&mut button, &[0, 0, 0]);
        assert!(!button.is_down());
        assert!(!button.is_up());
        // The pending press is still observable after the level queries.
        assert!(button.is_pressed());
    }
}
