//! Millisecond time base shared by the sequencer and its sensors.
//!
//! Timestamps are 32-bit millisecond counts. Interval arithmetic wraps, so
//! comparisons stay valid across counter rollover as long as the measured
//! span is far below the counter range; every timeout in this system is
//! bounded by tens of seconds against a ~49 day range.

use core::ops::Add;

/// Duration in whole milliseconds.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub struct Millis(u32);

impl Millis {
    /// Zero-length duration.
    pub const ZERO: Millis = Millis(0);

    /// Creates a duration from a millisecond count.
    #[must_use]
    pub const fn new(ms: u32) -> Self {
        Self(ms)
    }

    /// Returns the raw millisecond count.
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

/// Timestamp on the supervisor's millisecond clock.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Instant(u32);

impl Instant {
    /// The clock origin.
    pub const ZERO: Instant = Instant(0);

    /// Creates a timestamp from a raw millisecond count.
    #[must_use]
    pub const fn from_ticks(ms: u32) -> Self {
        Self(ms)
    }

    /// Returns the raw millisecond count.
    #[must_use]
    pub const fn ticks(self) -> u32 {
        self.0
    }

    /// Duration since an earlier timestamp, tolerant of counter wraparound.
    #[must_use]
    pub const fn elapsed_since(self, earlier: Instant) -> Millis {
        Millis(self.0.wrapping_sub(earlier.0))
    }
}

impl Add<Millis> for Instant {
    type Output = Instant;

    fn add(self, rhs: Millis) -> Instant {
        Instant(self.0.wrapping_add(rhs.0))
    }
}

/// Free-running millisecond counter owned by the loop driver.
///
/// The driver advances it once per iteration with however much awake time
/// has passed. Time spent halted in the low-power wait is deliberately not
/// fed in, so intervals measured against this clock count awake time only;
/// the idle wake window depends on that.
#[derive(Copy, Clone, Debug, Default)]
pub struct TickClock {
    now: u32,
}

impl TickClock {
    /// Creates a clock positioned at the origin.
    #[must_use]
    pub const fn new() -> Self {
        Self { now: 0 }
    }

    /// Moves the clock forward and returns the new reading.
    pub fn advance(&mut self, delta: Millis) -> Instant {
        self.now = self.now.wrapping_add(delta.as_u32());
        Instant(self.now)
    }

    /// Current reading.
    #[must_use]
    pub const fn now(&self) -> Instant {
        Instant(self.now)
    }
}
