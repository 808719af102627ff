//! Monotonic time source
//!
//! The fusion filter measures its own time step, and the relay coordinator
//! timestamps outgoing frames. Both read the clock through [`TimeSource`] so
//! the host tests can drive time by hand.

use core::cell::Cell;

/// Monotonic clock since boot.
///
/// Firmware builds use an embassy-backed implementation; host tests use
/// [`MockTime`].
///
/// # Example
///
/// ```
/// use jtracker_core::traits::{MockTime, TimeSource};
///
/// fn step_seconds<T: TimeSource>(time: &T, last_us: &mut u64) -> f32 {
///     let dt = time.elapsed_since(*last_us);
///     *last_us = time.now_us();
///     dt as f32 * 1.0e-6
/// }
///
/// let time = MockTime::new();
/// let mut last = 0;
/// time.advance(10_000);
/// assert_eq!(step_seconds(&time, &mut last), 0.01);
/// ```
pub trait TimeSource: Clone + Send + Sync {
    /// Milliseconds since boot
    fn now_ms(&self) -> u64;

    /// Microseconds since boot
    fn now_us(&self) -> u64;

    /// Microseconds elapsed since `reference_us`, zero if the reference is
    /// in the future
    fn elapsed_since(&self, reference_us: u64) -> u64 {
        self.now_us().saturating_sub(reference_us)
    }
}

/// A borrowed clock is a clock, so several consumers can share one
/// [`MockTime`] in tests.
impl<T: TimeSource> TimeSource for &T {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }

    fn now_us(&self) -> u64 {
        (**self).now_us()
    }
}

/// Hand-driven clock for host tests.
///
/// Clones share nothing; each clone carries its own counter. Pass `&time`
/// where consumers must observe the same clock.
///
/// ```
/// use jtracker_core::traits::{MockTime, TimeSource};
///
/// let time = MockTime::with_initial(2_500);
/// time.advance(1_000);
/// assert_eq!(time.now_us(), 3_500);
/// assert_eq!(time.now_ms(), 3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockTime {
    current_us: Cell<u64>,
}

// Safety: MockTime is confined to single-threaded tests; the Send + Sync
// bound only matters for executor-shared clocks on target.
unsafe impl Send for MockTime {}
unsafe impl Sync for MockTime {}

impl MockTime {
    /// Start at zero
    pub fn new() -> Self {
        Self {
            current_us: Cell::new(0),
        }
    }

    /// Start at `us`
    pub fn with_initial(us: u64) -> Self {
        Self {
            current_us: Cell::new(us),
        }
    }

    /// Jump to an absolute time
    pub fn set(&self, us: u64) {
        self.current_us.set(us);
    }

    /// Move forward by `us`
    pub fn advance(&self, us: u64) {
        self.current_us.set(self.current_us.get().saturating_add(us));
    }
}

impl TimeSource for MockTime {
    fn now_ms(&self) -> u64 {
        self.current_us.get() / 1000
    }

    fn now_us(&self) -> u64 {
        self.current_us.get()
    }
}
