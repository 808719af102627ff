//! Embassy-backed time source
//!
//! `TimeSource` and `MockTime` are defined in `jtracker_core`; this adds the
//! implementation that reads the Embassy monotonic clock.

pub use jtracker_core::traits::{MockTime, TimeSource};

/// Embassy monotonic clock
#[cfg(feature = "embassy")]
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbassyTime;

#[cfg(feature = "embassy")]
impl TimeSource for EmbassyTime {
    fn now_ms(&self) -> u64 {
        embassy_time::Instant::now().as_millis()
    }

    fn now_us(&self) -> u64 {
        embassy_time::Instant::now().as_micros()
    }
}
