//! Platform service traits used by the task layer
//!
//! - [`TimeSource`]: monotonic clock (`EmbassyTime` on target, `MockTime` in tests)
//! - [`SharedState`]: short-held lock around state shared between tasks
//!   (`EmbassyState` on target, `MockState` in tests)
//!
//! Mock implementations are always compiled; Embassy ones need the
//! `embassy` feature.
//!
//! ```
//! use jtracker::core::traits::{MockState, MockTime, SharedState, TimeSource};
//!
//! fn stamp<T: TimeSource, S: SharedState<u64>>(time: &T, last: &S) {
//!     let now = time.now_us();
//!     last.with_mut(|v| *v = now);
//! }
//!
//! let time = MockTime::with_initial(1_250);
//! let last = MockState::new(0u64);
//! stamp(&time, &last);
//! assert_eq!(last.with(|v| *v), 1_250);
//! ```

pub mod sync;
pub mod time;

pub use sync::{MockState, SharedState};
pub use time::{MockTime, TimeSource};

#[cfg(feature = "embassy")]
pub use sync::EmbassyState;

#[cfg(feature = "embassy")]
pub use time::EmbassyTime;
