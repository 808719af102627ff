//! Periodic task types
//!
//! Only descriptions and statistics live here; the Embassy loop that drives
//! them is in the firmware crate.
//!
//! # Example
//!
//! ```rust
//! use jtracker_core::scheduler::{TaskStats, FUSION_TASK};
//!
//! let mut stats = TaskStats::default();
//! stats.update(&FUSION_TASK, 800, FUSION_TASK.period_us());
//! assert_eq!(stats.deadline_misses, 0);
//! ```

pub mod tasks;
pub mod types;

pub use tasks::*;
pub use types::*;
