//! Platform service traits
//!
//! Definitions here carry no feature gates. Mock implementations are always
//! compiled so host tests and the firmware crate's `mock` feature can use
//! them; the embassy-backed implementations live in the firmware crate.

pub mod time;

pub use time::{MockTime, TimeSource};
