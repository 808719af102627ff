//! Firmware infrastructure: logging, shared state, timing and startup
//! configuration

pub mod logging;
pub mod parameters;
pub mod scheduler;
pub mod traits;
