//! Platform abstraction layer
//!
//! Bus and network access behind traits, so relay, output and device code
//! runs unchanged on the RP2350 and against host mocks.

pub mod error;
pub mod hal;
pub mod traits;

#[cfg(feature = "pico2_w")]
pub mod rp2350;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use error::{PlatformError, Result};
pub use traits::{DatagramSink, Endpoint, I2cConfig, I2cInterface, I2cTarget, TargetRequest};
