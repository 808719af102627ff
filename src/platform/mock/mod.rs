//! Mock platform implementations for host testing
//!
//! Available in test builds and with the `mock` feature.

#![cfg(any(test, feature = "mock"))]

mod datagram;
mod i2c;

pub use datagram::MockDatagramSink;
pub use i2c::{I2cTransaction, MockI2c, MockI2cTarget};
