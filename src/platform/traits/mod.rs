//! Platform abstraction traits

pub mod datagram;
pub mod i2c;

pub use datagram::{DatagramSink, Endpoint};
pub use i2c::{I2cConfig, I2cInterface, I2cTarget, TargetRequest};
