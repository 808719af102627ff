//! Communication
//!
//! - [`relay`]: coordinator/subordinate bus protocol over I2C
//! - [`vmt`]: tracker datagrams to the host driver over UDP
//! - [`hid`]: gamepad report hand-off to the wireless HID transport

pub mod hid;
pub mod relay;
pub mod vmt;
