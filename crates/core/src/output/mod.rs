//! Pose output encoders
//!
//! - [`vmt`]: UDP datagrams for the host tracking driver
//! - [`hid`]: gamepad report for the wireless HID transport

pub mod hid;
pub mod vmt;

pub use hid::{GamepadReport, DEFAULT_BUTTONS, REPORT_LEN};
pub use vmt::{
    decode, encode, encoded_len, DecodedMessage, EncodeError, TrackerArgs, VmtMessage,
    ARGUMENT_BLOCK_LEN, LOCAL_PORT, MAX_DATAGRAM_LEN,
};
