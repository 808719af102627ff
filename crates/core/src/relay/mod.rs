//! Coordinator/subordinate relay protocol
//!
//! The coordinator writes a one-byte [`Command`] to a subordinate's bus
//! address, waits a short settle delay, then reads a fixed-size
//! [`RelayFrame`]. Transport lives in the firmware crate.

pub mod command;
pub mod frame;

pub use command::{Command, UnknownCommand};
pub use frame::{
    FrameError, FrameLayout, RelayFrame, DUAL_FRAME_LEN, FRAME_FOOTER, FRAME_HEADER,
    MAX_FRAME_LEN, SINGLE_FRAME_LEN,
};
