//! Presentation subsystem
//!
//! Takes published poses to the outside: a tracker stream on coordinators and
//! a gamepad report on standalone nodes.

pub mod hid;
pub mod vmt;

pub use hid::HidPresenter;
pub use vmt::{VmtPresenter, MAX_FIXED};
