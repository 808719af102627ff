//! Device traits
//!
//! Chip-independent interfaces. Register bring-up for each physical sensor
//! lives behind these traits so calibration and fusion never see the chip.

pub mod raw_imu;

pub use raw_imu::{ImuError, RawImu};
