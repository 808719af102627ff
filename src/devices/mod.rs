//! Device layer
//!
//! - `traits`: chip-independent capability interfaces ([`traits::RawImu`])
//! - `imu`: IMU adapters (mock)

pub mod imu;
pub mod traits;
