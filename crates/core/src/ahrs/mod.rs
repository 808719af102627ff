//! AHRS (Attitude and Heading Reference System)
//!
//! Fuses bias-corrected gyro, accelerometer and (optionally) magnetometer
//! samples into a unit orientation quaternion. The filter pulls its time step
//! from an injected [`TimeSource`](crate::traits::TimeSource).

pub mod madgwick;
pub mod traits;

pub use madgwick::{MadgwickAhrs, MadgwickConfig, DEFAULT_BETA};
pub use traits::{Ahrs, Correction};
