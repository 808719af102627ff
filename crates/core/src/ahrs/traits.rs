//! AHRS trait and shared types

use nalgebra::{Quaternion, Vector3};

/// Which correction term the last update applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Correction {
    /// Pure gyro integration (reference vectors rejected or absent)
    None,
    /// Gravity direction from the accelerometer
    Gravity,
    /// Gravity plus magnetic field direction
    GravityMagnetic,
}

impl Correction {
    /// Return variant name as a static string (usable with defmt on embedded)
    pub fn as_str(&self) -> &'static str {
        match self {
            Correction::None => "None",
            Correction::Gravity => "Gravity",
            Correction::GravityMagnetic => "GravityMagnetic",
        }
    }
}

/// Orientation estimator fed with bias-corrected sensor data.
///
/// Inputs are in the sensor frame: gyro in rad/s, accelerometer in g and
/// magnetometer in any consistent unit. The returned quaternion maps
/// sensor-frame vectors into the world frame (Z up).
pub trait Ahrs {
    /// Current orientation estimate
    fn orientation(&self) -> Quaternion<f32>;

    /// Gyro + accelerometer update
    fn update_imu(&mut self, gyro: Vector3<f32>, accel: Vector3<f32>) -> Quaternion<f32>;

    /// Gyro + accelerometer + magnetometer update
    fn update(
        &mut self,
        gyro: Vector3<f32>,
        accel: Vector3<f32>,
        mag: Vector3<f32>,
    ) -> Quaternion<f32>;

    /// Gyro-only integration
    fn update_gyro(&mut self, gyro: Vector3<f32>) -> Quaternion<f32>;

    /// Return to identity, restarting the time base at now
    fn reset(&mut self);

    /// Restart the time base at now, keeping the orientation. The next
    /// update integrates from this instant instead of the last update.
    fn restart_clock(&mut self);
}
