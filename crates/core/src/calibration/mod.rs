//! IMU zero-bias calibration
//!
//! Converts raw samples into bias-corrected samples. Owns the bias state and
//! the static-window convergence test; never fails, a device that keeps moving
//! simply stays in the processing state.

pub mod bias;
pub mod engine;
pub mod window;

pub use bias::TemperatureCharacteristic;
pub use engine::{
    Calibration, CalibrationConfig, CalibrationMode, CalibrationStatus, DEFAULT_ACCEL_THRESHOLD,
    DEFAULT_GYRO_THRESHOLD, DEFAULT_WINDOW,
};
pub use window::SampleWindow;
