//! Raw IMU capability interface
//!
//! Readings are sensor-native ADC ticks. Conversion to physical units happens
//! at the point of use through the chip's [`SensorScale`], after the
//! calibration engine has removed the bias in tick space.
//!
//! ## Usage
//!
//! ```ignore
//! use jtracker::devices::traits::{ImuError, RawImu};
//!
//! async fn acquire<I: RawImu>(imu: &mut I) -> Result<(), ImuError> {
//!     let sample = imu.read_sample().await?;
//!     // Feed calibration, then scale with imu.scale()
//!     Ok(())
//! }
//! ```

use crate::platform::PlatformError;
use jtracker_core::imu::{RawSample, SensorScale};
use nalgebra::Vector3;

/// IMU error types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ImuError {
    /// Bus transaction failed
    Bus,
    /// Reading failed validation (stuck or saturated sensor)
    InvalidData,
    /// Driver not initialized
    NotInitialized,
    /// Magnetometer data not ready
    MagNotReady,
}

impl ImuError {
    /// Return variant name as a static string (usable with defmt on embedded)
    pub fn as_str(&self) -> &'static str {
        match self {
            ImuError::Bus => "Bus",
            ImuError::InvalidData => "InvalidData",
            ImuError::NotInitialized => "NotInitialized",
            ImuError::MagNotReady => "MagNotReady",
        }
    }

    /// Worth retrying on the next sample
    pub fn is_transient(&self) -> bool {
        matches!(self, ImuError::Bus | ImuError::MagNotReady)
    }
}

impl core::fmt::Display for ImuError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ImuError::Bus => write!(f, "IMU bus error"),
            ImuError::InvalidData => write!(f, "invalid IMU data"),
            ImuError::NotInitialized => write!(f, "IMU not initialized"),
            ImuError::MagNotReady => write!(f, "magnetometer not ready"),
        }
    }
}

impl From<PlatformError> for ImuError {
    fn from(_: PlatformError) -> Self {
        ImuError::Bus
    }
}

/// Raw sample source, one adapter per physical chip.
///
/// Reads are expected in the order accel, gyro, mag, temperature; adapters
/// for chips with a data-ready latch refresh it on the accelerometer read.
#[allow(async_fn_in_trait)]
pub trait RawImu {
    /// Accelerometer ticks
    async fn read_accel_raw(&mut self) -> Result<Vector3<i16>, ImuError>;

    /// Gyroscope ticks
    async fn read_gyro_raw(&mut self) -> Result<Vector3<i16>, ImuError>;

    /// Magnetometer ticks, `None` for 6-axis chips
    async fn read_mag_raw(&mut self) -> Result<Option<Vector3<i16>>, ImuError> {
        Ok(None)
    }

    /// Die temperature ticks
    async fn read_temperature(&mut self) -> Result<i16, ImuError>;

    /// Tick-to-unit conversion for the configured ranges
    fn scale(&self) -> SensorScale {
        SensorScale::DEFAULT
    }

    /// Read every channel into one sample.
    ///
    /// A magnetometer that is not ready yields a sample without mag rather
    /// than an error.
    async fn read_sample(&mut self) -> Result<RawSample, ImuError> {
        let accel = self.read_accel_raw().await?;
        let gyro = self.read_gyro_raw().await?;
        let mag = match self.read_mag_raw().await {
            Ok(mag) => mag,
            Err(ImuError::MagNotReady) => None,
            Err(e) => return Err(e),
        };
        let temperature = self.read_temperature().await?;
        Ok(RawSample {
            accel,
            gyro,
            mag,
            temperature,
        })
    }
}
