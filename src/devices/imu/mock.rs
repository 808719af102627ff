//! Mock raw IMU
//!
//! Plays back queued [`RawSample`]s, then repeats a default sample. The
//! accelerometer read latches the next sample, so a full
//! [`RawImu::read_sample`] consumes exactly one queued entry.
//!
//! ```ignore
//! use jtracker::devices::imu::MockRawImu;
//! use jtracker::devices::traits::RawImu;
//!
//! let mut imu = MockRawImu::resting();
//! let sample = imu.read_sample().await?;
//! ```

use crate::devices::traits::{ImuError, RawImu};
use jtracker_core::imu::{RawSample, ACCEL_8G_ONE_G_TICKS};
use nalgebra::Vector3;

/// Queue depth
pub const MOCK_QUEUE_LEN: usize = 64;

/// Mock raw IMU for tests
pub struct MockRawImu {
    samples: heapless::Deque<RawSample, MOCK_QUEUE_LEN>,
    default_sample: RawSample,
    current: RawSample,
    healthy: bool,
    reads: u32,
}

impl MockRawImu {
    /// Level and still: +1 g on Z, zero rate, no magnetometer
    pub fn resting() -> Self {
        let rest = RawSample {
            accel: Vector3::new(0, 0, ACCEL_8G_ONE_G_TICKS),
            ..RawSample::default()
        };
        Self::with_default(rest)
    }

    /// Repeat `sample` forever
    pub fn with_default(sample: RawSample) -> Self {
        Self {
            samples: heapless::Deque::new(),
            default_sample: sample,
            current: sample,
            healthy: true,
            reads: 0,
        }
    }

    /// Queue a sample; returns it back if the queue is full
    pub fn push_sample(&mut self, sample: RawSample) -> Result<(), RawSample> {
        self.samples.push_back(sample)
    }

    /// Sample returned once the queue is drained
    pub fn set_default_sample(&mut self, sample: RawSample) {
        self.default_sample = sample;
    }

    /// Make every read fail with `ImuError::Bus`
    pub fn set_healthy(&mut self, healthy: bool) {
        self.healthy = healthy;
    }

    /// Samples latched so far
    pub fn reads(&self) -> u32 {
        self.reads
    }

    fn check(&self) -> Result<(), ImuError> {
        if self.healthy {
            Ok(())
        } else {
            Err(ImuError::Bus)
        }
    }
}

impl RawImu for MockRawImu {
    async fn read_accel_raw(&mut self) -> Result<Vector3<i16>, ImuError> {
        self.check()?;
        self.current = self.samples.pop_front().unwrap_or(self.default_sample);
        self.reads += 1;
        Ok(self.current.accel)
    }

    async fn read_gyro_raw(&mut self) -> Result<Vector3<i16>, ImuError> {
        self.check()?;
        Ok(self.current.gyro)
    }

    async fn read_mag_raw(&mut self) -> Result<Option<Vector3<i16>>, ImuError> {
        self.check()?;
        Ok(self.current.mag)
    }

    async fn read_temperature(&mut self) -> Result<i16, ImuError> {
        self.check()?;
        Ok(self.current.temperature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_queue_then_default() {
        let mut imu = MockRawImu::resting();
        let moving = RawSample {
            gyro: Vector3::new(500, 0, 0),
            temperature: 30,
            ..RawSample::default()
        };
        imu.push_sample(moving).unwrap();

        assert_eq!(imu.read_sample().await.unwrap(), moving);
        let rest = imu.read_sample().await.unwrap();
        assert_eq!(rest.accel.z, ACCEL_8G_ONE_G_TICKS);
        assert_eq!(imu.reads(), 2);
    }

    #[tokio::test]
    async fn test_unhealthy_fails() {
        let mut imu = MockRawImu::resting();
        imu.set_healthy(false);
        assert_eq!(imu.read_sample().await, Err(ImuError::Bus));
        assert_eq!(imu.reads(), 0);
    }
}
