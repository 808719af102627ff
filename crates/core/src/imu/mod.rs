//! Raw IMU sample and sensor range scaling
//!
//! Samples stay in sensor-native ADC ticks through calibration and are
//! converted to physical units only where the filter consumes them.

use nalgebra::Vector3;

/// Gyroscope scale at ±2000 dps full range (rad/s per tick)
pub const GYRO_2000DPS_RAD_PER_TICK: f32 = 0.001_065_264_4;

/// Accelerometer scale at ±8 g full range (g per tick)
pub const ACCEL_8G_PER_TICK: f32 = 8.0 / 32768.0;

/// Accelerometer ticks for 1 g at ±8 g full range
pub const ACCEL_8G_ONE_G_TICKS: i16 = 4096;

/// Standard gravity (m/s²)
pub const GRAVITY: f32 = 9.80665;

/// One raw reading from an IMU, in sensor ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawSample {
    /// Accelerometer ticks (sensor frame)
    pub accel: Vector3<i16>,
    /// Gyroscope ticks (sensor frame)
    pub gyro: Vector3<i16>,
    /// Magnetometer ticks, if the chip has one
    pub mag: Option<Vector3<i16>>,
    /// Die temperature in sensor ticks
    pub temperature: i16,
}

impl Default for RawSample {
    fn default() -> Self {
        Self {
            accel: Vector3::zeros(),
            gyro: Vector3::zeros(),
            mag: None,
            temperature: 0,
        }
    }
}

/// Per-range conversion factors from ticks to physical units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorScale {
    /// rad/s per gyro tick
    pub gyro: f32,
    /// g per accelerometer tick
    pub accel: f32,
    /// Arbitrary units per magnetometer tick (only direction matters)
    pub mag: f32,
}

impl SensorScale {
    /// ±2000 dps gyro, ±8 g accelerometer
    pub const DEFAULT: Self = Self {
        gyro: GYRO_2000DPS_RAD_PER_TICK,
        accel: ACCEL_8G_PER_TICK,
        mag: 1.0,
    };

    /// Angular rate in rad/s
    pub fn gyro_rad_s(&self, raw: &Vector3<i16>) -> Vector3<f32> {
        raw.map(|v| v as f32 * self.gyro)
    }

    /// Specific force in g
    pub fn accel_g(&self, raw: &Vector3<i16>) -> Vector3<f32> {
        raw.map(|v| v as f32 * self.accel)
    }

    /// Specific force in m/s²
    pub fn accel_m_s2(&self, raw: &Vector3<i16>) -> Vector3<f32> {
        self.accel_g(raw) * GRAVITY
    }

    /// Magnetic field in scaled units
    pub fn mag(&self, raw: &Vector3<i16>) -> Vector3<f32> {
        raw.map(|v| v as f32 * self.mag)
    }
}

impl Default for SensorScale {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1.0e-6;

    #[test]
    fn test_gyro_full_scale_is_2000_dps() {
        let rate = SensorScale::DEFAULT.gyro_rad_s(&Vector3::new(32767, 0, 0));
        let dps = rate.x.to_degrees();
        assert!((dps - 2000.0).abs() < 0.1, "got {} dps", dps);
    }

    #[test]
    fn test_accel_one_g() {
        let g = SensorScale::DEFAULT.accel_g(&Vector3::new(0, 0, ACCEL_8G_ONE_G_TICKS));
        assert!((g.z - 1.0).abs() < EPSILON);

        let ms2 = SensorScale::DEFAULT.accel_m_s2(&Vector3::new(0, 0, ACCEL_8G_ONE_G_TICKS));
        assert!((ms2.z - GRAVITY).abs() < 1.0e-4);
    }
}
