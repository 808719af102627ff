//! Gyro bias as an affine function of temperature
//!
//! Coefficients are 16.16 fixed point:
//!
//! ```text
//! offset = (slope * T + intercept) / 65536
//! ```
//!
//! A windowed calibration result is the special case `slope = 0`.

use nalgebra::Vector3;

/// Fixed-point scale of the coefficients
pub const FIXED_ONE: i64 = 0x1_0000;

/// Affine temperature model of the gyro zero-rate offset (ticks)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemperatureCharacteristic {
    /// Offset change per temperature tick, 16.16
    pub slope: Vector3<i32>,
    /// Offset at temperature zero, 16.16
    pub intercept: Vector3<i32>,
}

impl TemperatureCharacteristic {
    /// Model that always yields zero
    pub const ZERO: Self = Self {
        slope: Vector3::new(0, 0, 0),
        intercept: Vector3::new(0, 0, 0),
    };

    /// Temperature-independent offset (the windowed calibration result)
    pub fn constant(offset: Vector3<i32>) -> Self {
        Self {
            slope: Vector3::zeros(),
            intercept: offset.map(|o| {
                (i64::from(o) * FIXED_ONE).clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
            }),
        }
    }

    /// Build from floating-point coefficients measured offline
    pub fn from_coefficients(slope: Vector3<f32>, intercept: Vector3<f32>) -> Self {
        let to_fixed = |v: f32| (v * FIXED_ONE as f32) as i32;
        Self {
            slope: slope.map(to_fixed),
            intercept: intercept.map(to_fixed),
        }
    }

    /// Offset to add to raw gyro ticks at `temperature`
    pub fn offset_at(&self, temperature: i16) -> Vector3<i32> {
        let t = i64::from(temperature);
        self.slope.zip_map(&self.intercept, |a, b| {
            ((i64::from(a) * t + i64::from(b)) / FIXED_ONE) as i32
        })
    }
}

impl Default for TemperatureCharacteristic {
    fn default() -> Self {
        Self::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_ignores_temperature() {
        let tc = TemperatureCharacteristic::constant(Vector3::new(-12, 7, 0));
        assert_eq!(tc.offset_at(-400), Vector3::new(-12, 7, 0));
        assert_eq!(tc.offset_at(0), Vector3::new(-12, 7, 0));
        assert_eq!(tc.offset_at(3000), Vector3::new(-12, 7, 0));
    }

    #[test]
    fn test_constant_saturates_full_scale() {
        // A window pinned at i16::MIN yields +32768, one past the 16.16 range
        let tc = TemperatureCharacteristic::constant(Vector3::new(32768, -32768, 0));
        assert_eq!(tc.intercept.x, i32::MAX);
        assert_eq!(tc.offset_at(25), Vector3::new(32767, -32768, 0));
    }

    #[test]
    fn test_affine_model() {
        // offset_x = 0.5 * T + 10
        let tc = TemperatureCharacteristic::from_coefficients(
            Vector3::new(0.5, 0.0, -0.25),
            Vector3::new(10.0, -3.0, 0.0),
        );
        assert_eq!(tc.offset_at(100), Vector3::new(60, -3, -25));
        assert_eq!(tc.offset_at(-100), Vector3::new(-40, -3, 25));
    }

    #[test]
    fn test_zero_model() {
        assert_eq!(
            TemperatureCharacteristic::default().offset_at(1234),
            Vector3::zeros()
        );
    }
}
