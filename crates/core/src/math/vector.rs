//! Integer vector helpers for raw sensor ticks

use nalgebra::Vector3;

/// Component-wise running maximum and minimum of a stream of vectors.
///
/// Used by calibration to measure the peak-to-peak spread of a sample window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extent {
    max: Vector3<i16>,
    min: Vector3<i16>,
    empty: bool,
}

impl Extent {
    /// Create an empty extent
    pub const fn new() -> Self {
        Self {
            max: Vector3::new(i16::MIN, i16::MIN, i16::MIN),
            min: Vector3::new(i16::MAX, i16::MAX, i16::MAX),
            empty: true,
        }
    }

    /// Widen the extent to include `v`
    pub fn include(&mut self, v: &Vector3<i16>) {
        self.max = self.max.sup(v);
        self.min = self.min.inf(v);
        self.empty = false;
    }

    /// Component-wise maximum seen so far
    pub fn max(&self) -> Vector3<i16> {
        self.max
    }

    /// Component-wise minimum seen so far
    pub fn min(&self) -> Vector3<i16> {
        self.min
    }

    /// Per-axis `max - min`, zero when nothing has been included
    pub fn peak_to_peak(&self) -> Vector3<i32> {
        if self.empty {
            return Vector3::zeros();
        }
        self.max.map(i32::from) - self.min.map(i32::from)
    }

    /// Squared magnitude of the peak-to-peak vector
    pub fn spread_squared(&self) -> i64 {
        let d = self.peak_to_peak().map(i64::from);
        d.x * d.x + d.y * d.y + d.z * d.z
    }
}

impl Default for Extent {
    fn default() -> Self {
        Self::new()
    }
}

/// Add an `i32` offset to raw ticks, saturating at the `i16` range
pub fn saturate_i16(raw: &Vector3<i16>, offset: &Vector3<i32>) -> Vector3<i16> {
    raw.map(i32::from)
        .zip_map(offset, |r, o| r.saturating_add(o))
        .map(|v| v.clamp(i16::MIN as i32, i16::MAX as i32) as i16)
}
