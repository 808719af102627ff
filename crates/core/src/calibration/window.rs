//! Fixed-size sample window with a running sum

use crate::math::Extent;
use nalgebra::Vector3;

/// Ring of the last `N` vectors plus their running sum.
///
/// Used both as a one-shot window (filled, evaluated, cleared) and as a
/// rolling window (oldest sample evicted on every push once full).
#[derive(Debug, Clone)]
pub struct SampleWindow<const N: usize> {
    samples: [Vector3<i16>; N],
    len: usize,
    head: usize,
    sum: Vector3<i64>,
}

impl<const N: usize> SampleWindow<N> {
    /// Create an empty window
    pub fn new() -> Self {
        Self {
            samples: [Vector3::zeros(); N],
            len: 0,
            head: 0,
            sum: Vector3::zeros(),
        }
    }

    /// Push a sample, evicting the oldest one when full
    pub fn push(&mut self, v: Vector3<i16>) {
        if N == 0 {
            return;
        }
        if self.len == N {
            self.sum -= self.samples[self.head].map(i64::from);
        } else {
            self.len += 1;
        }
        self.samples[self.head] = v;
        self.sum += v.map(i64::from);
        self.head = (self.head + 1) % N;
    }

    /// Number of samples currently held
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when no samples are held
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// True once `N` samples have been pushed
    pub fn is_full(&self) -> bool {
        N > 0 && self.len == N
    }

    /// Drop all samples
    pub fn clear(&mut self) {
        self.len = 0;
        self.head = 0;
        self.sum = Vector3::zeros();
    }

    /// Running sum of the held samples
    pub fn sum(&self) -> Vector3<i64> {
        self.sum
    }

    /// Integer mean of the held samples (truncated toward zero)
    pub fn mean(&self) -> Vector3<i32> {
        if self.len == 0 {
            return Vector3::zeros();
        }
        let n = self.len as i64;
        self.sum.map(|s| (s / n) as i32)
    }

    /// Per-axis max/min over the held samples
    pub fn extent(&self) -> Extent {
        let mut extent = Extent::new();
        for v in &self.samples[..self.len] {
            extent.include(v);
        }
        extent
    }
}

impl<const N: usize> Default for SampleWindow<N> {
    fn default() -> Self {
        Self::new()
    }
}
