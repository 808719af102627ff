//! Quaternion operations with a fixed composition order
//!
//! All functions are pure value operations. Normalization never divides by a
//! near-zero magnitude: a degenerate input is returned unchanged so the caller
//! keeps its last good state.

use libm::{cosf, fabsf, sinf};
use nalgebra::{Quaternion, Vector3};

/// Magnitudes at or below this are treated as degenerate
pub const NORM_EPSILON: f32 = 1.0e-6;

/// Build a quaternion from wire order (x, y, z, w)
#[inline]
pub fn from_xyzw(x: f32, y: f32, z: f32, w: f32) -> Quaternion<f32> {
    Quaternion::new(w, x, y, z)
}

/// Scale `q` to unit length.
///
/// When `positive_w` is set the result is flipped into the `w >= 0`
/// hemisphere, so two quaternions describing the same rotation compare equal.
/// A zero or non-finite input is returned unchanged.
pub fn normalize(q: Quaternion<f32>, positive_w: bool) -> Quaternion<f32> {
    let norm = q.norm();
    if !norm.is_finite() || norm <= NORM_EPSILON {
        return q;
    }

    let unit = q / norm;
    if positive_w && unit.w < 0.0 {
        -unit
    } else {
        unit
    }
}

/// Hamilton product `a * b` (apply `b`, then `a`)
#[inline]
pub fn compose(a: Quaternion<f32>, b: Quaternion<f32>) -> Quaternion<f32> {
    a * b
}

/// Inverse of a unit quaternion (its conjugate)
#[inline]
pub fn inverse(q: Quaternion<f32>) -> Quaternion<f32> {
    q.conjugate()
}

/// Rotate `v` by the unit quaternion `q` (`q * v * q⁻¹`)
pub fn rotate_vector(q: Quaternion<f32>, v: Vector3<f32>) -> Vector3<f32> {
    let rotated = q * Quaternion::from_imag(v) * q.conjugate();
    rotated.imag()
}

/// Pure rotation of `angle` radians about the world Z axis
pub fn yaw_rotation(angle: f32) -> Quaternion<f32> {
    let half = angle * 0.5;
    Quaternion::new(cosf(half), 0.0, 0.0, sinf(half))
}

/// Express `q` in a frame turned half a revolution about Z.
///
/// Equivalent to `Rz(π) * q * Rz(π)⁻¹`, i.e. `(x, y, z, w) -> (-x, -y, z, w)`.
/// Some consumers expect sensors mounted facing the other way.
pub fn half_turn_z(q: Quaternion<f32>) -> Quaternion<f32> {
    Quaternion::new(q.w, -q.i, -q.j, q.k)
}

/// Check that `q` has unit norm within `tolerance`
pub fn is_unit(q: &Quaternion<f32>, tolerance: f32) -> bool {
    fabsf(q.norm() - 1.0) <= tolerance
}
