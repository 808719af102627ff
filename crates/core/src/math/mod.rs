//! Vector and quaternion helpers
//!
//! Thin layer over `nalgebra::{Quaternion, Vector3}` that fixes the rotation
//! conventions used throughout the crate.
//!
//! # Conventions
//!
//! - Quaternions are Hamilton products, `a * b` applies `b` first, then `a`
//! - An orientation maps sensor-frame vectors into the world frame
//! - World frame is Z-up, the horizontal plane is XY and forward is +Y
//! - The inverse of a unit quaternion is its conjugate

pub mod quaternion;
pub mod vector;

pub use quaternion::{
    compose, from_xyzw, half_turn_z, inverse, is_unit, normalize, rotate_vector, yaw_rotation,
    NORM_EPSILON,
};
pub use vector::{saturate_i16, Extent};
