//! Joint descriptor and its user-triggered calibrations

use crate::math::{compose, inverse, normalize, rotate_vector, yaw_rotation, NORM_EPSILON};
use core::f32::consts::FRAC_PI_2;
use heapless::String;
use libm::{atan2f, sqrtf};
use nalgebra::{Quaternion, Vector3};

/// Longest root serial the consumer accepts
pub const ROOT_SERIAL_LEN: usize = 20;

/// Static joint geometry and addressing, loaded once at startup
#[derive(Debug, Clone, PartialEq)]
pub struct JointConfig {
    /// Serial of the tracker this joint follows on the host
    pub root_serial: String<ROOT_SERIAL_LEN>,
    /// Bus address of the subordinate node carrying this joint's sensor
    pub address: u8,
    /// Tracker index on the host
    pub tracker_index: u8,
    /// Bone vector in the sensor frame (meters)
    pub bone: Vector3<f32>,
    /// Fixed rotation, used for joints without a sensor
    pub rotation: Quaternion<f32>,
}

impl JointConfig {
    /// Joint with identity rotation and no root serial
    pub fn new(address: u8, tracker_index: u8, bone: Vector3<f32>) -> Self {
        Self {
            root_serial: String::new(),
            address,
            tracker_index,
            bone,
            rotation: Quaternion::identity(),
        }
    }

    /// Set the root serial, truncated to [`ROOT_SERIAL_LEN`] characters
    pub fn with_root_serial(mut self, serial: &str) -> Self {
        self.root_serial.clear();
        for c in serial.chars() {
            if self.root_serial.push(c).is_err() {
                break;
            }
        }
        self
    }

    /// Set the fixed rotation
    pub fn with_rotation(mut self, rotation: Quaternion<f32>) -> Self {
        self.rotation = normalize(rotation, false);
        self
    }
}

/// World-frame rotation and position of one joint
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    /// Rotation sensor → world
    pub rotation: Quaternion<f32>,
    /// Position in meters
    pub position: Vector3<f32>,
}

impl Pose {
    /// Identity rotation at the origin
    pub fn identity() -> Self {
        Self {
            rotation: Quaternion::identity(),
            position: Vector3::zeros(),
        }
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::identity()
    }
}

/// A joint's static configuration plus its two runtime calibrations.
///
/// ```text
/// effective = yaw_correction * (live * neutral)
/// world_bone = effective · bone
/// ```
///
/// Both calibrations replace their previous value, so repeating an action
/// with the same live orientation gives the same result.
#[derive(Debug, Clone)]
pub struct JointDescriptor {
    config: JointConfig,
    neutral: Quaternion<f32>,
    yaw_correction: Quaternion<f32>,
}

impl JointDescriptor {
    /// Create with both calibrations at identity
    pub fn new(config: JointConfig) -> Self {
        Self {
            config,
            neutral: Quaternion::identity(),
            yaw_correction: Quaternion::identity(),
        }
    }

    /// Static configuration
    pub fn config(&self) -> &JointConfig {
        &self.config
    }

    /// Neutral-pose inverse
    pub fn neutral(&self) -> Quaternion<f32> {
        self.neutral
    }

    /// Pure-yaw forward correction
    pub fn yaw_correction(&self) -> Quaternion<f32> {
        self.yaw_correction
    }

    /// Restore previously captured calibrations
    pub fn restore(&mut self, neutral: Quaternion<f32>, yaw_correction: Quaternion<f32>) {
        self.neutral = normalize(neutral, false);
        self.yaw_correction = normalize(yaw_correction, false);
    }

    /// Live orientation with both calibrations applied
    pub fn effective_rotation(&self, live: Quaternion<f32>) -> Quaternion<f32> {
        normalize(
            compose(self.yaw_correction, compose(live, self.neutral)),
            false,
        )
    }

    /// Bone vector rotated into the world frame
    pub fn world_bone(&self, live: Quaternion<f32>) -> Vector3<f32> {
        rotate_vector(self.effective_rotation(live), self.config.bone)
    }

    /// Rotation and bone offset for a live orientation
    pub fn pose(&self, live: Quaternion<f32>) -> Pose {
        let rotation = self.effective_rotation(live);
        Pose {
            rotation,
            position: rotate_vector(rotation, self.config.bone),
        }
    }

    /// Pose from the configured fixed rotation, for joints without a sensor
    pub fn static_pose(&self) -> Pose {
        let rotation = self.config.rotation;
        Pose {
            rotation,
            position: rotate_vector(rotation, self.config.bone),
        }
    }

    /// Make the current live orientation read as identity.
    ///
    /// Also clears the yaw correction, which was measured against the old
    /// neutral pose.
    pub fn set_neutral(&mut self, live: Quaternion<f32>) {
        self.neutral = inverse(normalize(live, false));
        self.yaw_correction = Quaternion::identity();
    }

    /// Turn the horizontal projection of the bone onto world forward (+Y).
    ///
    /// Returns `false` and keeps the previous correction when the bone is
    /// (nearly) vertical, since its heading is then undefined.
    pub fn set_forward_direction(&mut self, live: Quaternion<f32>) -> bool {
        let b = rotate_vector(compose(live, self.neutral), self.config.bone);
        if sqrtf(b.x * b.x + b.y * b.y) <= NORM_EPSILON {
            return false;
        }

        let heading = atan2f(b.y, b.x);
        self.yaw_correction = yaw_rotation(FRAC_PI_2 - heading);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::from_xyzw;

    const EPSILON: f32 = 1.0e-5;

    fn assert_vec_eq(a: &Vector3<f32>, b: &Vector3<f32>, eps: f32) {
        assert!((a - b).norm() < eps, "{:?} != {:?}", a, b);
    }

    fn assert_identity(q: &Quaternion<f32>) {
        assert!(
            (q.w.abs() - 1.0).abs() < EPSILON
                && q.i.abs() < EPSILON
                && q.j.abs() < EPSILON
                && q.k.abs() < EPSILON,
            "{:?} is not identity",
            q
        );
    }

    fn live() -> Quaternion<f32> {
        normalize(from_xyzw(0.21, -0.43, 0.35, 0.8), false)
    }

    fn joint() -> JointDescriptor {
        JointDescriptor::new(JointConfig::new(0x10, 3, Vector3::new(0.3, 0.0, 0.0)))
    }

    #[test]
    fn test_set_neutral_yields_identity() {
        let mut j = joint();
        j.set_neutral(live());
        assert_identity(&j.effective_rotation(live()));
        assert_vec_eq(&j.world_bone(live()), &Vector3::new(0.3, 0.0, 0.0), EPSILON);
    }

    #[test]
    fn test_set_neutral_is_idempotent() {
        let mut j = joint();
        j.set_neutral(live());
        let first = j.neutral();
        j.set_neutral(live());
        assert!((j.neutral() - first).norm() < EPSILON);
    }

    #[test]
    fn test_set_neutral_clears_yaw() {
        let mut j = joint();
        assert!(j.set_forward_direction(live()));
        j.set_neutral(live());
        assert_eq!(j.yaw_correction(), Quaternion::identity());
    }

    #[test]
    fn test_forward_direction_points_bone_forward() {
        let mut j = joint();
        let q = live();
        assert!(j.set_forward_direction(q));

        let b = j.world_bone(q);
        assert!(b.x.abs() < EPSILON, "bone {:?}", b);
        assert!(b.y > 0.0, "bone {:?}", b);

        // Correction is a pure yaw
        let yaw = j.yaw_correction();
        assert!(yaw.i.abs() < EPSILON && yaw.j.abs() < EPSILON);
    }

    #[test]
    fn test_forward_direction_replaces() {
        let mut j = joint();
        let q = live();
        j.set_forward_direction(q);
        let first = j.yaw_correction();
        j.set_forward_direction(q);
        assert!((j.yaw_correction() - first).norm() < EPSILON);
    }

    #[test]
    fn test_forward_direction_rejects_vertical_bone() {
        let mut j = JointDescriptor::new(JointConfig::new(0x11, 1, Vector3::new(0.0, 0.0, 0.5)));
        assert!(!j.set_forward_direction(Quaternion::identity()));
        assert_eq!(j.yaw_correction(), Quaternion::identity());
    }

    #[test]
    fn test_after_neutral_forward_is_quarter_turn() {
        // Neutral bone along +X needs +90° of yaw to face +Y
        let mut j = joint();
        j.set_neutral(live());
        assert!(j.set_forward_direction(live()));
        let expected = yaw_rotation(FRAC_PI_2);
        assert!((j.yaw_correction() - expected).norm() < EPSILON);
        assert_vec_eq(&j.world_bone(live()), &Vector3::new(0.0, 0.3, 0.0), EPSILON);
    }

    #[test]
    fn test_static_pose_uses_config_rotation() {
        let rotation = yaw_rotation(FRAC_PI_2);
        let j = JointDescriptor::new(
            JointConfig::new(0x00, 0, Vector3::new(0.0, 0.2, 0.0)).with_rotation(rotation),
        );
        let pose = j.static_pose();
        assert_vec_eq(&pose.position, &Vector3::new(-0.2, 0.0, 0.0), EPSILON);
    }

    #[test]
    fn test_root_serial_truncated() {
        let config =
            JointConfig::new(0x10, 0, Vector3::zeros()).with_root_serial("LHR-0123456789ABCDEFGH");
        assert_eq!(config.root_serial.len(), ROOT_SERIAL_LEN);
        assert_eq!(config.root_serial.as_str(), "LHR-0123456789ABCDEF");
    }
}
