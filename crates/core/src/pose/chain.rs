//! Serial joint chain
//!
//! Each joint hangs off the end of the previous one:
//! `position[i] = position[i - 1] + world_bone[i]`, with the first joint
//! anchored at the chain root.

use super::joint::{JointDescriptor, Pose};
use heapless::Vec;
use nalgebra::{Quaternion, Vector3};

/// Error from chain construction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainError {
    /// More joints than the chain capacity
    Full,
}

impl core::fmt::Display for ChainError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ChainError::Full => write!(f, "joint chain full"),
        }
    }
}

/// Up to `N` joints composed root to tip
#[derive(Debug, Clone)]
pub struct JointChain<const N: usize> {
    root: Vector3<f32>,
    joints: Vec<JointDescriptor, N>,
}

impl<const N: usize> JointChain<N> {
    /// Empty chain anchored at `root`
    pub fn new(root: Vector3<f32>) -> Self {
        Self {
            root,
            joints: Vec::new(),
        }
    }

    /// Append a joint at the tip
    pub fn push(&mut self, joint: JointDescriptor) -> Result<(), ChainError> {
        self.joints.push(joint).map_err(|_| ChainError::Full)
    }

    /// Number of joints
    pub fn len(&self) -> usize {
        self.joints.len()
    }

    /// True if the chain holds no joints
    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    /// Chain anchor
    pub fn root(&self) -> Vector3<f32> {
        self.root
    }

    /// Move the chain anchor
    pub fn set_root(&mut self, root: Vector3<f32>) {
        self.root = root;
    }

    /// Joints, root first
    pub fn joints(&self) -> &[JointDescriptor] {
        &self.joints
    }

    /// Mutable access for calibration actions
    pub fn joints_mut(&mut self) -> &mut [JointDescriptor] {
        &mut self.joints
    }

    /// World pose of every joint for the given live orientations.
    ///
    /// `live[i]` belongs to joint `i`; joints without a matching entry keep
    /// their fixed configured rotation.
    pub fn compose(&self, live: &[Quaternion<f32>]) -> Vec<Pose, N> {
        let mut poses = Vec::new();
        let mut position = self.root;

        for (i, joint) in self.joints.iter().enumerate() {
            let local = match live.get(i) {
                Some(q) => joint.pose(*q),
                None => joint.static_pose(),
            };
            position += local.position;
            // Capacity matches self.joints
            let _ = poses.push(Pose {
                rotation: local.rotation,
                position,
            });
        }
        poses
    }
}
