//! Composed chain state shared between the relay and presentation tasks

use crate::subsystems::fusion::PendingActions;
use heapless::Vec;
use jtracker_core::pose::Pose;

/// Most movable joints one coordinator serves
pub const MAX_JOINTS: usize = 8;

/// Latest composed poses
#[derive(Debug, Clone)]
pub struct ChainState {
    /// World pose per movable joint, chain order
    pub poses: Vec<Pose, MAX_JOINTS>,
    /// Number of compositions published
    pub sequence: u32,
    /// Publish time (µs since boot)
    pub updated_us: u64,
    /// Calibration actions for the relay task
    pub pending: PendingActions,
    /// Stream poses to the host
    pub output_enabled: bool,
}

impl ChainState {
    /// Nothing composed yet
    pub const fn new(output_enabled: bool) -> Self {
        Self {
            poses: Vec::new(),
            sequence: 0,
            updated_us: 0,
            pending: PendingActions::empty(),
            output_enabled,
        }
    }

    /// Replace the poses
    pub fn publish(&mut self, poses: &[Pose], now_us: u64) {
        self.poses.clear();
        // Chain capacity never exceeds MAX_JOINTS
        let _ = self.poses.extend_from_slice(poses);
        self.sequence = self.sequence.wrapping_add(1);
        self.updated_us = now_us;
    }
}

impl Default for ChainState {
    fn default() -> Self {
        Self::new(true)
    }
}
