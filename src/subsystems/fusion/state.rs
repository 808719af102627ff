//! Shared pose state
//!
//! Written by the fusion task at filter rate (last write wins) and read by the
//! relay responder, presentation and status tasks. Every access is a short
//! copy in or out under the [`SharedState`](crate::core::traits::SharedState)
//! lock; no filter math runs while it is held.

use bitflags::bitflags;
use jtracker_core::calibration::CalibrationStatus;
use jtracker_core::relay::{Command, RelayFrame, MAX_FRAME_LEN};
use nalgebra::{Quaternion, Vector4};

bitflags! {
    /// User or relay-triggered actions waiting for the fusion task
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct PendingActions: u8 {
        /// Capture the current orientation as neutral
        const SET_NEUTRAL = 0b0000_0001;
        /// Capture the forward direction
        const SET_FORWARD = 0b0000_0010;
        /// Restart gyro bias calibration
        const GYRO_CALIBRATION = 0b0000_0100;
    }
}

impl From<Command> for PendingActions {
    fn from(command: Command) -> Self {
        match command {
            Command::GetQuaternion => PendingActions::empty(),
            Command::SetNeutral => PendingActions::SET_NEUTRAL,
            Command::StartGyroCalibration => PendingActions::GYRO_CALIBRATION,
            Command::SetForwardDirection => PendingActions::SET_FORWARD,
        }
    }
}

/// Largest corrected tick magnitude seen on any axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Peaks {
    /// Gyro
    pub gyro: u16,
    /// Accelerometer
    pub accel: u16,
}

/// Latest published pose
#[derive(Debug, Clone)]
pub struct PoseState {
    frame: [u8; MAX_FRAME_LEN],
    frame_len: usize,
    /// Orientation after the optional axis remap, before local calibration
    pub orientation: Quaternion<f32>,
    /// Calibration progress
    pub calibration: CalibrationStatus,
    /// Peak corrected ticks
    pub peaks: Peaks,
    /// Actions for the fusion task to apply before its next sample
    pub pending: PendingActions,
    /// Number of frames published
    pub sequence: u32,
    /// Publish time (µs since boot)
    pub updated_us: u64,
}

impl PoseState {
    /// Nothing published yet
    pub const fn new() -> Self {
        Self {
            frame: [0; MAX_FRAME_LEN],
            frame_len: 0,
            orientation: Quaternion {
                coords: Vector4::new(0.0, 0.0, 0.0, 1.0),
            },
            calibration: CalibrationStatus::GyroProcessing,
            peaks: Peaks { gyro: 0, accel: 0 },
            pending: PendingActions::empty(),
            sequence: 0,
            updated_us: 0,
        }
    }

    /// Store an encoded frame
    pub fn publish(&mut self, frame: &RelayFrame, now_us: u64) {
        let (bytes, len) = frame.to_bytes();
        self.frame = bytes;
        self.frame_len = len;
        self.sequence = self.sequence.wrapping_add(1);
        self.updated_us = now_us;
    }

    /// Encoded frame bytes, `None` before the first publish
    pub fn frame(&self) -> Option<&[u8]> {
        if self.frame_len == 0 {
            None
        } else {
            Some(&self.frame[..self.frame_len])
        }
    }

    /// Add actions for the fusion task
    pub fn request(&mut self, actions: PendingActions) {
        self.pending |= actions;
    }

    /// Remove and return every pending action
    pub fn take_pending(&mut self) -> PendingActions {
        core::mem::take(&mut self.pending)
    }
}

impl Default for PoseState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jtracker_core::relay::{FrameLayout, SINGLE_FRAME_LEN};

    #[test]
    fn test_no_frame_before_publish() {
        let state = PoseState::new();
        assert!(state.frame().is_none());
        assert_eq!(state.orientation, Quaternion::identity());
    }

    #[test]
    fn test_publish_replaces_frame() {
        let mut state = PoseState::new();
        let q = Quaternion::new(0.0, 1.0, 0.0, 0.0);
        state.publish(&RelayFrame::single(Quaternion::identity()), 10);
        state.publish(&RelayFrame::single(q), 20);

        let bytes = state.frame().unwrap();
        assert_eq!(bytes.len(), SINGLE_FRAME_LEN);
        assert_eq!(
            RelayFrame::decode(bytes, FrameLayout::Single).unwrap().orientation,
            q
        );
        assert_eq!(state.sequence, 2);
        assert_eq!(state.updated_us, 20);
    }

    #[test]
    fn test_commands_map_to_actions() {
        assert!(PendingActions::from(Command::GetQuaternion).is_empty());
        assert_eq!(
            PendingActions::from(Command::SetForwardDirection),
            PendingActions::SET_FORWARD
        );
    }

    #[test]
    fn test_pending_is_taken_once() {
        let mut state = PoseState::new();
        state.request(PendingActions::SET_NEUTRAL);
        state.request(PendingActions::SET_FORWARD);

        let taken = state.take_pending();
        assert!(taken.contains(PendingActions::SET_NEUTRAL | PendingActions::SET_FORWARD));
        assert!(state.take_pending().is_empty());
    }
}
