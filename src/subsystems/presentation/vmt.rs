//! Tracker stream to the host
//!
//! Mirrors the composed chain into tracker datagrams. Poses go out once per
//! new composition; fixed joints once per enable cycle.

use crate::communication::vmt::VmtSender;
use crate::core::scheduler::PeriodicStep;
use crate::core::traits::SharedState;
use crate::log_info;
use crate::platform::DatagramSink;
use crate::subsystems::chain::{ChainState, MAX_JOINTS};
use heapless::Vec;
use jtracker_core::pose::{JointConfig, JointDescriptor, Pose};

/// Most fixed (sensorless) joints
pub const MAX_FIXED: usize = 4;

/// Presentation loop body for the tracker stream
pub struct VmtPresenter<'a, K, S>
where
    K: DatagramSink,
    S: SharedState<ChainState>,
{
    sender: VmtSender<K>,
    joints: Vec<JointConfig, MAX_JOINTS>,
    fixed: Vec<JointDescriptor, MAX_FIXED>,
    state: &'a S,
    last_sequence: u32,
}

impl<'a, K, S> VmtPresenter<'a, K, S>
where
    K: DatagramSink,
    S: SharedState<ChainState>,
{
    /// Stream `joints` (chain order) and `fixed` through `sender`
    pub fn new(
        sender: VmtSender<K>,
        joints: Vec<JointConfig, MAX_JOINTS>,
        fixed: Vec<JointDescriptor, MAX_FIXED>,
        state: &'a S,
    ) -> Self {
        Self {
            sender,
            joints,
            fixed,
            state,
            last_sequence: 0,
        }
    }

    /// Underlying sender
    pub fn sender(&self) -> &VmtSender<K> {
        &self.sender
    }

    /// Run one iteration, returning the number of datagrams sent
    pub async fn run_once(&mut self) -> usize {
        let (enabled, sequence, poses) = self
            .state
            .with(|s| (s.output_enabled, s.sequence, s.poses.clone()));

        let mut sent = 0;
        if enabled != self.sender.is_enabled() {
            log_info!("tracker output {}", if enabled { "on" } else { "off" });
            sent += self
                .sender
                .set_enabled(enabled, &self.joints, &self.fixed)
                .await;
        }
        if !enabled {
            return sent;
        }

        sent += self.sender.send_fixed(&self.fixed).await;
        if sequence != self.last_sequence {
            self.last_sequence = sequence;
            sent += self.send_poses(&poses).await;
        }
        sent
    }

    async fn send_poses(&mut self, poses: &[Pose]) -> usize {
        self.sender.send_poses(&self.joints, poses).await
    }
}

impl<'a, K, S> PeriodicStep for VmtPresenter<'a, K, S>
where
    K: DatagramSink,
    S: SharedState<ChainState>,
{
    async fn step(&mut self) {
        self.run_once().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::traits::MockState;
    use crate::platform::mock::MockDatagramSink;
    use crate::platform::Endpoint;
    use jtracker_core::output::{decode, VmtMessage};
    use nalgebra::Vector3;

    const HOST: Endpoint = Endpoint::new([192, 168, 1, 2], 39570);

    fn config(index: u8) -> JointConfig {
        JointConfig::new(0x10 + index, index, Vector3::new(0.0, 0.0, -0.3))
    }

    fn presenter(
        state: &MockState<ChainState>,
        enabled: bool,
    ) -> VmtPresenter<'_, MockDatagramSink, MockState<ChainState>> {
        let mut joints = Vec::new();
        joints.push(config(1)).unwrap();
        joints.push(config(2)).unwrap();
        let mut fixed = Vec::new();
        fixed.push(JointDescriptor::new(config(0))).unwrap();
        VmtPresenter::new(
            VmtSender::new(MockDatagramSink::new(), HOST, enabled),
            joints,
            fixed,
            state,
        )
    }

    fn publish(state: &MockState<ChainState>) {
        state.with_mut(|s| s.publish(&[Pose::identity(), Pose::identity()], 0));
    }

    #[tokio::test]
    async fn test_poses_follow_sequence() {
        let state = MockState::new(ChainState::new(true));
        let mut out = presenter(&state, true);

        // Fixed joint only, nothing composed yet
        assert_eq!(out.run_once().await, 1);

        publish(&state);
        assert_eq!(out.run_once().await, 2);
        assert_eq!(out.run_once().await, 0);

        publish(&state);
        assert_eq!(out.run_once().await, 2);
        assert_eq!(out.sender().stats().sent, 5);

        // Fixed joint first, then the movable ones
        let messages: std::vec::Vec<VmtMessage> = out
            .sender()
            .sink()
            .sent()
            .iter()
            .map(|(_, bytes)| decode(bytes).unwrap().message)
            .collect();
        assert_eq!(messages[0], VmtMessage::Joint);
        assert!(messages[1..].iter().all(|m| *m == VmtMessage::Follow));
    }

    #[tokio::test]
    async fn test_toggle_disables_every_tracker() {
        let state = MockState::new(ChainState::new(true));
        let mut out = presenter(&state, true);
        publish(&state);
        out.run_once().await;

        state.with_mut(|s| s.output_enabled = false);
        publish(&state);
        assert_eq!(out.run_once().await, 3);

        let sent = out.sender().sink().sent();
        let disabled: std::vec::Vec<(i32, VmtMessage)> = sent[sent.len() - 3..]
            .iter()
            .map(|(_, bytes)| {
                let msg = decode(bytes).unwrap();
                assert_eq!(msg.args.enable, 0);
                (msg.args.index, msg.message)
            })
            .collect();
        assert_eq!(
            disabled,
            vec![
                (1, VmtMessage::Follow),
                (2, VmtMessage::Follow),
                (0, VmtMessage::Joint)
            ]
        );

        // Disabled: nothing further goes out
        publish(&state);
        assert_eq!(out.run_once().await, 0);
    }

    #[tokio::test]
    async fn test_reenable_resends_fixed() {
        let state = MockState::new(ChainState::new(false));
        let mut out = presenter(&state, false);
        assert_eq!(out.run_once().await, 0);

        state.with_mut(|s| s.output_enabled = true);
        assert_eq!(out.run_once().await, 1);
        assert!(out.sender().is_enabled());
    }
}
