//! Coordinator relay task
//!
//! Polls every movable joint, composes the chain and publishes the poses.
//! Runs apart from fusion and presentation so a stalled bus only delays
//! this task.
//!
//! Where calibration lives depends on the frame layout: with single frames
//! the coordinator's own joint descriptors hold neutral and forward; with
//! dual frames the subordinates apply them and the command is relayed.

use super::state::{ChainState, MAX_JOINTS};
use crate::communication::relay::RelayCoordinator;
use crate::core::scheduler::PeriodicStep;
use crate::core::traits::{SharedState, TimeSource};
use crate::log_info;
use crate::platform::I2cInterface;
use crate::subsystems::fusion::PendingActions;
use embedded_hal_async::delay::DelayNs;
use heapless::Vec;
use jtracker_core::pose::JointChain;
use jtracker_core::relay::{Command, FrameLayout};
use nalgebra::Quaternion;

/// Relay poll and chain composition
pub struct ChainTask<'a, I, D, S, T>
where
    I: I2cInterface,
    D: DelayNs,
    S: SharedState<ChainState>,
    T: TimeSource,
{
    i2c: I,
    coordinator: RelayCoordinator<D>,
    chain: JointChain<MAX_JOINTS>,
    addresses: Vec<u8, MAX_JOINTS>,
    live: Vec<Quaternion<f32>, MAX_JOINTS>,
    state: &'a S,
    time: T,
}

impl<'a, I, D, S, T> ChainTask<'a, I, D, S, T>
where
    I: I2cInterface,
    D: DelayNs,
    S: SharedState<ChainState>,
    T: TimeSource,
{
    /// Task over the movable joints of `chain`
    pub fn new(
        i2c: I,
        coordinator: RelayCoordinator<D>,
        chain: JointChain<MAX_JOINTS>,
        state: &'a S,
        time: T,
    ) -> Self {
        let mut addresses = Vec::new();
        let mut live = Vec::new();
        for joint in chain.joints() {
            // Same capacity as the chain
            let _ = addresses.push(joint.config().address);
            let _ = live.push(Quaternion::identity());
        }
        Self {
            i2c,
            coordinator,
            chain,
            addresses,
            live,
            state,
            time,
        }
    }

    /// Joint chain with its current calibration
    pub fn chain(&self) -> &JointChain<MAX_JOINTS> {
        &self.chain
    }

    /// Last accepted orientation per joint
    pub fn live(&self) -> &[Quaternion<f32>] {
        &self.live
    }

    /// Relay counters
    pub fn coordinator(&self) -> &RelayCoordinator<D> {
        &self.coordinator
    }

    /// Apply user-triggered calibration actions
    pub async fn apply(&mut self, actions: PendingActions) {
        if actions.contains(PendingActions::GYRO_CALIBRATION) {
            let acked = self
                .coordinator
                .broadcast(&mut self.i2c, &self.addresses, Command::StartGyroCalibration)
                .await;
            log_info!("gyro calibration restarted on {} nodes", acked);
        }

        match self.coordinator.layout() {
            FrameLayout::Single => {
                for (joint, live) in self.chain.joints_mut().iter_mut().zip(&self.live) {
                    if actions.contains(PendingActions::SET_NEUTRAL) {
                        joint.set_neutral(*live);
                    }
                    if actions.contains(PendingActions::SET_FORWARD) {
                        let _ = joint.set_forward_direction(*live);
                    }
                }
            }
            FrameLayout::Dual => {
                for (flag, command) in [
                    (PendingActions::SET_NEUTRAL, Command::SetNeutral),
                    (PendingActions::SET_FORWARD, Command::SetForwardDirection),
                ] {
                    if actions.contains(flag) {
                        self.coordinator
                            .broadcast(&mut self.i2c, &self.addresses, command)
                            .await;
                    }
                }
            }
        }
    }

    /// One poll, compose and publish cycle. Returns the joints refreshed.
    pub async fn run_once(&mut self) -> usize {
        let pending = self.state.with_mut(|s| core::mem::take(&mut s.pending));
        if !pending.is_empty() {
            self.apply(pending).await;
        }

        let refreshed = self
            .coordinator
            .refresh(&mut self.i2c, &self.addresses, &mut self.live)
            .await;

        let poses = self.chain.compose(&self.live);
        let now = self.time.now_us();
        self.state.with_mut(|s| s.publish(&poses, now));
        refreshed
    }
}

impl<'a, I, D, S, T> PeriodicStep for ChainTask<'a, I, D, S, T>
where
    I: I2cInterface,
    D: DelayNs,
    S: SharedState<ChainState>,
    T: TimeSource,
{
    async fn step(&mut self) {
        self.run_once().await;
    }
}
