//! Relay responder (subordinate node)
//!
//! Serves the latest published frame from [`PoseState`] and turns calibration
//! commands into pending actions for the fusion task. It never waits on the
//! fusion task and never queues frames: a read returns whatever was published
//! last.

use crate::core::traits::SharedState;
use crate::log_debug;
use crate::platform::{I2cTarget, Result, TargetRequest};
use crate::subsystems::fusion::{PendingActions, PoseState};
use jtracker_core::relay::{Command, FrameLayout, RelayFrame, MAX_FRAME_LEN};
use nalgebra::Quaternion;

/// Longest controller write accepted (opcode plus slack)
const COMMAND_BUF_LEN: usize = 4;

/// Responder counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResponderStats {
    /// Frames sent
    pub frames: u32,
    /// Commands accepted
    pub commands: u32,
    /// Unknown opcodes ignored
    pub unknown: u32,
}

/// Target-side half of the relay protocol
pub struct RelayResponder<'a, S: SharedState<PoseState>> {
    state: &'a S,
    layout: FrameLayout,
    stats: ResponderStats,
}

impl<'a, S: SharedState<PoseState>> RelayResponder<'a, S> {
    /// Serve frames of `layout` from `state`
    pub fn new(state: &'a S, layout: FrameLayout) -> Self {
        Self {
            state,
            layout,
            stats: ResponderStats::default(),
        }
    }

    /// Counters since creation
    pub fn stats(&self) -> ResponderStats {
        self.stats
    }

    /// Handle one bus request, returning the command it carried
    pub async fn serve_once<T: I2cTarget>(&mut self, target: &mut T) -> Result<Option<Command>> {
        let mut buf = [0u8; COMMAND_BUF_LEN];
        match target.listen(&mut buf).await? {
            TargetRequest::Write(n) => Ok(self.accept(&buf[..n])),
            TargetRequest::Read => {
                self.respond(target).await?;
                Ok(None)
            }
            TargetRequest::WriteRead(n) => {
                let command = self.accept(&buf[..n]);
                self.respond(target).await?;
                Ok(command)
            }
        }
    }

    /// Serve requests forever; bus errors are logged and skipped
    pub async fn run<T: I2cTarget>(&mut self, target: &mut T) -> ! {
        loop {
            if let Err(e) = self.serve_once(target).await {
                log_debug!("relay target: {}", e.as_str());
            }
        }
    }

    fn accept(&mut self, written: &[u8]) -> Option<Command> {
        let &opcode = written.first()?;
        let command = match Command::try_from(opcode) {
            Ok(command) => command,
            Err(_) => {
                self.stats.unknown = self.stats.unknown.wrapping_add(1);
                log_debug!("relay target: unknown opcode {:#x}", opcode);
                return None;
            }
        };

        self.stats.commands = self.stats.commands.wrapping_add(1);
        let actions = PendingActions::from(command);
        if !actions.is_empty() {
            self.state.with_mut(|s| s.request(actions));
        }
        Some(command)
    }

    async fn respond<T: I2cTarget>(&mut self, target: &mut T) -> Result<()> {
        let (buf, len) = self.snapshot();
        target.respond_to_read(&buf[..len]).await?;
        self.stats.frames = self.stats.frames.wrapping_add(1);
        Ok(())
    }

    /// Latest frame, or an identity frame before the first publish
    fn snapshot(&self) -> ([u8; MAX_FRAME_LEN], usize) {
        let published = self.state.with(|s| {
            s.frame().map(|bytes| {
                let mut buf = [0u8; MAX_FRAME_LEN];
                buf[..bytes.len()].copy_from_slice(bytes);
                (buf, bytes.len())
            })
        });
        published.unwrap_or_else(|| {
            let identity = Quaternion::identity();
            match self.layout {
                FrameLayout::Single => RelayFrame::single(identity),
                FrameLayout::Dual => RelayFrame::dual(identity, identity),
            }
            .to_bytes()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::traits::MockState;
    use crate::platform::mock::MockI2cTarget;

    fn decode(bytes: &[u8], layout: FrameLayout) -> RelayFrame {
        RelayFrame::decode(bytes, layout).unwrap()
    }

    #[tokio::test]
    async fn test_read_serves_latest_frame() {
        let state = MockState::new(PoseState::new());
        let q = Quaternion::new(0.0, 0.0, 0.0, 1.0);
        state.with_mut(|s| {
            s.publish(&RelayFrame::single(Quaternion::identity()), 1);
            s.publish(&RelayFrame::single(q), 2);
        });

        let mut target = MockI2cTarget::new();
        target.push_write(&[Command::GetQuaternion.opcode()]);
        target.push_read();

        let mut responder = RelayResponder::new(&state, FrameLayout::Single);
        assert_eq!(
            responder.serve_once(&mut target).await,
            Ok(Some(Command::GetQuaternion))
        );
        assert_eq!(responder.serve_once(&mut target).await, Ok(None));

        let sent = &target.responses()[0];
        assert_eq!(decode(sent, FrameLayout::Single).orientation, q);
        assert_eq!(responder.stats().frames, 1);
    }

    #[tokio::test]
    async fn test_identity_before_first_publish() {
        let state = MockState::new(PoseState::new());
        let mut target = MockI2cTarget::new();
        target.push_read();

        let mut responder = RelayResponder::new(&state, FrameLayout::Dual);
        responder.serve_once(&mut target).await.unwrap();

        let frame = decode(&target.responses()[0], FrameLayout::Dual);
        assert_eq!(frame.orientation, Quaternion::identity());
        assert_eq!(frame.correction, Some(Quaternion::identity()));
    }

    #[tokio::test]
    async fn test_commands_become_pending_actions() {
        let state = MockState::new(PoseState::new());
        let mut target = MockI2cTarget::new();
        target.push_write(&[Command::SetNeutral.opcode()]);
        target.push_write(&[Command::StartGyroCalibration.opcode()]);
        target.push_write(&[0x7E]);

        let mut responder = RelayResponder::new(&state, FrameLayout::Single);
        for _ in 0..3 {
            responder.serve_once(&mut target).await.unwrap();
        }

        let pending = state.with(|s| s.pending);
        assert_eq!(
            pending,
            PendingActions::SET_NEUTRAL | PendingActions::GYRO_CALIBRATION
        );
        let stats = responder.stats();
        assert_eq!((stats.commands, stats.unknown), (2, 1));
    }

    #[tokio::test]
    async fn test_write_read_answers_in_one_transaction() {
        let state = MockState::new(PoseState::new());
        let mut target = MockI2cTarget::new();
        target.push_write_read(&[Command::GetQuaternion.opcode()]);

        let mut responder = RelayResponder::new(&state, FrameLayout::Single);
        assert_eq!(
            responder.serve_once(&mut target).await,
            Ok(Some(Command::GetQuaternion))
        );
        assert_eq!(target.responses().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_write_is_ignored() {
        let state = MockState::new(PoseState::new());
        let mut target = MockI2cTarget::new();
        target.push_write(&[]);

        let mut responder = RelayResponder::new(&state, FrameLayout::Single);
        assert_eq!(responder.serve_once(&mut target).await, Ok(None));
        assert!(target.responses().is_empty());
    }
}
