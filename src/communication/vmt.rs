//! Tracker datagram output
//!
//! Encodes joint poses with [`jtracker_core::output::vmt`] and sends one
//! datagram per joint to the host driver. Best effort: a failed send is
//! counted and forgotten.
//!
//! Output can be toggled. Disabling sends every known tracker once with
//! `enable = 0`; fixed joints are sent once per enable cycle since their pose
//! never changes.
//!
//! Fixed joints go out as `/VMT/Joint/Driver` and relayed (movable) joints as
//! `/VMT/Follow/Driver` unless [`VmtSender::with_messages`] says otherwise.

use crate::log_debug;
use crate::platform::{DatagramSink, Endpoint, PlatformError};
use jtracker_core::output::{encode, EncodeError, TrackerArgs, VmtMessage, MAX_DATAGRAM_LEN};
use jtracker_core::pose::{JointConfig, JointDescriptor, Pose};

/// Why a datagram was not sent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputError {
    /// Message could not be encoded
    Encode(EncodeError),
    /// Sink rejected the datagram
    Send(PlatformError),
}

impl OutputError {
    /// Return variant name as a static string (usable with defmt on embedded)
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputError::Encode(e) => e.as_str(),
            OutputError::Send(e) => e.as_str(),
        }
    }
}

impl core::fmt::Display for OutputError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            OutputError::Encode(e) => write!(f, "encode failed: {}", e),
            OutputError::Send(e) => write!(f, "send failed: {}", e),
        }
    }
}

/// Output counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OutputStats {
    /// Datagrams sent
    pub sent: u32,
    /// Encoder rejections
    pub encode_errors: u32,
    /// Sink failures
    pub send_errors: u32,
}

/// Datagram sender for one host
pub struct VmtSender<K: DatagramSink> {
    sink: K,
    host: Endpoint,
    fixed_message: VmtMessage,
    movable_message: VmtMessage,
    enabled: bool,
    fixed_sent: bool,
    buf: [u8; MAX_DATAGRAM_LEN],
    stats: OutputStats,
}

impl<K: DatagramSink> VmtSender<K> {
    /// Sender with the default address per joint kind
    pub fn new(sink: K, host: Endpoint, enabled: bool) -> Self {
        Self {
            sink,
            host,
            fixed_message: VmtMessage::Joint,
            movable_message: VmtMessage::Follow,
            enabled,
            fixed_sent: false,
            buf: [0; MAX_DATAGRAM_LEN],
            stats: OutputStats::default(),
        }
    }

    /// Override the address used for fixed and movable joints
    pub fn with_messages(mut self, fixed: VmtMessage, movable: VmtMessage) -> Self {
        self.fixed_message = fixed;
        self.movable_message = movable;
        self
    }

    /// Destination
    pub fn host(&self) -> Endpoint {
        self.host
    }

    /// Change the destination
    pub fn set_host(&mut self, host: Endpoint) {
        self.host = host;
    }

    /// True while poses are streamed
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Counters since creation
    pub fn stats(&self) -> OutputStats {
        self.stats
    }

    /// Underlying sink
    pub fn sink(&self) -> &K {
        &self.sink
    }

    /// Send one tracker message
    pub async fn send(
        &mut self,
        message: VmtMessage,
        args: &TrackerArgs,
        identifier: &str,
    ) -> Result<usize, OutputError> {
        let len = match encode(message, args, identifier, &mut self.buf) {
            Ok(len) => len,
            Err(e) => {
                self.stats.encode_errors = self.stats.encode_errors.wrapping_add(1);
                return Err(OutputError::Encode(e));
            }
        };
        match self.sink.send_to(&self.buf[..len], self.host).await {
            Ok(()) => {
                self.stats.sent = self.stats.sent.wrapping_add(1);
                Ok(len)
            }
            Err(e) => {
                self.stats.send_errors = self.stats.send_errors.wrapping_add(1);
                Err(OutputError::Send(e))
            }
        }
    }

    async fn send_joint(&mut self, message: VmtMessage, config: &JointConfig, pose: &Pose) -> bool {
        let args = TrackerArgs::new(config.tracker_index, pose.rotation, pose.position);
        match self.send(message, &args, config.root_serial.as_str()).await {
            Ok(_) => true,
            Err(e) => {
                log_debug!("tracker {}: {}", config.tracker_index, e.as_str());
                false
            }
        }
    }

    /// Send the pose of every movable joint.
    ///
    /// `poses[i]` belongs to `joints[i]`. Returns the number sent; nothing is
    /// sent while output is disabled.
    pub async fn send_poses(&mut self, joints: &[JointConfig], poses: &[Pose]) -> usize {
        if !self.enabled {
            return 0;
        }
        let mut sent = 0;
        for (joint, pose) in joints.iter().zip(poses) {
            if self.send_joint(self.movable_message, joint, pose).await {
                sent += 1;
            }
        }
        sent
    }

    /// Send fixed joints with their configured rotation, once per enable
    /// cycle. The cycle counts as done only if every joint went out.
    pub async fn send_fixed(&mut self, joints: &[JointDescriptor]) -> usize {
        if !self.enabled || self.fixed_sent {
            return 0;
        }
        let mut sent = 0;
        for joint in joints {
            if self
                .send_joint(self.fixed_message, joint.config(), &joint.static_pose())
                .await
            {
                sent += 1;
            }
        }
        self.fixed_sent = sent == joints.len();
        sent
    }

    /// Toggle streaming.
    ///
    /// Disabling sends a disable message for every movable and fixed joint,
    /// each under its own address. Enabling schedules the fixed joints again.
    /// Returns the number of disable messages sent.
    pub async fn set_enabled(
        &mut self,
        enabled: bool,
        movable: &[JointConfig],
        fixed: &[JointDescriptor],
    ) -> usize {
        if enabled == self.enabled {
            return 0;
        }
        self.enabled = enabled;
        if enabled {
            self.fixed_sent = false;
            return 0;
        }

        let (fixed_message, movable_message) = (self.fixed_message, self.movable_message);
        let sweep = movable
            .iter()
            .map(|c| (movable_message, c))
            .chain(fixed.iter().map(|j| (fixed_message, j.config())));
        let mut sent = 0;
        for (message, config) in sweep {
            let args = TrackerArgs::disabled(config.tracker_index);
            if self
                .send(message, &args, config.root_serial.as_str())
                .await
                .is_ok()
            {
                sent += 1;
            }
        }
        sent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::mock::MockDatagramSink;
    use jtracker_core::output::decode;
    use jtracker_core::pose::JointConfig;
    use nalgebra::{Quaternion, Vector3};

    const HOST: Endpoint = Endpoint::new([192, 168, 1, 2], 39570);

    fn joint(index: u8) -> JointDescriptor {
        JointDescriptor::new(
            JointConfig::new(0x10 + index, index, Vector3::new(0.0, 0.0, -0.3))
                .with_root_serial("LHR-00000001"),
        )
    }

    fn sender(enabled: bool) -> VmtSender<MockDatagramSink> {
        VmtSender::new(MockDatagramSink::new(), HOST, enabled)
    }

    fn configs(joints: &[JointDescriptor]) -> std::vec::Vec<JointConfig> {
        joints.iter().map(|j| j.config().clone()).collect()
    }

    #[tokio::test]
    async fn test_poses_are_sent_to_host() {
        let mut out = sender(true);
        let joints = [joint(1), joint(2)];
        let poses = [joints[0].pose(Quaternion::identity()); 2];

        assert_eq!(out.send_poses(&configs(&joints), &poses).await, 2);

        let sent = out.sink().sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].0, HOST);
        let msg = decode(&sent[1].1).unwrap();
        assert_eq!(msg.message, VmtMessage::Follow);
        assert_eq!(msg.args.index, 2);
        assert_eq!(msg.args.enable, 1);
        assert_eq!(msg.identifier.as_str(), "LHR-00000001");
    }

    #[tokio::test]
    async fn test_fixed_joints_once_per_enable_cycle() {
        let mut out = sender(true);
        let fixed = [joint(5)];

        assert_eq!(out.send_fixed(&fixed).await, 1);
        assert_eq!(out.send_fixed(&fixed).await, 0);

        assert_eq!(out.set_enabled(false, &[], &fixed).await, 1);
        out.set_enabled(true, &[], &fixed).await;
        assert_eq!(out.send_fixed(&fixed).await, 1);

        for (_, bytes) in out.sink().sent() {
            assert_eq!(decode(bytes).unwrap().message, VmtMessage::Joint);
        }
    }

    #[tokio::test]
    async fn test_fixed_retried_after_send_failure() {
        let mut sink = MockDatagramSink::new();
        sink.fail_next(1);
        let mut out = VmtSender::new(sink, HOST, true);
        let fixed = [joint(5)];

        assert_eq!(out.send_fixed(&fixed).await, 0);
        assert_eq!(out.send_fixed(&fixed).await, 1);
        assert_eq!(out.stats().send_errors, 1);
    }

    #[tokio::test]
    async fn test_disable_sends_identity_at_origin() {
        let mut out = sender(true);
        let joints = configs(&[joint(1), joint(2)]);
        let fixed = [joint(5)];

        assert_eq!(out.set_enabled(false, &joints, &fixed).await, 3);
        assert!(!out.is_enabled());
        let sent = out.sink().sent();
        let kinds: std::vec::Vec<(i32, VmtMessage)> = sent
            .iter()
            .map(|(_, bytes)| {
                let msg = decode(bytes).unwrap();
                (msg.args.index, msg.message)
            })
            .collect();
        assert_eq!(
            kinds,
            vec![
                (1, VmtMessage::Follow),
                (2, VmtMessage::Follow),
                (5, VmtMessage::Joint)
            ]
        );
        for (_, bytes) in sent {
            let msg = decode(bytes).unwrap();
            assert_eq!(msg.args.enable, 0);
            assert_eq!(msg.args.rotation, Quaternion::identity());
            assert_eq!(msg.args.position, Vector3::zeros());
        }

        let poses = [Pose::identity(); 2];
        assert_eq!(out.send_poses(&joints, &poses).await, 0);
        assert_eq!(out.set_enabled(false, &joints, &fixed).await, 0);
    }

    #[tokio::test]
    async fn test_message_override() {
        let mut out = sender(true).with_messages(VmtMessage::Raw, VmtMessage::Joint);
        let fixed = [joint(5)];
        let joints = configs(&[joint(1)]);

        out.send_fixed(&fixed).await;
        out.send_poses(&joints, &[Pose::identity()]).await;

        let sent = out.sink().sent();
        assert_eq!(decode(&sent[0].1).unwrap().message, VmtMessage::Raw);
        assert_eq!(decode(&sent[1].1).unwrap().message, VmtMessage::Joint);
    }

    #[tokio::test]
    async fn test_encode_error_is_counted() {
        let mut out = sender(true);
        let args = TrackerArgs::new(1, Quaternion::identity(), Vector3::zeros());
        let bad = "bad\0serial";

        assert!(matches!(
            out.send(VmtMessage::Follow, &args, bad).await,
            Err(OutputError::Encode(EncodeError::InvalidIdentifier))
        ));
        assert_eq!(out.stats().encode_errors, 1);
        assert!(out.sink().sent().is_empty());
    }
}
