//! Relay coordinator
//!
//! Pulls orientation frames from subordinate nodes:
//!
//! ```text
//! write(addr, [GetQuaternion]) -> settle delay -> read(addr, frame)
//! ```
//!
//! A failed transaction or a frame with a bad sentinel is dropped for this
//! cycle; the caller keeps the previous orientation and the next poll tries
//! again. There is no in-cycle retry.

use crate::log_debug;
use crate::platform::{I2cInterface, PlatformError};
use embedded_hal_async::delay::DelayNs;
use jtracker_core::relay::{Command, FrameError, FrameLayout, RelayFrame, MAX_FRAME_LEN};
use nalgebra::Quaternion;

/// Why a poll produced no frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayError {
    /// Bus transaction failed
    Bus(PlatformError),
    /// Frame failed validation
    Frame(FrameError),
}

impl RelayError {
    /// Return variant name as a static string (usable with defmt on embedded)
    pub fn as_str(&self) -> &'static str {
        match self {
            RelayError::Bus(e) => e.as_str(),
            RelayError::Frame(e) => e.as_str(),
        }
    }
}

impl core::fmt::Display for RelayError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            RelayError::Bus(e) => write!(f, "relay bus error: {}", e),
            RelayError::Frame(e) => write!(f, "relay frame rejected: {}", e),
        }
    }
}

impl From<PlatformError> for RelayError {
    fn from(e: PlatformError) -> Self {
        RelayError::Bus(e)
    }
}

impl From<FrameError> for RelayError {
    fn from(e: FrameError) -> Self {
        RelayError::Frame(e)
    }
}

/// Poll counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RelayStats {
    /// Frames requested
    pub polls: u32,
    /// Frames accepted
    pub accepted: u32,
    /// Bus failures
    pub bus_errors: u32,
    /// Sentinel or length mismatches
    pub frame_errors: u32,
}

/// Bus-side half of the relay protocol
pub struct RelayCoordinator<D: DelayNs> {
    delay: D,
    settle_us: u32,
    layout: FrameLayout,
    stats: RelayStats,
}

impl<D: DelayNs> RelayCoordinator<D> {
    /// Coordinator reading `layout` frames after `settle_us`
    pub fn new(delay: D, settle_us: u32, layout: FrameLayout) -> Self {
        Self {
            delay,
            settle_us,
            layout,
            stats: RelayStats::default(),
        }
    }

    /// Frame layout expected from subordinates
    pub fn layout(&self) -> FrameLayout {
        self.layout
    }

    /// Counters since creation
    pub fn stats(&self) -> RelayStats {
        self.stats
    }

    /// Request and validate one frame from `address`
    pub async fn poll<I: I2cInterface>(
        &mut self,
        i2c: &mut I,
        address: u8,
    ) -> Result<RelayFrame, RelayError> {
        self.stats.polls = self.stats.polls.wrapping_add(1);
        match self.transact(i2c, address).await {
            Ok(frame) => {
                self.stats.accepted = self.stats.accepted.wrapping_add(1);
                Ok(frame)
            }
            Err(e) => {
                match e {
                    RelayError::Bus(_) => {
                        self.stats.bus_errors = self.stats.bus_errors.wrapping_add(1)
                    }
                    RelayError::Frame(_) => {
                        self.stats.frame_errors = self.stats.frame_errors.wrapping_add(1)
                    }
                }
                log_debug!("relay {:#x}: {}", address, e.as_str());
                Err(e)
            }
        }
    }

    async fn transact<I: I2cInterface>(
        &mut self,
        i2c: &mut I,
        address: u8,
    ) -> Result<RelayFrame, RelayError> {
        i2c.write(address, &[Command::GetQuaternion.opcode()]).await?;
        self.delay.delay_us(self.settle_us).await;

        let mut buf = [0u8; MAX_FRAME_LEN];
        let frame = &mut buf[..self.layout.size()];
        i2c.read(address, frame).await?;
        Ok(RelayFrame::decode(frame, self.layout)?)
    }

    /// Poll every address, replacing `live[i]` on success.
    ///
    /// Entries whose poll fails keep their previous value. Returns the number
    /// of orientations refreshed.
    pub async fn refresh<I: I2cInterface>(
        &mut self,
        i2c: &mut I,
        addresses: &[u8],
        live: &mut [Quaternion<f32>],
    ) -> usize {
        let mut refreshed = 0;
        for (address, q) in addresses.iter().zip(live.iter_mut()) {
            if let Ok(frame) = self.poll(i2c, *address).await {
                *q = frame.orientation;
                refreshed += 1;
            }
        }
        refreshed
    }

    /// Send a command that has no reply to one subordinate
    pub async fn send<I: I2cInterface>(
        &mut self,
        i2c: &mut I,
        address: u8,
        command: Command,
    ) -> Result<(), RelayError> {
        i2c.write(address, &[command.opcode()]).await?;
        Ok(())
    }

    /// Send `command` to every address, returning how many acknowledged
    pub async fn broadcast<I: I2cInterface>(
        &mut self,
        i2c: &mut I,
        addresses: &[u8],
        command: Command,
    ) -> usize {
        let mut acked = 0;
        for &address in addresses {
            match self.send(i2c, address, command).await {
                Ok(()) => acked += 1,
                Err(e) => log_debug!(
                    "relay {:#x} {}: {}",
                    address,
                    command.as_str(),
                    e.as_str()
                ),
            }
        }
        acked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::error::I2cError;
    use crate::platform::mock::{I2cTransaction, MockI2c};
    use crate::platform::I2cConfig;

    #[derive(Default)]
    struct RecordingDelay {
        total_ns: u64,
    }

    impl DelayNs for RecordingDelay {
        async fn delay_ns(&mut self, ns: u32) {
            self.total_ns += u64::from(ns);
        }
    }

    fn coordinator(layout: FrameLayout) -> RelayCoordinator<RecordingDelay> {
        RelayCoordinator::new(RecordingDelay::default(), 15, layout)
    }

    fn frame_bytes(frame: &RelayFrame) -> std::vec::Vec<u8> {
        let (buf, len) = frame.to_bytes();
        buf[..len].to_vec()
    }

    fn tilted() -> Quaternion<f32> {
        Quaternion::new(0.8, 0.6, 0.0, 0.0)
    }

    #[tokio::test]
    async fn test_poll_sequence_and_settle() {
        let mut i2c = MockI2c::new(I2cConfig::default());
        i2c.set_response(0x11, &frame_bytes(&RelayFrame::single(tilted())));
        let mut relay = coordinator(FrameLayout::Single);

        let frame = relay.poll(&mut i2c, 0x11).await.unwrap();
        assert_eq!(frame.orientation, tilted());
        assert_eq!(
            i2c.transactions(),
            &[
                I2cTransaction::Write {
                    addr: 0x11,
                    data: vec![0x23]
                },
                I2cTransaction::Read { addr: 0x11, len: 24 },
            ]
        );
        assert_eq!(relay.delay.total_ns, 15_000);
    }

    #[tokio::test]
    async fn test_dual_layout_reads_40_bytes() {
        let mut i2c = MockI2c::new(I2cConfig::default());
        let sent = RelayFrame::dual(tilted(), Quaternion::identity());
        i2c.set_response(0x12, &frame_bytes(&sent));
        let mut relay = coordinator(FrameLayout::Dual);

        assert_eq!(relay.poll(&mut i2c, 0x12).await, Ok(sent));
        assert!(matches!(
            i2c.transactions()[1],
            I2cTransaction::Read { len: 40, .. }
        ));
    }

    #[tokio::test]
    async fn test_corrupt_frame_is_dropped() {
        let mut i2c = MockI2c::new(I2cConfig::default());
        let mut bytes = frame_bytes(&RelayFrame::single(tilted()));
        bytes[23] ^= 0xFF;
        i2c.set_response(0x11, &bytes);
        let mut relay = coordinator(FrameLayout::Single);

        assert_eq!(
            relay.poll(&mut i2c, 0x11).await,
            Err(RelayError::Frame(FrameError::Footer))
        );
        assert_eq!(relay.stats().frame_errors, 1);
    }

    #[tokio::test]
    async fn test_refresh_keeps_last_good_on_failure() {
        let mut i2c = MockI2c::new(I2cConfig::default());
        i2c.set_response(0x11, &frame_bytes(&RelayFrame::single(tilted())));
        i2c.fail_address(0x12, I2cError::Nack);
        let mut relay = coordinator(FrameLayout::Single);

        let previous = Quaternion::new(0.0, 0.0, 1.0, 0.0);
        let mut live = [Quaternion::identity(), previous];
        let refreshed = relay.refresh(&mut i2c, &[0x11, 0x12], &mut live).await;

        assert_eq!(refreshed, 1);
        assert_eq!(live, [tilted(), previous]);
        let stats = relay.stats();
        assert_eq!((stats.polls, stats.accepted, stats.bus_errors), (2, 1, 1));
    }

    #[tokio::test]
    async fn test_broadcast_counts_acks() {
        let mut i2c = MockI2c::new(I2cConfig::default());
        i2c.fail_address(0x13, I2cError::Nack);
        let mut relay = coordinator(FrameLayout::Single);

        let acked = relay
            .broadcast(&mut i2c, &[0x11, 0x12, 0x13], Command::SetNeutral)
            .await;
        assert_eq!(acked, 2);
        assert!(i2c.transactions().iter().all(|t| matches!(
            t,
            I2cTransaction::Write { data, .. } if data == &[0x24]
        )));
    }
}
