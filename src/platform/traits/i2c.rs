//! I2C bus traits
//!
//! [`I2cInterface`] is the controller side used by the relay coordinator and
//! IMU adapters. [`I2cTarget`] is the responder side a subordinate node runs
//! on its own bus address.

use crate::platform::Result;

/// I2C configuration
#[derive(Debug, Clone, Copy)]
pub struct I2cConfig {
    /// Bus frequency in Hz
    pub frequency: u32,
    /// Per-transaction timeout in microseconds
    pub timeout_us: u32,
}

impl Default for I2cConfig {
    fn default() -> Self {
        Self {
            frequency: 400_000,
            timeout_us: 5_000,
        }
    }
}

/// I2C controller.
///
/// Addresses are 7-bit. Implementations must bound every transaction by the
/// configured timeout; a stalled bus returns `I2cError::Timeout` instead of
/// hanging the calling task.
#[allow(async_fn_in_trait)]
pub trait I2cInterface {
    /// START - ADDR(W) - DATA - STOP
    async fn write(&mut self, addr: u8, data: &[u8]) -> Result<()>;

    /// START - ADDR(R) - DATA - STOP
    async fn read(&mut self, addr: u8, buffer: &mut [u8]) -> Result<()>;

    /// Write then read with a repeated START (register access)
    async fn write_read(&mut self, addr: u8, write_data: &[u8], read_buffer: &mut [u8])
        -> Result<()>;
}

/// What the controller asked of a target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetRequest {
    /// Controller wrote `n` bytes into the listen buffer
    Write(usize),
    /// Controller started a read
    Read,
    /// Controller wrote `n` bytes, then issued a repeated-START read
    WriteRead(usize),
}

/// I2C target (subordinate) endpoint
#[allow(async_fn_in_trait)]
pub trait I2cTarget {
    /// Wait for the next request addressed to us
    async fn listen(&mut self, buffer: &mut [u8]) -> Result<TargetRequest>;

    /// Answer a pending read with `data`
    async fn respond_to_read(&mut self, data: &[u8]) -> Result<()>;
}
