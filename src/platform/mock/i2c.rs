//! Mock I2C controller and target for testing

use crate::platform::{
    error::{I2cError, PlatformError},
    traits::{I2cConfig, I2cInterface, I2cTarget, TargetRequest},
    Result,
};
use std::collections::VecDeque;
use std::vec::Vec;

/// I2C transaction type for logging
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum I2cTransaction {
    /// Write transaction
    Write { addr: u8, data: Vec<u8> },
    /// Read transaction
    Read { addr: u8, len: usize },
    /// Write-Read transaction
    WriteRead {
        addr: u8,
        write_data: Vec<u8>,
        read_len: usize,
    },
}

/// Mock I2C controller.
///
/// Records every transaction. Reads are served from a per-address response
/// (repeated on every read) or, failing that, from a shared byte queue.
/// Addresses can be made to fail to exercise error paths.
#[derive(Debug, Default)]
pub struct MockI2c {
    config: I2cConfig,
    transactions: Vec<I2cTransaction>,
    read_data: VecDeque<u8>,
    responses: Vec<(u8, Vec<u8>)>,
    failures: Vec<(u8, I2cError)>,
}

impl MockI2c {
    /// Create a new mock I2C
    pub fn new(config: I2cConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Transaction log
    pub fn transactions(&self) -> &[I2cTransaction] {
        &self.transactions
    }

    /// Clear transaction log
    pub fn clear_transactions(&mut self) {
        self.transactions.clear();
    }

    /// Queue bytes for reads from any address without a fixed response
    pub fn set_read_data(&mut self, data: &[u8]) {
        self.read_data = data.iter().copied().collect();
    }

    /// Answer every read from `addr` with `data`
    pub fn set_response(&mut self, addr: u8, data: &[u8]) {
        self.responses.retain(|(a, _)| *a != addr);
        self.responses.push((addr, data.to_vec()));
    }

    /// Make every transaction to `addr` fail with `error`
    pub fn fail_address(&mut self, addr: u8, error: I2cError) {
        self.failures.retain(|(a, _)| *a != addr);
        self.failures.push((addr, error));
    }

    /// Undo `fail_address`
    pub fn clear_failure(&mut self, addr: u8) {
        self.failures.retain(|(a, _)| *a != addr);
    }

    /// Configured frequency
    pub fn frequency(&self) -> u32 {
        self.config.frequency
    }

    fn check(&self, addr: u8) -> Result<()> {
        match self.failures.iter().find(|(a, _)| *a == addr) {
            Some((_, e)) => Err(PlatformError::I2c(*e)),
            None => Ok(()),
        }
    }

    fn fill(&mut self, addr: u8, buffer: &mut [u8]) {
        if let Some((_, data)) = self.responses.iter().find(|(a, _)| *a == addr) {
            let n = buffer.len().min(data.len());
            buffer[..n].copy_from_slice(&data[..n]);
            return;
        }
        for b in buffer.iter_mut() {
            match self.read_data.pop_front() {
                Some(v) => *b = v,
                None => break,
            }
        }
    }
}

impl I2cInterface for MockI2c {
    async fn write(&mut self, addr: u8, data: &[u8]) -> Result<()> {
        self.transactions.push(I2cTransaction::Write {
            addr,
            data: data.to_vec(),
        });
        self.check(addr)
    }

    async fn read(&mut self, addr: u8, buffer: &mut [u8]) -> Result<()> {
        self.transactions.push(I2cTransaction::Read {
            addr,
            len: buffer.len(),
        });
        self.check(addr)?;
        self.fill(addr, buffer);
        Ok(())
    }

    async fn write_read(
        &mut self,
        addr: u8,
        write_data: &[u8],
        read_buffer: &mut [u8],
    ) -> Result<()> {
        self.transactions.push(I2cTransaction::WriteRead {
            addr,
            write_data: write_data.to_vec(),
            read_len: read_buffer.len(),
        });
        self.check(addr)?;
        self.fill(addr, read_buffer);
        Ok(())
    }
}

/// Mock I2C target.
///
/// Replays scripted controller requests and records what was sent back.
#[derive(Debug, Default)]
pub struct MockI2cTarget {
    requests: VecDeque<(TargetRequest, Vec<u8>)>,
    responses: Vec<Vec<u8>>,
}

impl MockI2cTarget {
    /// Create with no scripted requests
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a controller write of `data`
    pub fn push_write(&mut self, data: &[u8]) {
        self.requests
            .push_back((TargetRequest::Write(data.len()), data.to_vec()));
    }

    /// Script a controller read
    pub fn push_read(&mut self) {
        self.requests.push_back((TargetRequest::Read, Vec::new()));
    }

    /// Script a controller write of `data` followed by a repeated-START read
    pub fn push_write_read(&mut self, data: &[u8]) {
        self.requests
            .push_back((TargetRequest::WriteRead(data.len()), data.to_vec()));
    }

    /// Bytes sent back for each answered read, in order
    pub fn responses(&self) -> &[Vec<u8>] {
        &self.responses
    }

    /// True once every scripted request has been consumed
    pub fn is_drained(&self) -> bool {
        self.requests.is_empty()
    }
}

impl I2cTarget for MockI2cTarget {
    async fn listen(&mut self, buffer: &mut [u8]) -> Result<TargetRequest> {
        let (request, data) = self
            .requests
            .pop_front()
            .ok_or(PlatformError::I2c(I2cError::Timeout))?;
        if data.len() > buffer.len() {
            return Err(PlatformError::I2c(I2cError::Overrun));
        }
        buffer[..data.len()].copy_from_slice(&data);
        Ok(request)
    }

    async fn respond_to_read(&mut self, data: &[u8]) -> Result<()> {
        self.responses.push(data.to_vec());
        Ok(())
    }
}
