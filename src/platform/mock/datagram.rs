//! Mock datagram sink for testing

use crate::platform::{
    error::{NetworkError, PlatformError},
    traits::{DatagramSink, Endpoint},
    Result,
};
use std::vec::Vec;

/// Records sent datagrams; can be told to fail the next sends
#[derive(Debug, Default)]
pub struct MockDatagramSink {
    sent: Vec<(Endpoint, Vec<u8>)>,
    fail_next: usize,
}

impl MockDatagramSink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Datagrams sent so far
    pub fn sent(&self) -> &[(Endpoint, Vec<u8>)] {
        &self.sent
    }

    /// Forget recorded datagrams
    pub fn clear(&mut self) {
        self.sent.clear();
    }

    /// Fail the next `count` sends with `NoRoute`
    pub fn fail_next(&mut self, count: usize) {
        self.fail_next = count;
    }
}

impl DatagramSink for MockDatagramSink {
    async fn send_to(&mut self, payload: &[u8], endpoint: Endpoint) -> Result<()> {
        if self.fail_next > 0 {
            self.fail_next -= 1;
            return Err(PlatformError::Network(NetworkError::NoRoute));
        }
        self.sent.push((endpoint, payload.to_vec()));
        Ok(())
    }
}
