//! Outbound datagram trait

use crate::platform::Result;

/// IPv4 host and port
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    /// IPv4 address
    pub ip: [u8; 4],
    /// UDP port
    pub port: u16,
}

impl Endpoint {
    /// Create an endpoint
    pub const fn new(ip: [u8; 4], port: u16) -> Self {
        Self { ip, port }
    }
}

/// Fire-and-forget datagram sender.
///
/// One call sends one datagram. No acknowledgement, no retry.
#[allow(async_fn_in_trait)]
pub trait DatagramSink {
    /// Send `payload` to `endpoint`
    async fn send_to(&mut self, payload: &[u8], endpoint: Endpoint) -> Result<()>;
}
