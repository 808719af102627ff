//! UDP datagram sink on the embassy-net stack

use crate::platform::{
    error::{NetworkError, PlatformError},
    traits::{DatagramSink, Endpoint},
    Result,
};
use crate::log_error;
use embassy_net::udp::{PacketMetadata, SendError, UdpSocket};
use embassy_net::{IpAddress, IpEndpoint, Stack};

/// Bound UDP socket used as a [`DatagramSink`].
///
/// Buffers are owned by the caller (typically `static` cells in the board
/// binary) so nothing is allocated per datagram.
pub struct UdpSink<'d> {
    socket: UdpSocket<'d>,
}

impl<'d> UdpSink<'d> {
    /// Create a socket on `stack` and bind it to `local_port`
    pub fn bind(
        stack: Stack<'d>,
        local_port: u16,
        rx_meta: &'d mut [PacketMetadata],
        rx_buffer: &'d mut [u8],
        tx_meta: &'d mut [PacketMetadata],
        tx_buffer: &'d mut [u8],
    ) -> Result<Self> {
        let mut socket = UdpSocket::new(stack, rx_meta, rx_buffer, tx_meta, tx_buffer);
        socket.bind(local_port).map_err(|_| {
            log_error!("UDP bind to port {} failed", local_port);
            PlatformError::Network(NetworkError::BindFailed)
        })?;
        Ok(Self { socket })
    }
}

impl<'d> DatagramSink for UdpSink<'d> {
    async fn send_to(&mut self, payload: &[u8], endpoint: Endpoint) -> Result<()> {
        let [a, b, c, d] = endpoint.ip;
        let remote = IpEndpoint::new(IpAddress::v4(a, b, c, d), endpoint.port);
        self.socket
            .send_to(payload, remote)
            .await
            .map_err(|e| match e {
                SendError::NoRoute => PlatformError::Network(NetworkError::NoRoute),
                SendError::PacketTooLarge => PlatformError::Network(NetworkError::PacketTooLarge),
                _ => PlatformError::Network(NetworkError::SendFailed),
            })
    }
}
