//! Network transport utilities
//!
//! Async UDP wrapper used by the radio link. Sends are fire-and-forget and
//! receives are bounded in time so the owning loop stays responsive.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::UdpSocket;

use crate::Error;

/// Default receive buffer cap in bytes
pub const DEFAULT_MAX_DATAGRAM_SIZE: usize = 16384;

/// Largest payload an IPv4 UDP datagram can carry
pub const MAX_UDP_PAYLOAD: usize = 65507;

/// Async UDP socket wrapper for the RLS protocol.
///
/// # Example
///
/// ```ignore
/// use std::net::SocketAddr;
/// use std::time::Duration;
/// use linksim_common::UdpTransport;
///
/// async fn example() -> Result<(), linksim_common::Error> {
///     let transport = UdpTransport::bind("127.0.0.1:0".parse().unwrap()).await?;
///     transport.send_to(b"hello", "127.0.0.1:4997".parse().unwrap()).await?;
///     if let Some((data, src)) = transport.recv_timeout(16384, Duration::from_millis(200)).await? {
///         println!("{} bytes from {}", data.len(), src);
///     }
///     Ok(())
/// }
/// ```
pub struct UdpTransport {
    socket: UdpSocket,
}

impl UdpTransport {
    /// Binds a UDP socket to the specified address.
    ///
    /// Use port 0 for automatic port assignment.
    ///
    /// # Errors
    ///
    /// Returns an error if the socket cannot be bound to the specified address.
    pub async fn bind(addr: SocketAddr) -> Result<Self, Error> {
        let socket = UdpSocket::bind(addr).await?;
        Ok(Self { socket })
    }

    /// Sends data to the specified destination address.
    ///
    /// # Errors
    ///
    /// Returns an error if the send operation fails.
    pub async fn send_to(&self, data: &[u8], addr: SocketAddr) -> Result<(), Error> {
        self.socket.send_to(data, addr).await?;
        Ok(())
    }

    /// Receives one datagram, waiting at most `timeout`.
    ///
    /// Returns `Ok(None)` when the timeout elapses without a datagram. The
    /// buffer is one byte larger than `max_bytes` so an oversized datagram is
    /// detected and rejected instead of being silently truncated.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DatagramTooLarge`] for datagrams longer than
    /// `max_bytes`, or [`Error::Network`] on socket failure. Caps above
    /// [`MAX_UDP_PAYLOAD`] are clamped to it.
    pub async fn recv_timeout(
        &self,
        max_bytes: usize,
        timeout: Duration,
    ) -> Result<Option<(Vec<u8>, SocketAddr)>, Error> {
        // No UDP datagram is larger than this
        let max_bytes = max_bytes.min(MAX_UDP_PAYLOAD);
        let mut buf = vec![0u8; max_bytes + 1];
        let (len, addr) = match tokio::time::timeout(timeout, self.socket.recv_from(&mut buf)).await {
            Ok(result) => result?,
            Err(_) => return Ok(None),
        };
        if len > max_bytes {
            return Err(Error::DatagramTooLarge { max: max_bytes });
        }
        buf.truncate(len);
        Ok(Some((buf, addr)))
    }

    /// Returns the local address this socket is bound to.
    ///
    /// # Errors
    ///
    /// Returns an error if the local address cannot be retrieved.
    pub fn local_addr(&self) -> Result<SocketAddr, Error> {
        Ok(self.socket.local_addr()?)
    }
}
