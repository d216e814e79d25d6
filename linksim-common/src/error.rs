//! Error types for linksim

use thiserror::Error;

/// Errors raised by the shared transport layer.
#[derive(Debug, Error)]
pub enum Error {
    /// Network I/O errors.
    #[error("Network error: {0}")]
    Network(#[from] std::io::Error),

    /// A received datagram did not fit in the receive buffer.
    #[error("Datagram exceeds maximum size of {max} bytes")]
    DatagramTooLarge {
        /// Configured receive cap
        max: usize,
    },
}
