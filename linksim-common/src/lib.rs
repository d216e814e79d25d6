//! Common types and utilities for linksim
//!
//! This crate provides shared types, configuration structures, logging setup
//! and the UDP transport used across all linksim crates.

pub mod config;
pub mod error;
pub mod logging;
pub mod transport;
pub mod types;

pub use config::{ConfigValidationError, LinkConfig, DEFAULT_RLS_PORT};
pub use error::Error;
pub use logging::{
    init_logging, init_logging_with_filter, log_rls_message, Direction, HexDump, LogLevel,
};
pub use transport::{UdpTransport, DEFAULT_MAX_DATAGRAM_SIZE, MAX_UDP_PAYLOAD};
pub use types::Vector3;
