//! Configuration structures for the UE radio link
//!
//! This module provides the configuration consumed by the UE's RLS engine:
//! the cell search space, the local bind address, the simulated position and
//! the heartbeat timing policy. Configuration is fixed at construction time.

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::transport::MAX_UDP_PAYLOAD;
use crate::types::Vector3;

/// Default UDP port of the radio link on the cell side
pub const DEFAULT_RLS_PORT: u16 = 4997;

fn default_loop_period_ms() -> u64 {
    1000
}

fn default_receive_timeout_ms() -> u64 {
    200
}

fn default_heartbeat_threshold_ms() -> u64 {
    2000
}

fn default_max_datagram_size() -> usize {
    16384
}

/// Errors that can occur during configuration validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    /// No gNB configured
    #[error("No gNB configured: at least one address must be specified in gnb_search_list")]
    NoGnbConfigured,

    /// Invalid gNB address
    #[error("Invalid gNB address: {0}")]
    InvalidGnbAddress(String),

    /// Staleness threshold does not leave room for one loop period plus a receive timeout
    #[error("heartbeat_threshold_ms ({threshold}) must be greater than loop_period_ms + receive_timeout_ms ({floor})")]
    ThresholdTooSmall {
        /// Configured threshold
        threshold: u64,
        /// Loop period plus receive timeout
        floor: u64,
    },

    /// Receive timeout would starve the periodic heartbeat
    #[error("receive_timeout_ms ({timeout}) must be smaller than loop_period_ms ({period})")]
    TimeoutNotBelowPeriod {
        /// Configured receive timeout
        timeout: u64,
        /// Configured loop period
        period: u64,
    },

    /// Zero-sized receive buffer
    #[error("max_datagram_size must be nonzero")]
    ZeroDatagramSize,

    /// Receive cap larger than any UDP payload
    #[error("max_datagram_size ({size}) exceeds the largest UDP payload ({max})")]
    DatagramSizeTooLarge {
        /// Configured cap
        size: usize,
        /// Largest UDP payload
        max: usize,
    },
}

/// UE radio link configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkConfig {
    /// Cell addresses to probe, as `ip` or `ip:port`
    pub gnb_search_list: Vec<String>,
    /// Local address for the RLS socket
    #[serde(default)]
    pub bind_address: Option<SocketAddr>,
    /// Initial simulated position of the UE
    #[serde(default)]
    pub sim_pos: Vector3,
    /// Heartbeat cycle period
    #[serde(default = "default_loop_period_ms")]
    pub loop_period_ms: u64,
    /// Upper bound on a single receive call
    #[serde(default = "default_receive_timeout_ms")]
    pub receive_timeout_ms: u64,
    /// Maximum gap since the last heartbeat acknowledgment before a cell is lost
    #[serde(default = "default_heartbeat_threshold_ms")]
    pub heartbeat_threshold_ms: u64,
    /// Receive buffer cap; larger datagrams are rejected
    #[serde(default = "default_max_datagram_size")]
    pub max_datagram_size: usize,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            gnb_search_list: Vec::new(),
            bind_address: None,
            sim_pos: Vector3::default(),
            loop_period_ms: default_loop_period_ms(),
            receive_timeout_ms: default_receive_timeout_ms(),
            heartbeat_threshold_ms: default_heartbeat_threshold_ms(),
            max_datagram_size: default_max_datagram_size(),
        }
    }
}

impl LinkConfig {
    /// Creates a configuration with default timings for the given search list.
    pub fn with_search_list<I, S>(search_list: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            gnb_search_list: search_list.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Heartbeat cycle period.
    pub fn loop_period(&self) -> Duration {
        Duration::from_millis(self.loop_period_ms)
    }

    /// Receive timeout.
    pub fn receive_timeout(&self) -> Duration {
        Duration::from_millis(self.receive_timeout_ms)
    }

    /// Resolves the search list into socket addresses, in configuration order.
    ///
    /// Entries without a port use [`DEFAULT_RLS_PORT`].
    pub fn search_space(&self) -> Result<Vec<SocketAddr>, ConfigValidationError> {
        self.gnb_search_list.iter().map(|s| parse_gnb_address(s)).collect()
    }

    /// Local bind address, defaulting to an ephemeral port on all interfaces.
    pub fn bind_address(&self) -> SocketAddr {
        self.bind_address
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 0)))
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.gnb_search_list.is_empty() {
            return Err(ConfigValidationError::NoGnbConfigured);
        }
        self.search_space()?;

        if self.receive_timeout_ms >= self.loop_period_ms {
            return Err(ConfigValidationError::TimeoutNotBelowPeriod {
                timeout: self.receive_timeout_ms,
                period: self.loop_period_ms,
            });
        }

        let floor = self.loop_period_ms.saturating_add(self.receive_timeout_ms);
        if self.heartbeat_threshold_ms <= floor {
            return Err(ConfigValidationError::ThresholdTooSmall {
                threshold: self.heartbeat_threshold_ms,
                floor,
            });
        }

        if self.max_datagram_size == 0 {
            return Err(ConfigValidationError::ZeroDatagramSize);
        }
        if self.max_datagram_size > MAX_UDP_PAYLOAD {
            return Err(ConfigValidationError::DatagramSizeTooLarge {
                size: self.max_datagram_size,
                max: MAX_UDP_PAYLOAD,
            });
        }

        Ok(())
    }
}

fn parse_gnb_address(s: &str) -> Result<SocketAddr, ConfigValidationError> {
    let s = s.trim();
    if let Ok(addr) = s.parse::<SocketAddr>() {
        return Ok(addr);
    }
    s.parse::<IpAddr>()
        .map(|ip| SocketAddr::new(ip, DEFAULT_RLS_PORT))
        .map_err(|_| ConfigValidationError::InvalidGnbAddress(s.to_string()))
}
