//! Integration test framework for linksim
#![allow(missing_docs)]
//!
//! Loopback test harness for the UE radio link: a scriptable mock cell that
//! speaks the RLS wire protocol over real UDP sockets, plus helpers for
//! building test configurations and observing the control plane.
//!
//! # Components
//!
//! - [`mock_cell`] - Mock cell that answers heartbeats and injects traffic
//! - [`test_utils`] - Logging, timeouts and control-plane assertions
//!
//! # Test Categories
//!
//! 1. **Heartbeat scenarios** - cell discovery, signal changes and loss driven
//!    by a manual clock
//! 2. **Link task** - the full task loop with commands and a live clock

pub mod mock_cell;
pub mod test_utils;

pub use mock_cell::MockCell;
pub use test_utils::{
    expect_ctl, expect_no_ctl, init_test_logging, loopback_config, wait_for_condition,
    TestResult, DEFAULT_POLL_INTERVAL, DEFAULT_TEST_TIMEOUT,
};
