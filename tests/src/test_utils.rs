//! Test utility functions for integration tests
//!
//! Provides common utilities for test setup, logging, and control-plane
//! assertions.

use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

use linksim_common::LinkConfig;
use linksim_ue::CtlMessage;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::{sleep, timeout};
use tracing_subscriber::{fmt, EnvFilter};

/// Result type for integration tests
pub type TestResult<T = ()> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Default timeout for test operations
pub const DEFAULT_TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Default poll interval for condition checks
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Initialize logging for tests
///
/// Uses RUST_LOG environment variable if set, otherwise defaults to "info"
pub fn init_test_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// Link configuration probing the given cells from a loopback socket.
pub fn loopback_config(cells: &[SocketAddr]) -> LinkConfig {
    LinkConfig {
        gnb_search_list: cells.iter().map(ToString::to_string).collect(),
        bind_address: Some(SocketAddr::from(([127, 0, 0, 1], 0))),
        ..Default::default()
    }
}

/// Wait for a condition to become true with timeout
pub async fn wait_for_condition<F, Fut>(
    mut condition: F,
    timeout_duration: Duration,
    poll_interval: Duration,
) -> TestResult
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let result = timeout(timeout_duration, async {
        loop {
            if condition().await {
                return;
            }
            sleep(poll_interval).await;
        }
    })
    .await;

    match result {
        Ok(()) => Ok(()),
        Err(_) => Err("Condition not met within timeout".into()),
    }
}

/// Next control-plane item, failing if none arrives in time.
pub async fn expect_ctl(rx: &mut UnboundedReceiver<CtlMessage>) -> TestResult<CtlMessage> {
    match timeout(DEFAULT_TEST_TIMEOUT, rx.recv()).await {
        Ok(Some(msg)) => Ok(msg),
        Ok(None) => Err("control plane channel closed".into()),
        Err(_) => Err("no control plane item within timeout".into()),
    }
}

/// Fails if an item is already queued for the control plane.
pub fn expect_no_ctl(rx: &mut UnboundedReceiver<CtlMessage>) -> TestResult {
    match rx.try_recv() {
        Ok(msg) => Err(format!("unexpected control plane item: {msg:?}").into()),
        Err(_) => Ok(()),
    }
}
