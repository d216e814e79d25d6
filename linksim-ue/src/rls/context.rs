//! RLS context shared between the RLS task and the control plane

use std::sync::atomic::{AtomicU64, Ordering};

use tracing::info;

/// State shared by the RLS task and the control plane.
///
/// Holds the UE's STI, which heartbeats carry as the sender identity.
#[derive(Debug)]
pub struct RlsSharedContext {
    sti: AtomicU64,
}

impl RlsSharedContext {
    /// Creates a context with the given STI
    pub fn new(sti: u64) -> Self {
        Self {
            sti: AtomicU64::new(sti),
        }
    }

    /// Creates a context with a random STI
    pub fn random() -> Self {
        Self::new(rand::random::<u64>())
    }

    /// Current STI
    pub fn sti(&self) -> u64 {
        self.sti.load(Ordering::Relaxed)
    }

    /// Draws a new random STI and returns it
    pub fn reset_sti(&self) -> u64 {
        let mut sti = rand::random::<u64>();
        while sti == self.sti() {
            sti = rand::random::<u64>();
        }
        self.sti.store(sti, Ordering::Relaxed);
        info!("STI reset to {:#018x}", sti);
        sti
    }
}

impl Default for RlsSharedContext {
    fn default() -> Self {
        Self::random()
    }
}
