//! Simulated position sources
//!
//! The RLS task reads the UE position once per heartbeat cycle. Movement
//! models live outside the engine and publish through a `watch` channel.

use tokio::sync::watch;

use linksim_rls::Vector3;

/// Source of the UE's current simulated position
pub trait PositionSource: Send + Sync {
    /// Current position
    fn current(&self) -> Vector3;
}

impl PositionSource for Vector3 {
    fn current(&self) -> Vector3 {
        *self
    }
}

impl PositionSource for watch::Receiver<Vector3> {
    fn current(&self) -> Vector3 {
        *self.borrow()
    }
}
