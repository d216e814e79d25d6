//! Control bridge
//!
//! Ordered delivery of [`CtlMessage`] items from the RLS task to the control
//! plane. The channel is unbounded: delivering never blocks the RLS loop and
//! never drops an item while the consumer is alive.

use tokio::sync::mpsc;
use tracing::warn;

use crate::tasks::CtlMessage;

/// Sending half of the control-plane channel
#[derive(Debug, Clone)]
pub struct ControlBridge {
    tx: mpsc::UnboundedSender<CtlMessage>,
}

impl ControlBridge {
    /// Wraps an existing control-plane sender
    pub fn new(tx: mpsc::UnboundedSender<CtlMessage>) -> Self {
        Self { tx }
    }

    /// Creates a bridge and the control plane's receiving end
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<CtlMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Enqueues an item. Returns false if the control plane is gone.
    pub fn deliver(&self, msg: CtlMessage) -> bool {
        match self.tx.send(msg) {
            Ok(()) => true,
            Err(mpsc::error::SendError(msg)) => {
                warn!(cell_id = msg.cell_id(), "Control plane closed, item dropped");
                false
            }
        }
    }

    /// True once the receiving end is dropped
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
