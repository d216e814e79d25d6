//! UE Task Framework
//!
//! Actor-style task model with typed message channels, reduced to what the
//! radio-link engine needs: the envelope and handle used to drive the RLS
//! task, and the items it hands to the control plane.
//!
//! # Channels
//!
//! - **RLS task input**: bounded `mpsc` of [`TaskMessage<RlsCommand>`], fed
//!   through a [`TaskHandle`]
//! - **Control plane input**: unbounded `mpsc` of [`CtlMessage`], fed by the
//!   RLS task through a [`ControlBridge`](crate::rls::ControlBridge)

use tokio::sync::{mpsc, oneshot};

use linksim_rls::RlsMessage as RlsProtocolMessage;

use crate::rls::CellInfo;

/// Default capacity of task input channels
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Signal level reported for a cell whose heartbeat acknowledgments stopped.
pub const SIGNAL_LOST_DBM: i32 = i32::MIN;

// ============================================================================
// Task Message Envelope
// ============================================================================

/// Task message envelope wrapping typed messages with control signals.
#[derive(Debug)]
pub enum TaskMessage<T> {
    /// Regular message payload
    Message(T),
    /// Shutdown signal - task should terminate gracefully
    Shutdown,
}

impl<T> TaskMessage<T> {
    /// Returns true if this is a shutdown signal.
    pub fn is_shutdown(&self) -> bool {
        matches!(self, TaskMessage::Shutdown)
    }

    /// Returns the message payload if present, or None for shutdown.
    pub fn into_message(self) -> Option<T> {
        match self {
            TaskMessage::Message(msg) => Some(msg),
            TaskMessage::Shutdown => None,
        }
    }
}

// ============================================================================
// Task Trait
// ============================================================================

/// Base trait for all UE tasks.
#[async_trait::async_trait]
pub trait Task: Send + 'static {
    /// The message type this task processes.
    type Message: Send;

    /// Runs the task's main loop until shutdown or a fatal error.
    async fn run(&mut self, rx: mpsc::Receiver<TaskMessage<Self::Message>>);
}

// ============================================================================
// RLS Task Commands
// ============================================================================

/// Commands accepted by the RLS UDP task from the surrounding UE.
#[derive(Debug)]
pub enum RlsCommand {
    /// Send an RLS message to a registered cell; dropped if the cell is unknown
    SendToCell {
        /// Target cell
        cell_id: i32,
        /// Message to encode and send
        msg: RlsProtocolMessage,
    },
    /// Draw a new STI for subsequent heartbeats
    ResetSti,
    /// Snapshot of the registered cells
    QueryCells {
        /// Reply channel
        reply: oneshot::Sender<Vec<CellInfo>>,
    },
}

// ============================================================================
// Control Plane Items
// ============================================================================

/// Items delivered by the RLS task to the control plane, in emission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CtlMessage {
    /// Signal level of a cell changed; [`SIGNAL_LOST_DBM`] when the cell was lost
    SignalChanged {
        /// Cell identifier
        cell_id: i32,
        /// New signal level in dBm
        dbm: i32,
    },
    /// Protocol message received from a registered cell
    ReceiveRlsMessage {
        /// Cell identifier of the sender
        cell_id: i32,
        /// Decoded message
        msg: RlsProtocolMessage,
    },
}

impl CtlMessage {
    /// Cell this item concerns
    pub fn cell_id(&self) -> i32 {
        match self {
            CtlMessage::SignalChanged { cell_id, .. } => *cell_id,
            CtlMessage::ReceiveRlsMessage { cell_id, .. } => *cell_id,
        }
    }

    /// True for a signal-lost notification
    pub fn is_signal_lost(&self) -> bool {
        matches!(self, CtlMessage::SignalChanged { dbm, .. } if *dbm == SIGNAL_LOST_DBM)
    }
}

// ============================================================================
// Task Handle
// ============================================================================

/// Handle for sending messages to a task.
#[derive(Debug)]
pub struct TaskHandle<T> {
    tx: mpsc::Sender<TaskMessage<T>>,
}

impl<T> Clone for TaskHandle<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<T> TaskHandle<T> {
    /// Creates a handle and the matching receiver.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<TaskMessage<T>>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }

    /// Sends a message to the task.
    ///
    /// Returns an error if the task has been dropped.
    pub async fn send(&self, msg: T) -> Result<(), mpsc::error::SendError<TaskMessage<T>>> {
        self.tx.send(TaskMessage::Message(msg)).await
    }

    /// Sends a shutdown signal to the task.
    pub async fn shutdown(&self) -> Result<(), mpsc::error::SendError<TaskMessage<T>>> {
        self.tx.send(TaskMessage::Shutdown).await
    }

    /// Returns true if the task channel is closed.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
