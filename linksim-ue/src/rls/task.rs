//! RLS UDP Task Implementation for UE
//!
//! The task owns the UDP socket, the cell registry and the heartbeat
//! scheduling state. It runs as a single cooperative loop: every
//! [`RlsUdpTask::on_tick`] runs the heartbeat cycle when a loop period has
//! elapsed, then waits for at most one datagram for the receive timeout.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc::{self, error::TryRecvError};
use tracing::{debug, error, info, warn};

use linksim_common::logging::{log_rls_message, Direction};
use linksim_common::{ConfigValidationError, LinkConfig, UdpTransport};
use linksim_rls::{codec, RlsMessage as RlsProtocolMessage};

use super::bridge::ControlBridge;
use super::clock::{Clock, MonotonicClock};
use super::context::RlsSharedContext;
use super::position::PositionSource;
use super::registry::{CellInfo, CellRegistry, RegistryError};
use crate::tasks::{CtlMessage, RlsCommand, Task, TaskMessage};

/// Errors surfaced by the RLS task
#[derive(Debug, Error)]
pub enum RlsTaskError {
    /// Configuration rejected at construction
    #[error("invalid RLS configuration: {0}")]
    Config(#[from] ConfigValidationError),

    /// Socket could not be bound
    #[error("RLS transport error: {0}")]
    Transport(#[from] linksim_common::Error),

    /// Registry invariant violated; the task cannot continue
    #[error("RLS registry failure: {0}")]
    Registry(#[from] RegistryError),
}

/// RLS UDP task for the UE side of the radio link
pub struct RlsUdpTask {
    pub(super) config: LinkConfig,
    pub(super) search_space: Vec<SocketAddr>,
    pub(super) shared: Arc<RlsSharedContext>,
    pub(super) transport: Option<UdpTransport>,
    pub(super) registry: CellRegistry,
    pub(super) control: Option<ControlBridge>,
    pub(super) position: Box<dyn PositionSource>,
    pub(super) clock: Arc<dyn Clock>,
    /// Clock time of the last heartbeat cycle
    pub(super) last_cycle: Option<u64>,
}

impl RlsUdpTask {
    /// Creates a task from a validated configuration.
    ///
    /// The socket is not bound until [`bind`](Self::bind) or [`Task::run`].
    pub fn new(
        config: LinkConfig,
        shared: Arc<RlsSharedContext>,
        position: Box<dyn PositionSource>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, RlsTaskError> {
        config.validate()?;
        let search_space = config.search_space()?;

        Ok(Self {
            config,
            search_space,
            shared,
            transport: None,
            registry: CellRegistry::new(),
            control: None,
            position,
            clock,
            last_cycle: None,
        })
    }

    /// Creates a task with a random STI, the configured fixed position and a
    /// monotonic clock.
    pub fn from_link_config(config: LinkConfig) -> Result<Self, RlsTaskError> {
        let position = Box::new(config.sim_pos);
        Self::new(
            config,
            Arc::new(RlsSharedContext::random()),
            position,
            Arc::new(MonotonicClock::new()),
        )
    }

    /// Binds the UDP socket and returns the local address.
    pub async fn bind(&mut self) -> Result<SocketAddr, RlsTaskError> {
        let transport = UdpTransport::bind(self.config.bind_address()).await?;
        let local = transport.local_addr()?;
        info!("RLS task bound to {}", local);
        self.transport = Some(transport);
        Ok(local)
    }

    /// Connects the task to the control plane.
    ///
    /// Items emitted before this call are logged and dropped.
    pub fn initialize(&mut self, control: ControlBridge) {
        self.control = Some(control);
    }

    /// Shared context (STI) of this task
    pub fn shared_context(&self) -> Arc<RlsSharedContext> {
        Arc::clone(&self.shared)
    }

    /// Local socket address, if bound
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.transport.as_ref().and_then(|t| t.local_addr().ok())
    }

    /// Number of registered cells
    pub fn cell_count(&self) -> usize {
        self.registry.len()
    }

    /// Snapshot of registered cells ordered by cell id
    pub fn cell_status(&self) -> Vec<CellInfo> {
        self.registry.snapshot()
    }

    /// Read access to the cell registry
    pub fn registry(&self) -> &CellRegistry {
        &self.registry
    }

    /// One iteration of the RLS loop.
    ///
    /// Runs the heartbeat cycle if a full loop period has elapsed since the
    /// last one (the first call always runs it), then handles at most one
    /// received datagram. Only registry invariant violations are returned as
    /// errors; everything else is logged and absorbed.
    pub async fn on_tick(&mut self) -> Result<(), RlsTaskError> {
        let now = self.clock.now_millis();
        if self.cycle_due(now) {
            self.last_cycle = Some(now);
            let sim_pos = self.position.current();
            self.heartbeat_cycle(now, sim_pos).await;
        }
        self.receive_once().await
    }

    fn cycle_due(&self, now: u64) -> bool {
        match self.last_cycle {
            None => true,
            Some(last) => now.saturating_sub(last) > self.config.loop_period_ms,
        }
    }

    /// Sends a message to a registered cell.
    ///
    /// Does nothing if the cell id is not currently registered.
    pub async fn send_to_cell_id(&self, cell_id: i32, msg: &RlsProtocolMessage) {
        match self.registry.get_by_cell_id(cell_id) {
            Some(cell) => self.send_rls_pdu(cell.address, msg).await,
            None => debug!(cell_id, "Dropping message for unknown cell"),
        }
    }

    /// Releases the UDP socket. Safe to call repeatedly.
    pub fn shutdown(&mut self) {
        if self.transport.take().is_some() {
            info!(
                "RLS task stopped with {} registered cells",
                self.registry.len()
            );
        }
    }

    /// True once the socket has been released or before it is bound
    pub fn is_shut_down(&self) -> bool {
        self.transport.is_none()
    }

    pub(super) async fn send_rls_pdu(&self, dest: SocketAddr, msg: &RlsProtocolMessage) {
        let Some(transport) = &self.transport else {
            return;
        };
        let data = codec::encode(msg);
        log_rls_message(Direction::Tx, msg.message_type().name(), &data);
        if let Err(e) = transport.send_to(&data, dest).await {
            debug!("Failed to send RLS message to {}: {}", dest, e);
        }
    }

    pub(super) fn emit(&self, msg: CtlMessage) {
        match &self.control {
            Some(control) => {
                control.deliver(msg);
            }
            None => warn!(?msg, "Control plane not initialized, dropping item"),
        }
    }

    pub(super) fn receive_timeout(&self) -> Duration {
        self.config.receive_timeout()
    }

    async fn handle_command(&mut self, cmd: RlsCommand) {
        match cmd {
            RlsCommand::SendToCell { cell_id, msg } => self.send_to_cell_id(cell_id, &msg).await,
            RlsCommand::ResetSti => {
                self.shared.reset_sti();
            }
            RlsCommand::QueryCells { reply } => {
                let _ = reply.send(self.cell_status());
            }
        }
    }

    /// Handles every queued command; returns false when the task should stop.
    async fn drain_commands(&mut self, rx: &mut mpsc::Receiver<TaskMessage<RlsCommand>>) -> bool {
        loop {
            match rx.try_recv() {
                Ok(TaskMessage::Message(cmd)) => self.handle_command(cmd).await,
                Ok(TaskMessage::Shutdown) => {
                    info!("RLS task received shutdown signal");
                    return false;
                }
                Err(TryRecvError::Empty) => return true,
                Err(TryRecvError::Disconnected) => {
                    info!("RLS task command channel closed");
                    return false;
                }
            }
        }
    }
}

#[async_trait::async_trait]
impl Task for RlsUdpTask {
    type Message = RlsCommand;

    async fn run(&mut self, mut rx: mpsc::Receiver<TaskMessage<Self::Message>>) {
        info!("RLS task starting");
        if self.transport.is_none() {
            if let Err(e) = self.bind().await {
                error!("Failed to initialize RLS socket: {}", e);
                return;
            }
        }
        info!(
            "RLS task started with {} cells in search space, sti={:#018x}",
            self.search_space.len(),
            self.shared.sti()
        );

        while self.drain_commands(&mut rx).await {
            if let Err(e) = self.on_tick().await {
                error!("RLS task terminating: {}", e);
                break;
            }
        }

        self.shutdown();
    }
}
