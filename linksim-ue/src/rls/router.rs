//! Inbound routing
//!
//! Every received datagram is decoded and classified. Heartbeat
//! acknowledgments register or refresh a cell; anything else is forwarded to
//! the control plane only if its sender has registered through an
//! acknowledgment first.

use std::net::SocketAddr;
use std::time::Instant;

use tracing::{debug, info, warn};

use linksim_common::logging::{log_rls_message, Direction};
use linksim_rls::{codec, RlsHeartbeatAck, RlsMessage as RlsProtocolMessage};

use super::registry::RegistryError;
use super::task::{RlsTaskError, RlsUdpTask};
use crate::tasks::CtlMessage;

impl RlsUdpTask {
    /// Waits up to the receive timeout for one datagram and routes it.
    pub(super) async fn receive_once(&mut self) -> Result<(), RlsTaskError> {
        let Some(transport) = &self.transport else {
            return Ok(());
        };

        let started = Instant::now();
        let received = transport
            .recv_timeout(self.config.max_datagram_size, self.receive_timeout())
            .await;
        self.route_received(received, started).await
    }

    pub(super) async fn route_received(
        &mut self,
        received: Result<Option<(Vec<u8>, SocketAddr)>, linksim_common::Error>,
        started: Instant,
    ) -> Result<(), RlsTaskError> {
        match received {
            Ok(Some((data, source))) => Ok(self.handle_datagram(&data, source)?),
            Ok(None) => Ok(()),
            Err(e @ linksim_common::Error::DatagramTooLarge { .. }) => {
                warn!("Dropping RLS datagram: {}", e);
                Ok(())
            }
            Err(e) => {
                debug!("RLS receive failed: {}", e);
                // Every tick spends at least one receive timeout
                let remaining = self.receive_timeout().saturating_sub(started.elapsed());
                tokio::time::sleep(remaining).await;
                Ok(())
            }
        }
    }

    /// Decodes and routes one datagram.
    pub(super) fn handle_datagram(
        &mut self,
        data: &[u8],
        source: SocketAddr,
    ) -> Result<(), RegistryError> {
        let msg = match codec::decode(data) {
            Ok(msg) => msg,
            Err(e) => {
                warn!("Unable to decode RLS message from {}: {}", source, e);
                return Ok(());
            }
        };
        log_rls_message(Direction::Rx, msg.message_type().name(), data);

        match msg {
            RlsProtocolMessage::HeartbeatAck(ack) => self.handle_heartbeat_ack(source, &ack),
            other => {
                self.forward_to_control(source, other);
                Ok(())
            }
        }
    }

    fn handle_heartbeat_ack(
        &mut self,
        source: SocketAddr,
        ack: &RlsHeartbeatAck,
    ) -> Result<(), RegistryError> {
        let now = self.clock.now_millis();
        let outcome = self
            .registry
            .upsert_on_heartbeat_ack(ack.sti, source, ack.dbm, now)?;

        if outcome.is_new {
            info!(
                "Cell discovered: cell_id={}, sti={:#018x}, address={}, dbm={}",
                outcome.cell_id, ack.sti, source, ack.dbm
            );
        }
        if outcome.signal_changed {
            self.on_signal_change_or_lost(outcome.cell_id);
        }
        Ok(())
    }

    fn forward_to_control(&self, source: SocketAddr, msg: RlsProtocolMessage) {
        // Senders must register through a heartbeat acknowledgment first
        let Some(cell_id) = self.registry.cell_id_by_sti(msg.sti()) else {
            debug!(
                "Ignoring {} from unregistered sti={:#018x} at {}",
                msg.message_type().name(),
                msg.sti(),
                source
            );
            return;
        };
        self.emit(CtlMessage::ReceiveRlsMessage { cell_id, msg });
    }
}
