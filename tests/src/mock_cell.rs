//! Mock cell for integration testing
//!
//! A cell endpoint on a loopback UDP socket. It sees the heartbeats a UE
//! sends to it and answers with acknowledgments or arbitrary RLS traffic
//! under the test's control.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use linksim_common::UdpTransport;
use linksim_rls::{codec, RlsHeartbeat, RlsHeartbeatAck, RlsMessage};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::test_utils::TestResult;

const RECV_CAP: usize = 16384;

/// Loopback cell speaking the RLS wire protocol
pub struct MockCell {
    transport: UdpTransport,
    sti: u64,
    dbm: AtomicI32,
}

impl MockCell {
    /// Binds a cell on an ephemeral loopback port.
    pub async fn bind(sti: u64, dbm: i32) -> TestResult<Self> {
        let transport = UdpTransport::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        Ok(Self {
            transport,
            sti,
            dbm: AtomicI32::new(dbm),
        })
    }

    /// Address to put in the UE's search list
    pub fn addr(&self) -> SocketAddr {
        self.transport
            .local_addr()
            .unwrap_or_else(|e| panic!("mock cell socket has no address: {e}"))
    }

    /// Signal level reported in subsequent acknowledgments
    pub fn set_dbm(&self, dbm: i32) {
        self.dbm.store(dbm, Ordering::SeqCst);
    }

    pub fn dbm(&self) -> i32 {
        self.dbm.load(Ordering::SeqCst)
    }

    /// Receives one message, or `None` if nothing arrives in time.
    pub async fn recv_message(
        &self,
        wait: Duration,
    ) -> TestResult<Option<(RlsMessage, SocketAddr)>> {
        match self.transport.recv_timeout(RECV_CAP, wait).await? {
            Some((data, source)) => Ok(Some((codec::decode(&data)?, source))),
            None => Ok(None),
        }
    }

    /// Receives the next message and requires it to be a heartbeat.
    pub async fn expect_heartbeat(&self, wait: Duration) -> TestResult<(RlsHeartbeat, SocketAddr)> {
        match self.recv_message(wait).await? {
            Some((RlsMessage::Heartbeat(hb), source)) => Ok((hb, source)),
            Some((other, _)) => Err(format!("expected heartbeat, got {other:?}").into()),
            None => Err("no heartbeat within timeout".into()),
        }
    }

    /// Sends a heartbeat acknowledgment with the current signal level.
    pub async fn send_ack(&self, ue: SocketAddr) -> TestResult {
        let ack = RlsMessage::HeartbeatAck(RlsHeartbeatAck::new(self.sti, self.dbm()));
        self.send_message(ue, &ack).await
    }

    pub async fn send_message(&self, ue: SocketAddr, msg: &RlsMessage) -> TestResult {
        self.send_raw(ue, &codec::encode(msg)).await
    }

    /// Sends bytes as-is, for malformed traffic.
    pub async fn send_raw(&self, ue: SocketAddr, data: &[u8]) -> TestResult {
        self.transport.send_to(data, ue).await?;
        Ok(())
    }

    /// Answers every heartbeat with an acknowledgment until the returned
    /// handle is aborted. Anything else received is ignored.
    pub fn spawn_responder(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                match self.recv_message(Duration::from_secs(60)).await {
                    Ok(Some((RlsMessage::Heartbeat(_), ue))) => {
                        if let Err(e) = self.send_ack(ue).await {
                            debug!("mock cell ack failed: {}", e);
                        }
                    }
                    Ok(_) => {}
                    Err(e) => debug!("mock cell receive failed: {}", e),
                }
            }
        })
    }
}
