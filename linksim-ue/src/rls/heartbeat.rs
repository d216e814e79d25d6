//! Heartbeat cycle
//!
//! Once per loop period: evict cells whose acknowledgments went stale,
//! report them lost, then probe every search-space address with a heartbeat
//! carrying the current STI and simulated position.

use tracing::info;

use linksim_rls::{RlsHeartbeat, RlsMessage as RlsProtocolMessage, Vector3};

use super::task::RlsUdpTask;
use crate::tasks::{CtlMessage, SIGNAL_LOST_DBM};

impl RlsUdpTask {
    pub(super) async fn heartbeat_cycle(&mut self, now: u64, sim_pos: Vector3) {
        let lost = self
            .registry
            .evict_stale(now, self.config.heartbeat_threshold_ms);

        // Registry is fully updated before anyone hears about the removals
        for &(sti, cell_id) in &lost {
            info!("Cell lost: cell_id={}, sti={:#018x}", cell_id, sti);
            self.on_signal_change_or_lost(cell_id);
        }

        let heartbeat =
            RlsProtocolMessage::Heartbeat(RlsHeartbeat::new(self.shared.sti(), sim_pos));
        for &addr in &self.search_space {
            self.send_rls_pdu(addr, &heartbeat).await;
        }
    }

    /// Reports the cell's current signal level, read from the registry at
    /// emission time; [`SIGNAL_LOST_DBM`] if the cell is no longer registered.
    pub(super) fn on_signal_change_or_lost(&self, cell_id: i32) {
        let dbm = self
            .registry
            .get_by_cell_id(cell_id)
            .map_or(SIGNAL_LOST_DBM, |cell| cell.dbm);
        self.emit(CtlMessage::SignalChanged { cell_id, dbm });
    }
}
