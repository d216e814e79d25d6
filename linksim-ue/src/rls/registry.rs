//! Cell registry
//!
//! Keyed store of every cell that ever acknowledged a heartbeat and has not
//! gone stale since. Each record is indexed twice: by the cell's STI and by
//! the locally assigned cell id. Both indices are only touched by the methods
//! in this module so they cannot drift apart.

use std::collections::HashMap;
use std::net::SocketAddr;

use thiserror::Error;

/// Registry invariant violations. These are fatal to the RLS task.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RegistryError {
    /// Every positive `i32` cell id has been issued
    #[error("cell id space exhausted after {last} allocations")]
    CellIdExhausted {
        /// Last id issued
        last: i32,
    },
}

/// State tracked for one responding cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellInfo {
    /// STI of the cell, immutable for the record's lifetime
    pub sti: u64,
    /// Last address an acknowledgment came from
    pub address: SocketAddr,
    /// Time of the last accepted acknowledgment, in clock milliseconds
    pub last_seen: u64,
    /// Last reported signal level in dBm
    pub dbm: i32,
    /// Locally assigned cell id
    pub cell_id: i32,
}

/// Result of recording a heartbeat acknowledgment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AckOutcome {
    /// Cell id of the acknowledging cell
    pub cell_id: i32,
    /// The acknowledgment created the record
    pub is_new: bool,
    /// Signal level differs from the previous one, or the cell is new
    pub signal_changed: bool,
}

/// Cell registry with STI and cell id indices kept in lock-step
#[derive(Debug, Default)]
pub struct CellRegistry {
    cells: HashMap<u64, CellInfo>,
    cell_id_to_sti: HashMap<i32, u64>,
    cell_id_counter: i32,
}

impl CellRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an accepted heartbeat acknowledgment.
    ///
    /// Unknown STIs get the next cell id. Ids increase strictly over the
    /// registry's lifetime and are never reused, so a cell that comes back
    /// after eviction is a new cell.
    pub fn upsert_on_heartbeat_ack(
        &mut self,
        sti: u64,
        address: SocketAddr,
        dbm: i32,
        now: u64,
    ) -> Result<AckOutcome, RegistryError> {
        if let Some(cell) = self.cells.get_mut(&sti) {
            let signal_changed = cell.dbm != dbm;
            cell.address = address;
            cell.last_seen = now;
            cell.dbm = dbm;
            return Ok(AckOutcome {
                cell_id: cell.cell_id,
                is_new: false,
                signal_changed,
            });
        }

        let cell_id = self.allocate_cell_id()?;
        self.cells.insert(
            sti,
            CellInfo {
                sti,
                address,
                last_seen: now,
                dbm,
                cell_id,
            },
        );
        self.cell_id_to_sti.insert(cell_id, sti);

        Ok(AckOutcome {
            cell_id,
            is_new: true,
            signal_changed: true,
        })
    }

    fn allocate_cell_id(&mut self) -> Result<i32, RegistryError> {
        let next = self
            .cell_id_counter
            .checked_add(1)
            .ok_or(RegistryError::CellIdExhausted {
                last: self.cell_id_counter,
            })?;
        self.cell_id_counter = next;
        Ok(next)
    }

    /// Looks up a cell by STI
    pub fn get(&self, sti: u64) -> Option<&CellInfo> {
        self.cells.get(&sti)
    }

    /// Looks up a cell by cell id
    pub fn get_by_cell_id(&self, cell_id: i32) -> Option<&CellInfo> {
        self.cell_id_to_sti
            .get(&cell_id)
            .and_then(|sti| self.cells.get(sti))
    }

    /// Cell id assigned to an STI
    pub fn cell_id_by_sti(&self, sti: u64) -> Option<i32> {
        self.cells.get(&sti).map(|cell| cell.cell_id)
    }

    /// STI behind a cell id
    pub fn sti_by_cell_id(&self, cell_id: i32) -> Option<u64> {
        self.cell_id_to_sti.get(&cell_id).copied()
    }

    /// Removes every cell with `now - last_seen > threshold_ms`.
    ///
    /// Returns the removed `(sti, cell_id)` pairs ordered by cell id. Both
    /// indices are fully updated before this returns; notifying anyone about
    /// the removals is left to the caller.
    pub fn evict_stale(&mut self, now: u64, threshold_ms: u64) -> Vec<(u64, i32)> {
        let mut stale: Vec<(u64, i32)> = self
            .cells
            .values()
            .filter(|cell| now.saturating_sub(cell.last_seen) > threshold_ms)
            .map(|cell| (cell.sti, cell.cell_id))
            .collect();
        stale.sort_by_key(|&(_, cell_id)| cell_id);

        for (sti, cell_id) in &stale {
            self.cells.remove(sti);
            self.cell_id_to_sti.remove(cell_id);
        }

        stale
    }

    /// Snapshot of all cells ordered by cell id
    pub fn snapshot(&self) -> Vec<CellInfo> {
        let mut cells: Vec<CellInfo> = self.cells.values().cloned().collect();
        cells.sort_by_key(|cell| cell.cell_id);
        cells
    }

    /// Number of registered cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// True if no cell is registered
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Last cell id issued, 0 if none
    pub fn last_cell_id(&self) -> i32 {
        self.cell_id_counter
    }

    #[cfg(test)]
    pub(crate) fn with_counter(counter: i32) -> Self {
        Self {
            cell_id_counter: counter,
            ..Self::default()
        }
    }
}
