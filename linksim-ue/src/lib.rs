//! UE-side radio link engine
//!
//! Maintains liveness of the simulated radio link between a UE and the cells
//! it can reach:
//! - [`rls`]: heartbeat scheduling, cell registry and inbound routing
//! - [`tasks`]: task envelope, commands and control-plane items
//! - [`app`]: configuration loading for the binary

pub mod app;
pub mod rls;
pub mod tasks;

pub use rls::{ControlBridge, RlsSharedContext, RlsUdpTask};
pub use tasks::{CtlMessage, RlsCommand, Task, TaskHandle, TaskMessage, SIGNAL_LOST_DBM};
