//! Link Task Tests
//!
//! Runs the RLS task through its `Task::run` loop on a real clock, the way
//! the UE binary does, and drives it through its command channel.

use std::sync::Arc;
use std::time::Duration;

use integration_tests::{
    expect_ctl, init_test_logging, loopback_config, wait_for_condition, MockCell, TestResult,
    DEFAULT_POLL_INTERVAL, DEFAULT_TEST_TIMEOUT,
};
use linksim_common::LinkConfig;
use linksim_rls::{PduType, RlsMessage, RlsPduTransmission};
use linksim_ue::rls::{CellInfo, ControlBridge, RlsUdpTask};
use linksim_ue::{CtlMessage, RlsCommand, Task, TaskHandle, SIGNAL_LOST_DBM};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

fn fast_config(cell: &MockCell) -> LinkConfig {
    LinkConfig {
        loop_period_ms: 100,
        receive_timeout_ms: 20,
        heartbeat_threshold_ms: 300,
        ..loopback_config(&[cell.addr()])
    }
}

async fn query_cells(handle: &TaskHandle<RlsCommand>) -> TestResult<Vec<CellInfo>> {
    let (reply, rx) = oneshot::channel();
    handle.send(RlsCommand::QueryCells { reply }).await?;
    Ok(tokio::time::timeout(DEFAULT_TEST_TIMEOUT, rx).await??)
}

fn spawn_task(mut task: RlsUdpTask) -> (TaskHandle<RlsCommand>, JoinHandle<RlsUdpTask>) {
    let (handle, rx) = TaskHandle::channel(16);
    let join = tokio::spawn(async move {
        task.run(rx).await;
        task
    });
    (handle, join)
}

#[tokio::test]
async fn test_running_task_tracks_cell_liveness() -> TestResult {
    init_test_logging();
    let cell = Arc::new(MockCell::bind(0xC0FFEE, -75).await?);
    let responder = Arc::clone(&cell).spawn_responder();

    let mut task = RlsUdpTask::from_link_config(fast_config(&cell))?;
    let (bridge, mut ctl) = ControlBridge::channel();
    task.initialize(bridge);
    let (handle, join) = spawn_task(task);

    assert_eq!(
        expect_ctl(&mut ctl).await?,
        CtlMessage::SignalChanged { cell_id: 1, dbm: -75 }
    );
    let cells = query_cells(&handle).await?;
    assert_eq!(cells.len(), 1);
    assert_eq!(cells[0].sti, 0xC0FFEE);
    assert_eq!(cells[0].address, cell.addr());

    // Cell stops answering: lost after the staleness threshold
    responder.abort();
    let lost = expect_ctl(&mut ctl).await?;
    assert_eq!(
        lost,
        CtlMessage::SignalChanged { cell_id: 1, dbm: SIGNAL_LOST_DBM }
    );
    assert!(query_cells(&handle).await?.is_empty());

    handle.shutdown().await?;
    let task = tokio::time::timeout(DEFAULT_TEST_TIMEOUT, join).await??;
    assert!(task.is_shut_down());
    Ok(())
}

#[tokio::test]
async fn test_commands_reach_cell_and_reset_sti() -> TestResult {
    init_test_logging();
    let cell = MockCell::bind(0xBEEF, -60).await?;

    // Cell answers only once, keep it registered for the whole test
    let config = LinkConfig {
        heartbeat_threshold_ms: 60_000,
        ..fast_config(&cell)
    };
    let mut task = RlsUdpTask::from_link_config(config)?;
    let shared = task.shared_context();
    let first_sti = shared.sti();
    let (bridge, mut ctl) = ControlBridge::channel();
    task.initialize(bridge);
    let (handle, join) = spawn_task(task);

    // Register by answering the first heartbeat by hand
    let (hb, ue) = cell.expect_heartbeat(DEFAULT_TEST_TIMEOUT).await?;
    assert_eq!(hb.sti, first_sti);
    cell.send_ack(ue).await?;
    expect_ctl(&mut ctl).await?;

    let pdu = RlsMessage::PduTransmission(RlsPduTransmission::new(
        first_sti,
        PduType::Data,
        1,
        0,
        bytes::Bytes::from_static(b"uplink"),
    ));
    handle
        .send(RlsCommand::SendToCell {
            cell_id: 1,
            msg: pdu.clone(),
        })
        .await?;

    let mut delivered = false;
    while !delivered {
        match cell.recv_message(DEFAULT_TEST_TIMEOUT).await? {
            Some((msg, _)) if msg == pdu => delivered = true,
            Some((RlsMessage::Heartbeat(_), _)) => {}
            other => return Err(format!("unexpected traffic: {other:?}").into()),
        }
    }

    handle.send(RlsCommand::ResetSti).await?;
    let shared_ref = &shared;
    wait_for_condition(
        || async move { shared_ref.sti() != first_sti },
        DEFAULT_TEST_TIMEOUT,
        DEFAULT_POLL_INTERVAL,
    )
    .await?;
    let new_sti = shared.sti();

    // Heartbeats switch to the new sti
    let mut seen_new = false;
    while !seen_new {
        let (hb, _) = cell.expect_heartbeat(DEFAULT_TEST_TIMEOUT).await?;
        seen_new = hb.sti == new_sti;
    }

    handle.shutdown().await?;
    tokio::time::timeout(DEFAULT_TEST_TIMEOUT, join).await??;
    Ok(())
}

#[tokio::test]
async fn test_task_stops_when_handle_dropped() -> TestResult {
    init_test_logging();
    let cell = MockCell::bind(0x1, -50).await?;

    let task = RlsUdpTask::from_link_config(fast_config(&cell))?;
    let (handle, join) = spawn_task(task);
    drop(handle);

    let task = tokio::time::timeout(DEFAULT_TEST_TIMEOUT, join).await??;
    assert!(task.is_shut_down());
    Ok(())
}

#[test]
fn test_invalid_timing_rejected() {
    let config = LinkConfig {
        loop_period_ms: 1000,
        receive_timeout_ms: 200,
        heartbeat_threshold_ms: 1200,
        ..LinkConfig::with_search_list(["127.0.0.1"])
    };
    assert!(RlsUdpTask::from_link_config(config).is_err());
}
