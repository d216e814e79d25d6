//! linksim UE radio link
//!
//! Runs the UE side of the simulated radio link: probes the configured cells
//! with heartbeats, tracks which of them are reachable, and logs every item
//! the link hands to the control plane.
//!
//! # Usage
//!
//! ```bash
//! linksim-ue -c config/ue-link.yaml
//! linksim-ue -c config/ue-link.yaml --log-level debug
//! ```

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use linksim_common::{init_logging, LogLevel};
use linksim_ue::app::load_link_config;
use linksim_ue::tasks::DEFAULT_CHANNEL_CAPACITY;
use linksim_ue::{
    ControlBridge, CtlMessage, RlsCommand, RlsUdpTask, Task, TaskHandle, SIGNAL_LOST_DBM,
};

/// linksim UE - radio link liveness engine
#[derive(Parser, Debug)]
#[command(name = "linksim-ue")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the link configuration file (YAML)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    config_file: String,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long = "log-level", value_name = "LEVEL", default_value_t = LogLevel::Info)]
    log_level: LogLevel,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.log_level);

    match run(args).await {
        Ok(()) => {
            info!("UE link exited successfully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("UE link failed: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<()> {
    info!("Loading configuration from: {}", args.config_file);
    let config = load_link_config(&args.config_file)
        .with_context(|| format!("loading {}", args.config_file))?;
    info!("gNB search list: {:?}", config.gnb_search_list);

    let mut task = RlsUdpTask::from_link_config(config).context("creating RLS task")?;
    task.bind().await.context("binding RLS socket")?;

    let (bridge, ctl_rx) = ControlBridge::channel();
    task.initialize(bridge);
    let consumer = tokio::spawn(log_control_plane(ctl_rx));

    let (handle, rx) = TaskHandle::<RlsCommand>::channel(DEFAULT_CHANNEL_CAPACITY);
    let mut rls = tokio::spawn(async move { task.run(rx).await });

    info!("UE link running, press Ctrl-C to stop");
    let interrupted = tokio::select! {
        result = signal::ctrl_c() => {
            result.context("waiting for Ctrl-C")?;
            true
        }
        joined = &mut rls => {
            joined.context("joining RLS task")?;
            false
        }
    };

    if interrupted {
        info!("Received Ctrl-C, shutting down");
        if handle.shutdown().await.is_err() {
            warn!("RLS task already stopped");
        }
        rls.await.context("joining RLS task")?;
    } else {
        warn!("RLS task stopped on its own");
    }

    // The RLS task owned the last bridge; the consumer drains and exits
    consumer.await.context("joining control-plane consumer")?;
    Ok(())
}

/// Stand-in control plane: logs each item in arrival order.
async fn log_control_plane(mut rx: mpsc::UnboundedReceiver<CtlMessage>) {
    while let Some(msg) = rx.recv().await {
        match msg {
            CtlMessage::SignalChanged { cell_id, dbm } if dbm == SIGNAL_LOST_DBM => {
                info!("Cell {} signal lost", cell_id);
            }
            CtlMessage::SignalChanged { cell_id, dbm } => {
                info!("Cell {} signal changed: {} dBm", cell_id, dbm);
            }
            CtlMessage::ReceiveRlsMessage { cell_id, msg } => {
                info!(
                    "Cell {} delivered {} (sti={:#018x})",
                    cell_id,
                    msg.message_type().name(),
                    msg.sti()
                );
            }
        }
    }
}
