//! SDN controller entry point.
//!
//! Loads the configuration, wires the decision core to a logging fabric and
//! replays a newline-delimited JSON event stream through it.

use clap::Parser;
use sdn_controller::source;
use sdn_controller::{
    ControlPlaneDispatcher, ControllerConfig, ControllerDaemon, ControllerDaemonConfig,
    DispatcherConfig, DEFAULT_CONFIG_PATH,
};
use sdn_fabric::LoggingFabric;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// SDN controller decision core
#[derive(Parser, Debug)]
#[command(name = "sdn-controller")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the YAML configuration file
    #[arg(short = 'c', long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(short = 'l', long, default_value = "info")]
    log_level: String,

    /// Newline-delimited JSON event file, or - for standard input
    #[arg(short = 'e', long, default_value = "-")]
    events: PathBuf,

    /// Capacity of the event queue between the source and the daemon
    #[arg(long, default_value = "1024")]
    queue_depth: usize,
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .compact()
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(&args.log_level);

    info!(version = env!("CARGO_PKG_VERSION"), "starting sdn-controller");

    let config = match ControllerConfig::load_or_default(&args.config) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "failed to load configuration");
            return ExitCode::FAILURE;
        }
    };
    let settings = &config.controller;
    info!(
        required_votes_percentage = settings.required_votes_percentage,
        consensus_enabled = settings.consensus_enabled,
        install_edge_rule = settings.install_edge_rule,
        "configuration loaded"
    );

    let reader = match source::open(&args.events).await {
        Ok(reader) => reader,
        Err(e) => {
            error!(error = %e, events = %args.events.display(), "failed to open event source");
            return ExitCode::FAILURE;
        }
    };

    let fabric = Arc::new(LoggingFabric::new(config.gateway()));
    let dispatcher = Arc::new(ControlPlaneDispatcher::new(
        DispatcherConfig::from(&config),
        fabric.clone(),
    ));

    let (tx, rx) = mpsc::channel(args.queue_depth.max(1));
    let cancel = CancellationToken::new();
    let daemon = ControllerDaemon::new(
        ControllerDaemonConfig::from(&config),
        dispatcher,
        rx,
        cancel.clone(),
    );

    let signal_token = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("received SIGINT, shutting down");
                signal_token.cancel();
            }
            Err(e) => warn!(error = %e, "unable to listen for shutdown signal"),
        }
    });

    let feeder = tokio::spawn(source::feed_json_lines(reader, tx));
    let report = daemon.run().await;

    let mut code = ExitCode::SUCCESS;
    if cancel.is_cancelled() {
        feeder.abort();
    } else {
        match feeder.await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => {
                error!(error = %e, "event source failed");
                code = ExitCode::FAILURE;
            }
            Err(e) => {
                error!(error = %e, "event source task panicked");
                code = ExitCode::FAILURE;
            }
        }
    }

    match serde_json::to_string(&report.stats) {
        Ok(stats) => info!(
            events = report.events_handled,
            fabric_requests = fabric.request_count(),
            %stats,
            "sdn-controller stopped"
        ),
        Err(e) => warn!(error = %e, "failed to serialize statistics"),
    }
    code
}
