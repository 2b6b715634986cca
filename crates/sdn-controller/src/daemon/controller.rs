//! ControllerDaemon implementation.
//!
//! The daemon is the single consumer of the event channel. Events are
//! dispatched in arrival order on one task; a periodic timer sweeps stale
//! vote tallies and idle hosts in between.

use crate::config::ControllerConfig;
use crate::dispatcher::{ControlPlaneDispatcher, ControllerEvent};
use crate::stats::StatsSnapshot;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Configuration for the ControllerDaemon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerDaemonConfig {
    /// Period of the eviction sweep
    pub eviction_interval: Duration,
}

impl Default for ControllerDaemonConfig {
    fn default() -> Self {
        Self {
            eviction_interval: Duration::from_secs(1),
        }
    }
}

impl From<&ControllerConfig> for ControllerDaemonConfig {
    fn from(config: &ControllerConfig) -> Self {
        Self {
            eviction_interval: config.eviction_interval(),
        }
    }
}

/// Why the event loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Every sender was dropped
    SourceClosed,
    /// The cancellation token fired
    Cancelled,
}

/// Summary returned when the daemon stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DaemonReport {
    pub reason: StopReason,
    pub events_handled: u64,
    pub stats: StatsSnapshot,
}

/// The controller's main event loop.
pub struct ControllerDaemon {
    config: ControllerDaemonConfig,
    dispatcher: Arc<ControlPlaneDispatcher>,
    events: mpsc::Receiver<ControllerEvent>,
    cancel: CancellationToken,
}

impl ControllerDaemon {
    pub fn new(
        config: ControllerDaemonConfig,
        dispatcher: Arc<ControlPlaneDispatcher>,
        events: mpsc::Receiver<ControllerEvent>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            config,
            dispatcher,
            events,
            cancel,
        }
    }

    pub fn dispatcher(&self) -> &Arc<ControlPlaneDispatcher> {
        &self.dispatcher
    }

    /// Runs until the channel closes or the token is cancelled.
    pub async fn run(mut self) -> DaemonReport {
        info!(
            eviction_interval_ms = self.config.eviction_interval.as_millis() as u64,
            "controller daemon started"
        );

        let mut eviction = tokio::time::interval(self.config.eviction_interval);
        eviction.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately
        eviction.tick().await;

        let mut events_handled = 0u64;
        let reason = loop {
            tokio::select! {
                biased;

                () = self.cancel.cancelled() => {
                    info!("shutdown requested");
                    break StopReason::Cancelled;
                }

                _ = eviction.tick() => {
                    self.dispatcher.evict_expired();
                }

                event = self.events.recv() => match event {
                    Some(event) => {
                        debug!(event = event.name(), "dispatching");
                        self.dispatcher.dispatch(event);
                        events_handled += 1;
                    }
                    None => {
                        info!("event source closed");
                        break StopReason::SourceClosed;
                    }
                },
            }
        };

        let stats = self.dispatcher.stats().snapshot();
        info!(?reason, events_handled, "controller daemon stopped");
        DaemonReport {
            reason,
            events_handled,
            stats,
        }
    }
}
