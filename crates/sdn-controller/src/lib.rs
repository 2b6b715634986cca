//! SDN Controller - consensus-gated admission and topology-aware routing
//!
//! The decision core of a software-defined-network controller. For every
//! data packet the fabric reports, the controller:
//!
//! - collects the reporting switches' votes and decides by majority whether
//!   the packet may proceed
//! - learns which switch port the sending host sits behind
//! - keeps a live graph of switches and links
//! - installs forwarding rules along the shortest path to the destination
//!
//! # Architecture
//!
//! ```text
//! [fabric events] ──> [ControllerDaemon] ──> [ControlPlaneDispatcher]
//!                                               │        │         │
//!                                     [TopologyStore] [ConsensusGate] [MobilityRouter]
//!                                                                      │
//!                                                        [FabricControl] ──> [switches]
//! ```
//!
//! # Key Components
//!
//! - [`topology::TopologyStore`]: switch/link graph and shortest paths
//! - [`host::HostLocationTable`]: last-seen attachment point per host
//! - [`consensus::ConsensusGate`]: per-packet vote tallies
//! - [`mobility::MobilityRouter`]: location learning and path installation
//! - [`dispatcher::ControlPlaneDispatcher`]: event entry point
//! - [`daemon::ControllerDaemon`]: async event loop with periodic eviction

pub mod config;
pub mod consensus;
pub mod daemon;
pub mod dispatcher;
pub mod error;
pub mod host;
pub mod mobility;
pub mod source;
pub mod stats;
pub mod topology;

pub use config::{ControllerConfig, ControllerSettings, DEFAULT_CONFIG_PATH};
pub use consensus::{ConsensusGate, GateConfig, PacketIdentity, Verdict, Vote};
pub use daemon::{ControllerDaemon, ControllerDaemonConfig, DaemonReport, StopReason};
pub use dispatcher::{
    ControlPlaneDispatcher, ControllerEvent, DispatcherConfig, FlowRemovedReason, PacketIn,
    PacketOutcome,
};
pub use error::{ControllerError, Result};
pub use host::{HostLocation, HostLocationTable};
pub use mobility::{MobilityRouter, RouteOutcome, RouterConfig};
pub use stats::{ControllerStats, StatsSnapshot};
pub use topology::{PortStatusReason, TopologyStore};
