//! Event dispatch.
//!
//! Turns switch lifecycle, link and packet-in notifications into calls on
//! the topology, the consensus gate and the mobility router.

mod handler;
mod event;

pub use handler::{ControlPlaneDispatcher, DispatcherConfig, EvictionReport, PacketOutcome};
pub use event::{ControllerEvent, FlowRemovedReason, PacketIn};
