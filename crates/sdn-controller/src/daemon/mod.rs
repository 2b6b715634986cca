//! Controller daemon - the async event loop.

mod controller;

pub use controller::{ControllerDaemon, ControllerDaemonConfig, DaemonReport, StopReason};
