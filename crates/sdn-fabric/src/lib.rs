//! Fabric-control boundary for the SDN controller.
//!
//! The controller core never talks to switches directly. Everything it wants
//! the fabric to do goes through the [`FabricControl`] trait, which a protocol
//! layer implements on top of its own wire encoding.
//!
//! - [`rule`]: protocol-neutral flow rules and packet handles
//! - [`control`]: the [`FabricControl`] trait
//! - [`logging`]: a fabric that only logs, for running without switches
//! - [`recording`]: a fabric that records every call, for tests
//!
//! # Example
//!
//! ```
//! use sdn_fabric::{FabricControl, FlowMatch, FlowRule, RecordingFabric};
//! use sdn_types::{MacAddress, PortNo, SwitchId};
//!
//! let fabric = RecordingFabric::new();
//! let rule = FlowRule::new(
//!     SwitchId::new(1),
//!     FlowMatch::new(MacAddress::new([0, 0, 0, 0, 0, 1]), MacAddress::new([0, 0, 0, 0, 0, 2])),
//!     PortNo::new(3),
//! );
//! fabric.install_rule(&rule);
//! assert_eq!(fabric.installed_rules(), vec![rule]);
//! ```

pub mod control;
pub mod logging;
pub mod recording;
pub mod rule;

pub use control::FabricControl;
pub use logging::{GatewaySettings, LoggingFabric};
pub use recording::{FabricCall, RecordingFabric};
pub use rule::{FlowMatch, FlowRule, PacketHandle, DEFAULT_FLOW_PRIORITY};
