//! Flow rules and packet handles.

use sdn_types::{MacAddress, PortNo, SwitchId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Priority used for path rules unless configured otherwise.
pub const DEFAULT_FLOW_PRIORITY: u16 = 1;

/// Match on the Ethernet source and destination of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlowMatch {
    pub eth_src: MacAddress,
    pub eth_dst: MacAddress,
}

impl FlowMatch {
    pub fn new(eth_src: MacAddress, eth_dst: MacAddress) -> Self {
        Self { eth_src, eth_dst }
    }
}

impl fmt::Display for FlowMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "eth_src={},eth_dst={}", self.eth_src, self.eth_dst)
    }
}

/// A forwarding rule to be installed on one switch.
///
/// The rule applies a single output action: frames matching [`FlowMatch`] are
/// sent out of `egress_port`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlowRule {
    pub switch: SwitchId,
    pub flow_match: FlowMatch,
    pub egress_port: PortNo,
    pub priority: u16,
}

impl FlowRule {
    /// Creates a rule with [`DEFAULT_FLOW_PRIORITY`].
    pub fn new(switch: SwitchId, flow_match: FlowMatch, egress_port: PortNo) -> Self {
        Self {
            switch,
            flow_match,
            egress_port,
            priority: DEFAULT_FLOW_PRIORITY,
        }
    }

    pub fn with_priority(mut self, priority: u16) -> Self {
        self.priority = priority;
        self
    }
}

impl fmt::Display for FlowRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "switch={} priority={} match=[{}] output={}",
            self.switch, self.priority, self.flow_match, self.egress_port
        )
    }
}

/// Opaque reference to a packet the fabric delivered to the controller.
///
/// The fabric needs either its own buffer id or the raw frame to re-submit
/// the packet, plus the port it originally arrived on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacketHandle {
    #[serde(default)]
    pub buffer_id: Option<u32>,
    pub in_port: PortNo,
    #[serde(default)]
    pub data: Vec<u8>,
}

impl PacketHandle {
    pub fn new(in_port: PortNo, data: Vec<u8>) -> Self {
        Self {
            buffer_id: None,
            in_port,
            data,
        }
    }

    pub fn with_buffer_id(mut self, buffer_id: u32) -> Self {
        self.buffer_id = Some(buffer_id);
        self
    }

    /// Returns true if the fabric kept the packet in a switch buffer.
    pub fn is_buffered(&self) -> bool {
        self.buffer_id.is_some()
    }
}
