//! Inbound controller events.
//!
//! Serialized as internally tagged JSON objects, one per line when replayed
//! from a file:
//!
//! ```json
//! {"event":"switch_join","switch":1}
//! {"event":"link_discovered","src":1,"dst":2,"port":1}
//! {"event":"packet_in","src":"02:00:00:00:00:01","dst":"02:00:00:00:00:02","switch":1,"in_port":5,"vote":1}
//! ```

use crate::consensus::{PacketIdentity, Vote};
use crate::topology::PortStatusReason;
use sdn_fabric::PacketHandle;
use sdn_types::{MacAddress, PortNo, SwitchId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A data packet the fabric sent to the controller, with the reporting
/// switch's vote on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacketIn {
    /// Protocol transaction id, when the protocol layer supplies one
    #[serde(default)]
    pub transaction_id: Option<u64>,
    pub src: MacAddress,
    pub dst: MacAddress,
    pub switch: SwitchId,
    pub in_port: PortNo,
    /// Raw vote field: 1 allow, 2 drop, anything else abstains
    #[serde(default)]
    pub vote: i64,
    #[serde(default)]
    pub buffer_id: Option<u32>,
    #[serde(default)]
    pub payload: Vec<u8>,
}

impl PacketIn {
    pub fn new(src: MacAddress, dst: MacAddress, switch: SwitchId, in_port: PortNo) -> Self {
        Self {
            transaction_id: None,
            src,
            dst,
            switch,
            in_port,
            vote: 0,
            buffer_id: None,
            payload: Vec::new(),
        }
    }

    pub fn with_transaction_id(mut self, xid: u64) -> Self {
        self.transaction_id = Some(xid);
        self
    }

    pub fn with_vote(mut self, vote: i64) -> Self {
        self.vote = vote;
        self
    }

    pub fn with_payload(mut self, payload: Vec<u8>) -> Self {
        self.payload = payload;
        self
    }

    /// Transaction id if present, otherwise a hash of the frame addresses
    /// and payload.
    pub fn identity(&self) -> PacketIdentity {
        match self.transaction_id {
            Some(xid) => PacketIdentity::from_transaction_id(xid),
            None => PacketIdentity::from_frame(self.src, self.dst, &self.payload),
        }
    }

    pub fn decoded_vote(&self) -> Vote {
        Vote::from_code(self.vote)
    }

    /// Handle the fabric needs to re-submit this packet.
    pub fn handle(&self) -> PacketHandle {
        let handle = PacketHandle::new(self.in_port, self.payload.clone());
        match self.buffer_id {
            Some(buffer_id) => handle.with_buffer_id(buffer_id),
            None => handle,
        }
    }
}

/// Why a switch removed a flow entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowRemovedReason {
    IdleTimeout,
    HardTimeout,
    Delete,
    GroupDelete,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for FlowRemovedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FlowRemovedReason::IdleTimeout => "IDLE TIMEOUT",
            FlowRemovedReason::HardTimeout => "HARD TIMEOUT",
            FlowRemovedReason::Delete => "DELETE",
            FlowRemovedReason::GroupDelete => "GROUP DELETE",
            FlowRemovedReason::Unknown => "unknown",
        };
        write!(f, "{}", name)
    }
}

/// Everything the controller reacts to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ControllerEvent {
    SwitchJoin {
        switch: SwitchId,
    },
    SwitchLeave {
        switch: SwitchId,
    },
    LinkDiscovered {
        src: SwitchId,
        dst: SwitchId,
        port: PortNo,
    },
    LinkRemoved {
        src: SwitchId,
        dst: SwitchId,
    },
    PortStatus {
        switch: SwitchId,
        port: PortNo,
        reason: PortStatusReason,
    },
    FlowRemoved {
        switch: SwitchId,
        reason: FlowRemovedReason,
        #[serde(default)]
        priority: u16,
        #[serde(default)]
        cookie: u64,
        #[serde(default)]
        table_id: u8,
    },
    PacketIn(PacketIn),
}

impl ControllerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ControllerEvent::SwitchJoin { .. } => "switch_join",
            ControllerEvent::SwitchLeave { .. } => "switch_leave",
            ControllerEvent::LinkDiscovered { .. } => "link_discovered",
            ControllerEvent::LinkRemoved { .. } => "link_removed",
            ControllerEvent::PortStatus { .. } => "port_status",
            ControllerEvent::FlowRemoved { .. } => "flow_removed",
            ControllerEvent::PacketIn(_) => "packet_in",
        }
    }
}
