//! Topology types.

use sdn_types::{PortNo, SwitchId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A fabric switch and the egress ports seen on it so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Switch {
    pub id: SwitchId,
    pub ports: BTreeSet<PortNo>,
}

impl Switch {
    pub fn new(id: SwitchId) -> Self {
        Self {
            id,
            ports: BTreeSet::new(),
        }
    }
}

/// One discovered direction of an inter-switch link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Link {
    pub src: SwitchId,
    pub dst: SwitchId,
    /// Port on `src` that leads to `dst`.
    pub egress_port: PortNo,
}

/// Why a switch reported a port change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortStatusReason {
    Add,
    Delete,
    Modify,
}

impl fmt::Display for PortStatusReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortStatusReason::Add => write!(f, "ADD"),
            PortStatusReason::Delete => write!(f, "DELETE"),
            PortStatusReason::Modify => write!(f, "MODIFY"),
        }
    }
}

/// One step of a planned route: leave `switch` through `egress_port` to
/// reach `next`.
///
/// `egress_port` is `None` when only the opposite direction of the link has
/// been discovered, so the port on this side is not known yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathHop {
    pub switch: SwitchId,
    pub next: SwitchId,
    pub egress_port: Option<PortNo>,
}

/// A shortest path together with the egress port of every hop, taken from a
/// single consistent view of the graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePlan {
    pub path: Vec<SwitchId>,
    pub hops: Vec<PathHop>,
}

impl RoutePlan {
    /// Number of links traversed.
    pub fn hop_count(&self) -> usize {
        self.hops.len()
    }
}
