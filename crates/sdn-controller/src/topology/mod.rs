//! Topology - the live switch/link graph.
//!
//! Switches are nodes, discovered links are edges annotated with the egress
//! port to use. Answers hop-count shortest path queries and provides the
//! active switch count used as the consensus electorate.

mod store;
mod types;

pub use store::TopologyStore;
pub use types::{Link, PathHop, PortStatusReason, RoutePlan, Switch};
