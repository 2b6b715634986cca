//! TopologyStore implementation.
//!
//! The graph is undirected for reachability, but the egress port is recorded
//! per direction: a link discovered as `src -> dst` tells us which port on
//! `src` leads to `dst` and nothing about the port on `dst`. The opposite
//! direction's port stays unknown until that direction is discovered too.

use super::types::{Link, PathHop, PortStatusReason, RoutePlan, Switch};
use parking_lot::RwLock;
use sdn_types::{PortNo, SwitchId};
use std::collections::{BTreeMap, HashMap, VecDeque};
use tracing::debug;

#[derive(Debug, Default)]
struct Graph {
    switches: HashMap<SwitchId, Switch>,
    /// `adjacency[a][b]` is the port on `a` toward `b`, if known.
    adjacency: HashMap<SwitchId, BTreeMap<SwitchId, Option<PortNo>>>,
}

impl Graph {
    /// Returns true if the switch was created.
    fn ensure_switch(&mut self, id: SwitchId) -> bool {
        if self.switches.contains_key(&id) {
            return false;
        }
        self.switches.insert(id, Switch::new(id));
        true
    }

    fn unlink(&mut self, a: SwitchId, b: SwitchId) -> bool {
        let forward = self
            .adjacency
            .get_mut(&a)
            .and_then(|adj| adj.remove(&b))
            .is_some();
        let reverse = self
            .adjacency
            .get_mut(&b)
            .and_then(|adj| adj.remove(&a))
            .is_some();
        forward || reverse
    }

    fn egress_port(&self, a: SwitchId, b: SwitchId) -> Option<PortNo> {
        self.adjacency.get(&a)?.get(&b).copied().flatten()
    }

    /// Breadth-first search by hop count.
    fn shortest_path(&self, src: SwitchId, dst: SwitchId) -> Option<Vec<SwitchId>> {
        if !self.switches.contains_key(&src) || !self.switches.contains_key(&dst) {
            return None;
        }
        if src == dst {
            return Some(vec![src]);
        }

        let mut parent: HashMap<SwitchId, SwitchId> = HashMap::new();
        let mut queue = VecDeque::from([src]);

        while let Some(current) = queue.pop_front() {
            let Some(neighbors) = self.adjacency.get(&current) else {
                continue;
            };
            for &next in neighbors.keys() {
                if next == src || parent.contains_key(&next) {
                    continue;
                }
                parent.insert(next, current);
                if next == dst {
                    let mut path = vec![dst];
                    let mut cursor = dst;
                    while let Some(&prev) = parent.get(&cursor) {
                        path.push(prev);
                        cursor = prev;
                    }
                    path.reverse();
                    return Some(path);
                }
                queue.push_back(next);
            }
        }

        None
    }
}

/// Owner of the switch/link graph.
///
/// Readers (path queries, quorum size) share the lock; mutations take it
/// exclusively, so a traversal never observes a half-applied change.
#[derive(Debug, Default)]
pub struct TopologyStore {
    graph: RwLock<Graph>,
}

impl TopologyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a switch. Returns false if it was already known.
    pub fn add_switch(&self, id: SwitchId) -> bool {
        self.graph.write().ensure_switch(id)
    }

    /// Removes a switch and every link touching it.
    ///
    /// Unknown switches are ignored; duplicate or late leave notifications
    /// are normal. Returns true if the switch was present.
    pub fn remove_switch(&self, id: SwitchId) -> bool {
        let mut graph = self.graph.write();
        if graph.switches.remove(&id).is_none() {
            return false;
        }
        if let Some(neighbors) = graph.adjacency.remove(&id) {
            for neighbor in neighbors.keys() {
                if let Some(adj) = graph.adjacency.get_mut(neighbor) {
                    adj.remove(&id);
                }
            }
        }
        true
    }

    /// Inserts or replaces the link `src <-> dst`, recording `egress_port` as
    /// the port on `src` toward `dst`.
    ///
    /// Endpoints that are not known yet are created as bare switches, so a
    /// link notification that overtakes its switch-join is not lost.
    /// Self-links carry no forwarding information and are ignored.
    ///
    /// Returns true if the graph changed.
    pub fn add_link(&self, src: SwitchId, dst: SwitchId, egress_port: PortNo) -> bool {
        if src == dst {
            debug!(switch = %src, port = %egress_port, "ignoring self-link");
            return false;
        }

        let mut graph = self.graph.write();
        for id in [src, dst] {
            if graph.ensure_switch(id) {
                debug!(switch = %id, "link endpoint not seen before, created");
            }
        }
        if let Some(switch) = graph.switches.get_mut(&src) {
            switch.ports.insert(egress_port);
        }

        graph.adjacency.entry(dst).or_default().entry(src).or_insert(None);
        let previous = graph
            .adjacency
            .entry(src)
            .or_default()
            .insert(dst, Some(egress_port));
        previous != Some(Some(egress_port))
    }

    /// Removes both directions of the link between `a` and `b`.
    pub fn remove_link(&self, a: SwitchId, b: SwitchId) -> bool {
        self.graph.write().unlink(a, b)
    }

    /// Applies a port status change reported by `switch`.
    ///
    /// A deleted port also takes down every link that egresses through it.
    /// Returns false if the switch is unknown.
    pub fn update_port(&self, switch: SwitchId, port: PortNo, reason: PortStatusReason) -> bool {
        let mut graph = self.graph.write();
        let Some(entry) = graph.switches.get_mut(&switch) else {
            return false;
        };

        match reason {
            PortStatusReason::Add | PortStatusReason::Modify => {
                entry.ports.insert(port);
            }
            PortStatusReason::Delete => {
                entry.ports.remove(&port);
                let stale: Vec<SwitchId> = graph
                    .adjacency
                    .get(&switch)
                    .map(|adj| {
                        adj.iter()
                            .filter(|(_, egress)| **egress == Some(port))
                            .map(|(neighbor, _)| *neighbor)
                            .collect()
                    })
                    .unwrap_or_default();
                for neighbor in stale {
                    graph.unlink(switch, neighbor);
                    debug!(%switch, %port, %neighbor, "link dropped with its port");
                }
            }
        }
        true
    }

    /// Shortest path by hop count, both endpoints included.
    ///
    /// Returns `None` if either switch is unknown or no path exists. Among
    /// equally short paths the choice is unspecified.
    pub fn shortest_path(&self, src: SwitchId, dst: SwitchId) -> Option<Vec<SwitchId>> {
        self.graph.read().shortest_path(src, dst)
    }

    /// Shortest path plus the egress port of every hop, read under one lock
    /// so the ports always belong to the path that was found.
    pub fn plan_route(&self, src: SwitchId, dst: SwitchId) -> Option<RoutePlan> {
        let graph = self.graph.read();
        let path = graph.shortest_path(src, dst)?;
        let hops = path
            .windows(2)
            .map(|pair| PathHop {
                switch: pair[0],
                next: pair[1],
                egress_port: graph.egress_port(pair[0], pair[1]),
            })
            .collect();
        Some(RoutePlan { path, hops })
    }

    /// Port on `from` that leads to `to`, if that direction is known.
    pub fn egress_port(&self, from: SwitchId, to: SwitchId) -> Option<PortNo> {
        self.graph.read().egress_port(from, to)
    }

    pub fn active_switch_count(&self) -> usize {
        self.graph.read().switches.len()
    }

    pub fn contains_switch(&self, id: SwitchId) -> bool {
        self.graph.read().switches.contains_key(&id)
    }

    /// Known switches in ascending id order.
    pub fn switches(&self) -> Vec<SwitchId> {
        let mut ids: Vec<SwitchId> = self.graph.read().switches.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Known egress ports of a switch.
    pub fn ports(&self, id: SwitchId) -> Option<Vec<PortNo>> {
        self.graph
            .read()
            .switches
            .get(&id)
            .map(|switch| switch.ports.iter().copied().collect())
    }

    /// Every direction whose egress port is known, sorted by (src, dst).
    pub fn links(&self) -> Vec<Link> {
        let graph = self.graph.read();
        let mut links: Vec<Link> = graph
            .adjacency
            .iter()
            .flat_map(|(&src, adj)| {
                adj.iter().filter_map(move |(&dst, egress)| {
                    egress.map(|egress_port| Link {
                        src,
                        dst,
                        egress_port,
                    })
                })
            })
            .collect();
        links.sort_unstable_by_key(|link| (link.src, link.dst));
        links
    }
}
