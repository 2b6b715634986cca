//! Event handlers.

use super::event::{ControllerEvent, FlowRemovedReason, PacketIn};
use crate::config::ControllerConfig;
use crate::consensus::{ConsensusGate, GateConfig, Verdict};
use crate::host::HostLocationTable;
use crate::mobility::{MobilityRouter, RouteOutcome, RouterConfig};
use crate::stats::ControllerStats;
use crate::topology::{PortStatusReason, TopologyStore};
use sdn_fabric::FabricControl;
use sdn_types::{PortNo, SwitchId};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Dispatcher settings, usually derived from [`ControllerConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatcherConfig {
    /// When false every packet is admitted without a vote
    pub consensus_enabled: bool,
    pub gate: GateConfig,
    pub router: RouterConfig,
    /// Hosts idle for this long are forgotten; `None` keeps them
    pub host_idle_timeout: Option<Duration>,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            consensus_enabled: true,
            gate: GateConfig::default(),
            router: RouterConfig::default(),
            host_idle_timeout: None,
        }
    }
}

impl From<&ControllerConfig> for DispatcherConfig {
    fn from(config: &ControllerConfig) -> Self {
        let settings = &config.controller;
        Self {
            consensus_enabled: settings.consensus_enabled,
            gate: GateConfig {
                required_votes_percentage: settings.required_votes_percentage,
                tally_ttl: config.vote_tally_ttl(),
            },
            router: RouterConfig {
                flow_priority: settings.flow_priority,
                install_edge_rule: settings.install_edge_rule,
            },
            host_idle_timeout: config.host_idle_timeout(),
        }
    }
}

/// Result of handling one packet arrival.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketOutcome {
    /// `None` while the tally is still waiting for votes
    pub verdict: Option<Verdict>,
    /// Whether the original packet was sent back to the fabric
    pub forwarded: bool,
    pub route: RouteOutcome,
}

/// What one eviction sweep removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvictionReport {
    pub tallies: usize,
    pub hosts: usize,
}

impl EvictionReport {
    pub fn is_empty(&self) -> bool {
        self.tallies == 0 && self.hosts == 0
    }
}

/// Entry point for every fabric notification.
///
/// Owns the topology, host table, gate and router, and routes each event to
/// the right one. All handlers take `&self` and may be called from several
/// tasks at once.
pub struct ControlPlaneDispatcher {
    topology: Arc<TopologyStore>,
    hosts: Arc<HostLocationTable>,
    gate: Option<ConsensusGate>,
    router: MobilityRouter,
    fabric: Arc<dyn FabricControl>,
    stats: Arc<ControllerStats>,
    host_idle_timeout: Option<Duration>,
}

impl ControlPlaneDispatcher {
    pub fn new(config: DispatcherConfig, fabric: Arc<dyn FabricControl>) -> Self {
        let topology = Arc::new(TopologyStore::new());
        let hosts = Arc::new(HostLocationTable::new());
        let stats = Arc::new(ControllerStats::new());

        let gate = config
            .consensus_enabled
            .then(|| ConsensusGate::new(config.gate, Arc::clone(&topology)));
        let router = MobilityRouter::new(
            config.router,
            Arc::clone(&topology),
            Arc::clone(&hosts),
            Arc::clone(&fabric),
            Arc::clone(&stats),
        );

        Self {
            topology,
            hosts,
            gate,
            router,
            fabric,
            stats,
            host_idle_timeout: config.host_idle_timeout,
        }
    }

    pub fn topology(&self) -> &Arc<TopologyStore> {
        &self.topology
    }

    pub fn hosts(&self) -> &Arc<HostLocationTable> {
        &self.hosts
    }

    /// The consensus gate, absent when consensus is disabled.
    pub fn gate(&self) -> Option<&ConsensusGate> {
        self.gate.as_ref()
    }

    pub fn stats(&self) -> &Arc<ControllerStats> {
        &self.stats
    }

    /// Routes one event to its handler.
    pub fn dispatch(&self, event: ControllerEvent) {
        match event {
            ControllerEvent::SwitchJoin { switch } => self.on_switch_join(switch),
            ControllerEvent::SwitchLeave { switch } => self.on_switch_leave(switch),
            ControllerEvent::LinkDiscovered { src, dst, port } => {
                self.on_link_discovered(src, dst, port)
            }
            ControllerEvent::LinkRemoved { src, dst } => self.on_link_removed(src, dst),
            ControllerEvent::PortStatus {
                switch,
                port,
                reason,
            } => self.on_port_status(switch, port, reason),
            ControllerEvent::FlowRemoved {
                switch,
                reason,
                priority,
                cookie,
                table_id,
            } => self.on_flow_removed(switch, reason, priority, cookie, table_id),
            ControllerEvent::PacketIn(packet) => {
                self.on_packet_arrival(&packet);
            }
        }
    }

    pub fn on_switch_join(&self, switch: SwitchId) {
        if self.topology.add_switch(switch) {
            info!(%switch, active = self.topology.active_switch_count(), "switch joined");
        } else {
            debug!(%switch, "switch already known, re-requesting gateway rules");
        }
        self.fabric.install_gateway_rules(switch);
    }

    pub fn on_switch_leave(&self, switch: SwitchId) {
        if self.topology.remove_switch(switch) {
            info!(%switch, active = self.topology.active_switch_count(), "switch left");
        } else {
            debug!(%switch, "leave for unknown switch ignored");
        }
    }

    pub fn on_link_discovered(&self, src: SwitchId, dst: SwitchId, port: PortNo) {
        if self.topology.add_link(src, dst, port) {
            debug!(%src, %dst, %port, "link up");
        }
    }

    pub fn on_link_removed(&self, src: SwitchId, dst: SwitchId) {
        if self.topology.remove_link(src, dst) {
            debug!(%src, %dst, "link down");
        }
    }

    pub fn on_port_status(&self, switch: SwitchId, port: PortNo, reason: PortStatusReason) {
        if self.topology.update_port(switch, port, reason) {
            debug!(%switch, %port, %reason, "port status");
        } else {
            debug!(%switch, %port, %reason, "port status for unknown switch ignored");
        }
    }

    pub fn on_flow_removed(
        &self,
        switch: SwitchId,
        reason: FlowRemovedReason,
        priority: u16,
        cookie: u64,
        table_id: u8,
    ) {
        ControllerStats::incr(&self.stats.flows_removed);
        debug!(
            %switch,
            %reason,
            priority,
            cookie = format_args!("{:#x}", cookie),
            table_id,
            "flow removed"
        );
    }

    /// Handles a packet-in: vote, learn and route, then forward on allow.
    ///
    /// Location learning and path installation run whatever the verdict;
    /// only the re-submission of the original packet is gated.
    pub fn on_packet_arrival(&self, packet: &PacketIn) -> PacketOutcome {
        ControllerStats::incr(&self.stats.packets_in);

        let verdict = match &self.gate {
            Some(gate) => gate.submit_vote(packet.identity(), packet.decoded_vote()),
            None => Some(Verdict::Allow),
        };
        match verdict {
            Some(Verdict::Allow) => ControllerStats::incr(&self.stats.verdicts_allow),
            Some(Verdict::Drop) => ControllerStats::incr(&self.stats.verdicts_drop),
            None => {}
        }

        let route = self
            .router
            .route(packet.src, packet.dst, packet.switch, packet.in_port);

        let forwarded = verdict.is_some_and(|v| v.is_allow());
        if forwarded {
            self.fabric.forward_default(packet.switch, &packet.handle());
        }

        debug!(
            switch = %packet.switch,
            src = %packet.src,
            dst = %packet.dst,
            verdict = ?verdict,
            forwarded,
            "packet in handled"
        );
        PacketOutcome {
            verdict,
            forwarded,
            route,
        }
    }

    /// Drops expired tallies and idle hosts.
    pub fn evict_expired(&self) -> EvictionReport {
        self.evict_expired_at(Instant::now())
    }

    pub fn evict_expired_at(&self, now: Instant) -> EvictionReport {
        let tallies = self
            .gate
            .as_ref()
            .map(|gate| gate.evict_expired_at(now))
            .unwrap_or(0);
        let hosts = self
            .host_idle_timeout
            .map(|max_idle| self.hosts.evict_idle(now, max_idle))
            .unwrap_or(0);

        ControllerStats::add(&self.stats.tallies_evicted, tallies as u64);
        ControllerStats::add(&self.stats.hosts_evicted, hosts as u64);

        let report = EvictionReport { tallies, hosts };
        if !report.is_empty() {
            debug!(tallies, hosts, "evicted stale state");
        }
        report
    }
}
