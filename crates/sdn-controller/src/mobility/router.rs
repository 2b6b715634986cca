//! MobilityRouter implementation.

use crate::host::HostLocationTable;
use crate::stats::ControllerStats;
use crate::topology::TopologyStore;
use sdn_fabric::{FabricControl, FlowMatch, FlowRule, DEFAULT_FLOW_PRIORITY};
use sdn_types::{MacAddress, PortNo, SwitchId};
use std::sync::Arc;
use tracing::{debug, warn};

/// Router settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouterConfig {
    /// Priority given to every installed rule
    pub flow_priority: u16,
    /// Also install the last rule on the destination's switch toward the
    /// host's own port
    pub install_edge_rule: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            flow_priority: DEFAULT_FLOW_PRIORITY,
            install_edge_rule: false,
        }
    }
}

/// What [`MobilityRouter::route`] did for one packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOutcome {
    /// Destination host has not been seen yet
    DestinationUnknown,
    /// Destination switch is unreachable from the arrival switch
    NoPath,
    /// Rules were requested; `skipped` hops had no known egress port
    Installed { rules: usize, skipped: usize },
}

impl RouteOutcome {
    pub fn rules_installed(&self) -> usize {
        match self {
            RouteOutcome::Installed { rules, .. } => *rules,
            _ => 0,
        }
    }
}

/// Learns host locations and installs the path toward each destination.
pub struct MobilityRouter {
    config: RouterConfig,
    topology: Arc<TopologyStore>,
    hosts: Arc<HostLocationTable>,
    fabric: Arc<dyn FabricControl>,
    stats: Arc<ControllerStats>,
}

impl MobilityRouter {
    pub fn new(
        config: RouterConfig,
        topology: Arc<TopologyStore>,
        hosts: Arc<HostLocationTable>,
        fabric: Arc<dyn FabricControl>,
        stats: Arc<ControllerStats>,
    ) -> Self {
        Self {
            config,
            topology,
            hosts,
            fabric,
            stats,
        }
    }

    /// Handles a packet from `src` to `dst` that arrived on `(switch, port)`.
    ///
    /// The source location is learned unless the source is a group address,
    /// which cannot be a host. Rules are then requested for
    /// every hop of the shortest path from the arrival switch to the
    /// destination's last known switch. Each hop is requested on its own; a
    /// hop whose egress port is unknown is skipped and the rest still go out.
    pub fn route(
        &self,
        src: MacAddress,
        dst: MacAddress,
        switch: SwitchId,
        port: PortNo,
    ) -> RouteOutcome {
        if src.is_multicast() {
            debug!(%src, %switch, "group source address, location not learned");
        } else {
            self.hosts.learn(src, switch, port);
        }

        let Some(target) = self.hosts.locate(&dst) else {
            debug!(%src, %dst, "destination location unknown, no rules");
            return RouteOutcome::DestinationUnknown;
        };

        let Some(plan) = self.topology.plan_route(switch, target.switch) else {
            debug!(%src, %dst, from = %switch, to = %target.switch, "no path, no rules");
            return RouteOutcome::NoPath;
        };

        let flow_match = FlowMatch::new(src, dst);
        let mut rules = 0;
        let mut skipped = 0;

        for hop in &plan.hops {
            match hop.egress_port {
                Some(egress) => {
                    self.install(FlowRule::new(hop.switch, flow_match, egress));
                    rules += 1;
                }
                None => {
                    warn!(
                        switch = %hop.switch,
                        next = %hop.next,
                        "egress port toward next hop unknown, skipping hop"
                    );
                    skipped += 1;
                }
            }
        }

        if self.config.install_edge_rule {
            self.install(FlowRule::new(target.switch, flow_match, target.port));
            rules += 1;
        }

        ControllerStats::add(&self.stats.hops_skipped, skipped as u64);
        debug!(
            %src,
            %dst,
            hops = plan.hop_count(),
            rules,
            skipped,
            "path installed"
        );
        RouteOutcome::Installed { rules, skipped }
    }

    fn install(&self, rule: FlowRule) {
        let rule = rule.with_priority(self.config.flow_priority);
        self.fabric.install_rule(&rule);
        ControllerStats::incr(&self.stats.rules_installed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::HostLocation;
    use pretty_assertions::assert_eq;
    use sdn_fabric::RecordingFabric;

    fn mac(last: u8) -> MacAddress {
        MacAddress::new([0x02, 0, 0, 0, 0, last])
    }

    fn sw(id: u64) -> SwitchId {
        SwitchId::new(id)
    }

    struct Fixture {
        topology: Arc<TopologyStore>,
        hosts: Arc<HostLocationTable>,
        fabric: Arc<RecordingFabric>,
        stats: Arc<ControllerStats>,
        router: MobilityRouter,
    }

    fn fixture(config: RouterConfig) -> Fixture {
        let topology = Arc::new(TopologyStore::new());
        let hosts = Arc::new(HostLocationTable::new());
        let fabric = Arc::new(RecordingFabric::new());
        let stats = Arc::new(ControllerStats::new());
        let router = MobilityRouter::new(
            config,
            Arc::clone(&topology),
            Arc::clone(&hosts),
            fabric.clone(),
            Arc::clone(&stats),
        );
        Fixture {
            topology,
            hosts,
            fabric,
            stats,
            router,
        }
    }

    /// S1 -1-> S2 -2-> S3
    fn three_switch_line(f: &Fixture) {
        f.topology.add_link(sw(1), sw(2), PortNo::new(1));
        f.topology.add_link(sw(2), sw(3), PortNo::new(2));
    }

    #[test]
    fn test_learns_source_even_without_destination() {
        let f = fixture(RouterConfig::default());
        let outcome = f.router.route(mac(1), mac(2), sw(1), PortNo::new(5));

        assert_eq!(outcome, RouteOutcome::DestinationUnknown);
        assert_eq!(
            f.hosts.locate(&mac(1)),
            Some(HostLocation::new(sw(1), PortNo::new(5)))
        );
        assert!(f.fabric.calls().is_empty());
    }

    #[test]
    fn test_group_source_is_not_learned() {
        let f = fixture(RouterConfig::default());
        let group = MacAddress::new([0x01, 0x00, 0x5e, 0, 0, 1]);

        f.router.route(group, mac(2), sw(1), PortNo::new(5));
        f.router.route(MacAddress::BROADCAST, mac(2), sw(1), PortNo::new(6));

        assert_eq!(f.hosts.locate(&group), None);
        assert_eq!(f.hosts.locate(&MacAddress::BROADCAST), None);
        assert!(f.hosts.is_empty());
    }

    #[test]
    fn test_installs_rule_per_hop() {
        let f = fixture(RouterConfig::default());
        three_switch_line(&f);
        f.hosts.learn(mac(2), sw(3), PortNo::new(7));

        let outcome = f.router.route(mac(1), mac(2), sw(1), PortNo::new(5));

        assert_eq!(outcome, RouteOutcome::Installed { rules: 2, skipped: 0 });
        let flow = FlowMatch::new(mac(1), mac(2));
        assert_eq!(
            f.fabric.installed_rules(),
            vec![
                FlowRule::new(sw(1), flow, PortNo::new(1)),
                FlowRule::new(sw(2), flow, PortNo::new(2)),
            ]
        );
        assert_eq!(f.stats.snapshot().rules_installed, 2);
    }

    #[test]
    fn test_no_path_installs_nothing() {
        let f = fixture(RouterConfig::default());
        f.topology.add_switch(sw(1));
        f.topology.add_switch(sw(9));
        f.hosts.learn(mac(2), sw(9), PortNo::new(1));

        assert_eq!(
            f.router.route(mac(1), mac(2), sw(1), PortNo::new(5)),
            RouteOutcome::NoPath
        );
        assert!(f.fabric.installed_rules().is_empty());
    }

    #[test]
    fn test_destination_on_arrival_switch() {
        let f = fixture(RouterConfig::default());
        f.topology.add_switch(sw(1));
        f.hosts.learn(mac(2), sw(1), PortNo::new(3));

        let outcome = f.router.route(mac(1), mac(2), sw(1), PortNo::new(5));
        assert_eq!(outcome, RouteOutcome::Installed { rules: 0, skipped: 0 });
    }

    #[test]
    fn test_edge_rule_and_priority() {
        let f = fixture(RouterConfig {
            flow_priority: 100,
            install_edge_rule: true,
        });
        three_switch_line(&f);
        f.hosts.learn(mac(2), sw(3), PortNo::new(7));

        let outcome = f.router.route(mac(1), mac(2), sw(1), PortNo::new(5));
        assert_eq!(outcome.rules_installed(), 3);

        let edge = f.fabric.rules_on(sw(3));
        assert_eq!(
            edge,
            vec![FlowRule::new(sw(3), FlowMatch::new(mac(1), mac(2)), PortNo::new(7)).with_priority(100)]
        );
        assert!(f.fabric.installed_rules().iter().all(|r| r.priority == 100));
    }

    #[test]
    fn test_unknown_egress_skips_hop_only() {
        let f = fixture(RouterConfig::default());
        three_switch_line(&f);
        // Reverse path: S3 -> S2 -> S1 with only the forward ports known,
        // then teach S2 its port toward S1.
        f.topology.add_link(sw(2), sw(1), PortNo::new(9));
        f.hosts.learn(mac(1), sw(1), PortNo::new(5));

        let outcome = f.router.route(mac(2), mac(1), sw(3), PortNo::new(7));

        assert_eq!(outcome, RouteOutcome::Installed { rules: 1, skipped: 1 });
        assert_eq!(
            f.fabric.installed_rules(),
            vec![FlowRule::new(sw(2), FlowMatch::new(mac(2), mac(1)), PortNo::new(9))]
        );
        assert_eq!(f.stats.snapshot().hops_skipped, 1);
    }

    #[test]
    fn test_follows_host_that_moved() {
        let f = fixture(RouterConfig::default());
        three_switch_line(&f);
        f.hosts.learn(mac(2), sw(3), PortNo::new(7));
        f.router.route(mac(1), mac(2), sw(1), PortNo::new(5));
        f.fabric.clear();

        // h2 shows up behind S2
        f.hosts.learn(mac(2), sw(2), PortNo::new(4));
        f.router.route(mac(1), mac(2), sw(1), PortNo::new(5));

        assert_eq!(
            f.fabric.installed_rules(),
            vec![FlowRule::new(sw(1), FlowMatch::new(mac(1), mac(2)), PortNo::new(1))]
        );
    }
}
