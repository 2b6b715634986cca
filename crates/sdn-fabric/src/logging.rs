//! A fabric implementation that only logs.
//!
//! Used by the controller binary when it is fed recorded events instead of a
//! live switch connection.

use crate::control::FabricControl;
use crate::rule::{FlowRule, PacketHandle};
use sdn_types::{MacAddress, SwitchId};
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

/// Address the fabric answers ARP requests for on behalf of the hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GatewaySettings {
    pub ip: Ipv4Addr,
    pub mac: MacAddress,
}

/// Logs every outbound request at `info` level and counts them.
#[derive(Debug)]
pub struct LoggingFabric {
    gateway: GatewaySettings,
    requests: AtomicU64,
}

impl LoggingFabric {
    pub fn new(gateway: GatewaySettings) -> Self {
        Self {
            gateway,
            requests: AtomicU64::new(0),
        }
    }

    /// Number of requests issued so far.
    pub fn request_count(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }

    fn count(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
    }
}

impl FabricControl for LoggingFabric {
    fn install_rule(&self, rule: &FlowRule) {
        self.count();
        info!(%rule, "fabric: flow-mod");
    }

    fn forward_default(&self, switch: SwitchId, packet: &PacketHandle) {
        self.count();
        info!(
            %switch,
            in_port = %packet.in_port,
            buffered = packet.is_buffered(),
            bytes = packet.data.len(),
            "fabric: packet-out to table"
        );
    }

    fn install_gateway_rules(&self, switch: SwitchId) {
        self.count();
        info!(
            %switch,
            gateway_ip = %self.gateway.ip,
            gateway_mac = %self.gateway.mac,
            "fabric: ARP trap for gateway installed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::FlowMatch;
    use sdn_types::PortNo;

    #[test]
    fn test_counts_each_request() {
        let fabric = LoggingFabric::new(GatewaySettings {
            ip: Ipv4Addr::new(10, 0, 0, 254),
            mac: MacAddress::new([0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]),
        });
        let switch = SwitchId::new(1);

        fabric.install_gateway_rules(switch);
        fabric.install_rule(&FlowRule::new(
            switch,
            FlowMatch::new(MacAddress::ZERO, MacAddress::BROADCAST),
            PortNo::new(1),
        ));
        fabric.forward_default(switch, &PacketHandle::new(PortNo::new(2), vec![]));

        assert_eq!(fabric.request_count(), 3);
    }
}
