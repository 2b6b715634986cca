//! The outbound fabric-control trait.

use crate::rule::{FlowRule, PacketHandle};
use sdn_types::SwitchId;
use std::sync::Arc;

/// Outbound capabilities the controller core needs from the fabric.
///
/// All calls are fire-and-forget: the core does not wait for completion and
/// does not retry. Implementations that talk to real switches should queue
/// the request and return immediately; any retry policy belongs to them.
///
/// # Thread Safety
///
/// The core invokes these methods from whichever task handles the event, so
/// implementations must be `Send + Sync`.
pub trait FabricControl: Send + Sync {
    /// Installs `rule` on `rule.switch`.
    fn install_rule(&self, rule: &FlowRule);

    /// Re-submits a packet through the switch's normal flow table.
    fn forward_default(&self, switch: SwitchId, packet: &PacketHandle);

    /// Installs the gateway and table-miss rules a freshly joined switch needs.
    fn install_gateway_rules(&self, switch: SwitchId);
}

impl<T: FabricControl + ?Sized> FabricControl for Arc<T> {
    fn install_rule(&self, rule: &FlowRule) {
        (**self).install_rule(rule)
    }

    fn forward_default(&self, switch: SwitchId, packet: &PacketHandle) {
        (**self).forward_default(switch, packet)
    }

    fn install_gateway_rules(&self, switch: SwitchId) {
        (**self).install_gateway_rules(switch)
    }
}
