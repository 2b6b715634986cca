//! A fabric implementation that records every call.
//!
//! This stands in for a real switch connection in tests: the controller is
//! driven with events and the test then inspects what the fabric was asked
//! to do.

use crate::control::FabricControl;
use crate::rule::{FlowRule, PacketHandle};
use parking_lot::Mutex;
use sdn_types::SwitchId;

/// One outbound request, in the order it was issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FabricCall {
    InstallRule(FlowRule),
    ForwardDefault {
        switch: SwitchId,
        packet: PacketHandle,
    },
    InstallGatewayRules(SwitchId),
}

#[derive(Debug, Default)]
pub struct RecordingFabric {
    calls: Mutex<Vec<FabricCall>>,
}

impl RecordingFabric {
    pub fn new() -> Self {
        Self::default()
    }

    /// All calls so far, oldest first.
    pub fn calls(&self) -> Vec<FabricCall> {
        self.calls.lock().clone()
    }

    pub fn installed_rules(&self) -> Vec<FlowRule> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                FabricCall::InstallRule(rule) => Some(rule.clone()),
                _ => None,
            })
            .collect()
    }

    /// Rules installed on a single switch, oldest first.
    pub fn rules_on(&self, switch: SwitchId) -> Vec<FlowRule> {
        self.installed_rules()
            .into_iter()
            .filter(|rule| rule.switch == switch)
            .collect()
    }

    pub fn forwarded(&self) -> Vec<(SwitchId, PacketHandle)> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                FabricCall::ForwardDefault { switch, packet } => Some((*switch, packet.clone())),
                _ => None,
            })
            .collect()
    }

    pub fn gateway_installs(&self) -> Vec<SwitchId> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                FabricCall::InstallGatewayRules(switch) => Some(*switch),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.calls.lock().clear();
    }
}

impl FabricControl for RecordingFabric {
    fn install_rule(&self, rule: &FlowRule) {
        self.calls.lock().push(FabricCall::InstallRule(rule.clone()));
    }

    fn forward_default(&self, switch: SwitchId, packet: &PacketHandle) {
        self.calls.lock().push(FabricCall::ForwardDefault {
            switch,
            packet: packet.clone(),
        });
    }

    fn install_gateway_rules(&self, switch: SwitchId) {
        self.calls.lock().push(FabricCall::InstallGatewayRules(switch));
    }
}
