//! Controller configuration.
//!
//! Loaded from a YAML file with a single top-level `controller:` section.
//! Default location: /etc/sdn-controller/controller-config.yaml
//!
//! ```yaml
//! controller:
//!   required_votes_percentage: 51
//!   consensus_enabled: true
//!   vote_tally_ttl_secs: 30
//!   gateway_ip: 10.0.0.254
//!   gateway_mac: aa:bb:cc:dd:ee:ff
//! ```

use crate::error::{ControllerError, Result};
use sdn_fabric::{GatewaySettings, DEFAULT_FLOW_PRIORITY};
use sdn_types::MacAddress;
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::Ipv4Addr;
use std::path::Path;
use std::time::Duration;
use tracing::warn;

pub const DEFAULT_CONFIG_PATH: &str = "/etc/sdn-controller/controller-config.yaml";

/// Settings under the `controller:` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControllerSettings {
    /// Share of active switches (0-100) whose votes decide a packet
    #[serde(default = "default_required_votes_percentage")]
    pub required_votes_percentage: u8,

    /// Gate packets on the vote; when false every packet is admitted
    #[serde(default = "default_consensus_enabled")]
    pub consensus_enabled: bool,

    /// Seconds an undecided vote tally may linger (0 keeps it forever)
    #[serde(default = "default_vote_tally_ttl_secs")]
    pub vote_tally_ttl_secs: u64,

    /// Seconds without traffic before a host location is forgotten (0 never)
    #[serde(default)]
    pub host_idle_timeout_secs: u64,

    /// Period of the eviction sweep in milliseconds
    #[serde(default = "default_eviction_interval_ms")]
    pub eviction_interval_ms: u64,

    /// Priority of installed path rules
    #[serde(default = "default_flow_priority")]
    pub flow_priority: u16,

    /// Also install the delivery rule on the destination host's switch
    #[serde(default)]
    pub install_edge_rule: bool,

    #[serde(default = "default_gateway_ip")]
    pub gateway_ip: Ipv4Addr,

    #[serde(default = "default_gateway_mac")]
    pub gateway_mac: MacAddress,
}

/// Complete controller configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ControllerConfig {
    #[serde(default)]
    pub controller: ControllerSettings,
}

fn default_required_votes_percentage() -> u8 {
    51
}

fn default_consensus_enabled() -> bool {
    true
}

fn default_vote_tally_ttl_secs() -> u64 {
    30
}

fn default_eviction_interval_ms() -> u64 {
    1000
}

fn default_flow_priority() -> u16 {
    DEFAULT_FLOW_PRIORITY
}

fn default_gateway_ip() -> Ipv4Addr {
    Ipv4Addr::new(10, 0, 0, 254)
}

fn default_gateway_mac() -> MacAddress {
    MacAddress::new([0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff])
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            required_votes_percentage: default_required_votes_percentage(),
            consensus_enabled: default_consensus_enabled(),
            vote_tally_ttl_secs: default_vote_tally_ttl_secs(),
            host_idle_timeout_secs: 0,
            eviction_interval_ms: default_eviction_interval_ms(),
            flow_priority: default_flow_priority(),
            install_edge_rule: false,
            gateway_ip: default_gateway_ip(),
            gateway_mac: default_gateway_mac(),
        }
    }
}

impl ControllerConfig {
    /// Load configuration from file, falling back to defaults if file not found
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        match fs::read_to_string(path) {
            Ok(content) => Self::from_yaml_str(&content).map_err(|e| {
                ControllerError::configuration(format!("{}: {}", path.display(), e))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "config file not found, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(ControllerError::Io(e)),
        }
    }

    /// Parse and validate a YAML document.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)
            .map_err(|e| ControllerError::configuration(format!("invalid YAML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let settings = &self.controller;
        if settings.required_votes_percentage > 100 {
            return Err(ControllerError::configuration(format!(
                "required_votes_percentage must be in 0..=100, got {}",
                settings.required_votes_percentage
            )));
        }
        if settings.eviction_interval_ms == 0 {
            return Err(ControllerError::configuration(
                "eviction_interval_ms must be greater than zero",
            ));
        }
        Ok(())
    }

    pub fn vote_tally_ttl(&self) -> Option<Duration> {
        non_zero_secs(self.controller.vote_tally_ttl_secs)
    }

    pub fn host_idle_timeout(&self) -> Option<Duration> {
        non_zero_secs(self.controller.host_idle_timeout_secs)
    }

    pub fn eviction_interval(&self) -> Duration {
        Duration::from_millis(self.controller.eviction_interval_ms)
    }

    pub fn gateway(&self) -> GatewaySettings {
        GatewaySettings {
            ip: self.controller.gateway_ip,
            mac: self.controller.gateway_mac,
        }
    }
}

fn non_zero_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}
