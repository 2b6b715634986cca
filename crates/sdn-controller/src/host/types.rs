//! Host location types.

use sdn_types::{PortNo, SwitchId};
use std::fmt;
use std::time::Instant;

/// Attachment point where a host was last seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HostLocation {
    pub switch: SwitchId,
    pub port: PortNo,
}

impl HostLocation {
    pub fn new(switch: SwitchId, port: PortNo) -> Self {
        Self { switch, port }
    }
}

impl fmt::Display for HostLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.switch, self.port)
    }
}

/// Table entry: the location plus when traffic from the host was last seen.
#[derive(Debug, Clone, Copy)]
pub struct HostRecord {
    pub location: HostLocation,
    pub last_seen: Instant,
}

impl HostRecord {
    pub fn new(location: HostLocation, last_seen: Instant) -> Self {
        Self {
            location,
            last_seen,
        }
    }

    pub fn is_idle(&self, now: Instant, max_idle: std::time::Duration) -> bool {
        now.saturating_duration_since(self.last_seen) >= max_idle
    }
}
