//! HostLocationTable implementation.

use super::types::{HostLocation, HostRecord};
use dashmap::DashMap;
use sdn_types::{MacAddress, PortNo, SwitchId};
use std::time::{Duration, Instant};
use tracing::debug;

/// Last-seen location of every host, keyed by MAC address.
///
/// Last write wins and no history is kept: a host that moves simply
/// overwrites its entry. Backed by a sharded map so concurrent packet
/// arrivals for different hosts do not contend.
#[derive(Debug, Default)]
pub struct HostLocationTable {
    hosts: DashMap<MacAddress, HostRecord>,
}

impl HostLocationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `host` at `(switch, port)`.
    ///
    /// Returns the previous location if the host moved, `None` if it was
    /// unknown or is still in the same place.
    pub fn learn(&self, host: MacAddress, switch: SwitchId, port: PortNo) -> Option<HostLocation> {
        self.learn_at(host, HostLocation::new(switch, port), Instant::now())
    }

    /// [`learn`](Self::learn) with an explicit last-seen time.
    pub fn learn_at(
        &self,
        host: MacAddress,
        location: HostLocation,
        now: Instant,
    ) -> Option<HostLocation> {
        let previous = self
            .hosts
            .insert(host, HostRecord::new(location, now))
            .map(|record| record.location);

        match previous {
            Some(old) if old != location => {
                debug!(%host, from = %old, to = %location, "host moved");
                Some(old)
            }
            Some(_) => None,
            None => {
                debug!(%host, at = %location, "host learned");
                None
            }
        }
    }

    pub fn locate(&self, host: &MacAddress) -> Option<HostLocation> {
        self.hosts.get(host).map(|record| record.location)
    }

    pub fn forget(&self, host: &MacAddress) -> Option<HostLocation> {
        self.hosts.remove(host).map(|(_, record)| record.location)
    }

    /// Drops every host not seen within `max_idle` of `now`.
    ///
    /// Returns the number of entries removed.
    pub fn evict_idle(&self, now: Instant, max_idle: Duration) -> usize {
        let before = self.hosts.len();
        self.hosts.retain(|_, record| !record.is_idle(now, max_idle));
        before.saturating_sub(self.hosts.len())
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }
}
