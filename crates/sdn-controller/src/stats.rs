//! Controller statistics.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters updated from the event path.
///
/// Shared by reference between the dispatcher and the components it owns;
/// every counter is a relaxed atomic, so reads are only approximately
/// consistent with one another.
#[derive(Debug, Default)]
pub struct ControllerStats {
    pub packets_in: AtomicU64,
    pub verdicts_allow: AtomicU64,
    pub verdicts_drop: AtomicU64,
    pub rules_installed: AtomicU64,
    pub hops_skipped: AtomicU64,
    pub tallies_evicted: AtomicU64,
    pub hosts_evicted: AtomicU64,
    pub flows_removed: AtomicU64,
}

/// Point-in-time copy of [`ControllerStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub packets_in: u64,
    pub verdicts_allow: u64,
    pub verdicts_drop: u64,
    pub rules_installed: u64,
    pub hops_skipped: u64,
    pub tallies_evicted: u64,
    pub hosts_evicted: u64,
    pub flows_removed: u64,
}

impl ControllerStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn incr(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add(counter: &AtomicU64, n: u64) {
        if n > 0 {
            counter.fetch_add(n, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let load = |c: &AtomicU64| c.load(Ordering::Relaxed);
        StatsSnapshot {
            packets_in: load(&self.packets_in),
            verdicts_allow: load(&self.verdicts_allow),
            verdicts_drop: load(&self.verdicts_drop),
            rules_installed: load(&self.rules_installed),
            hops_skipped: load(&self.hops_skipped),
            tallies_evicted: load(&self.tallies_evicted),
            hosts_evicted: load(&self.hosts_evicted),
            flows_removed: load(&self.flows_removed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_reflects_counters() {
        let stats = ControllerStats::new();
        ControllerStats::incr(&stats.packets_in);
        ControllerStats::incr(&stats.packets_in);
        ControllerStats::add(&stats.rules_installed, 3);
        ControllerStats::add(&stats.hosts_evicted, 0);

        let snap = stats.snapshot();
        assert_eq!(snap.packets_in, 2);
        assert_eq!(snap.rules_installed, 3);
        assert_eq!(snap.hosts_evicted, 0);
        assert_eq!(snap.verdicts_allow, 0);
    }

    #[test]
    fn test_snapshot_serializes() {
        let json = serde_json::to_value(StatsSnapshot::default()).unwrap();
        assert_eq!(json["packets_in"], 0);
        assert_eq!(json.as_object().unwrap().len(), 8);
    }
}
