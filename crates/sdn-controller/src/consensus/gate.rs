//! ConsensusGate implementation.

use super::types::{PacketIdentity, Verdict, Vote, VoteTally};
use crate::topology::TopologyStore;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// Gate settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateConfig {
    /// Share of active switches (0-100) that must vote before a decision
    pub required_votes_percentage: u8,
    /// Undecided tallies older than this are dropped; `None` keeps them
    pub tally_ttl: Option<Duration>,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            required_votes_percentage: 51,
            tally_ttl: Some(Duration::from_secs(30)),
        }
    }
}

/// Quorum for `active_switches` at `percentage`, floored, never below one.
pub fn required_votes_for(percentage: u8, active_switches: usize) -> usize {
    let percentage = usize::from(percentage.min(100));
    (percentage.saturating_mul(active_switches) / 100).max(1)
}

/// Collects votes per packet identity and decides by majority.
///
/// Each identity goes through cycles: the first vote opens a tally, the vote
/// that brings it to quorum closes it and yields the verdict, and the next
/// vote for the same identity opens a fresh one. Tally mutation happens under
/// the map's shard lock for that identity, so concurrent submissions produce
/// exactly one verdict per cycle.
pub struct ConsensusGate {
    config: GateConfig,
    topology: Arc<TopologyStore>,
    tallies: DashMap<PacketIdentity, VoteTally>,
}

impl ConsensusGate {
    pub fn new(config: GateConfig, topology: Arc<TopologyStore>) -> Self {
        Self {
            config,
            topology,
            tallies: DashMap::new(),
        }
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Current quorum, read from the live switch count.
    pub fn required_votes(&self) -> usize {
        required_votes_for(
            self.config.required_votes_percentage,
            self.topology.active_switch_count(),
        )
    }

    /// Adds a vote. Returns the verdict if this vote completed the tally.
    pub fn submit_vote(&self, identity: PacketIdentity, vote: Vote) -> Option<Verdict> {
        self.submit_vote_at(identity, vote, Instant::now())
    }

    /// [`submit_vote`](Self::submit_vote) with an explicit clock reading,
    /// used as the tally's opening time.
    pub fn submit_vote_at(
        &self,
        identity: PacketIdentity,
        vote: Vote,
        now: Instant,
    ) -> Option<Verdict> {
        // Read the quorum before locking the shard; the topology lock is
        // never taken while a tally is held.
        let required = self.required_votes();

        let verdict = match self.tallies.entry(identity) {
            Entry::Occupied(mut entry) => {
                entry.get_mut().push(vote);
                if entry.get().len() >= required {
                    Some(entry.remove().decide())
                } else {
                    None
                }
            }
            Entry::Vacant(entry) => {
                let tally = VoteTally::new(vote, now);
                if required <= 1 {
                    Some(tally.decide())
                } else {
                    entry.insert(tally);
                    None
                }
            }
        };

        match verdict {
            Some(verdict) => debug!(%identity, %vote, required, %verdict, "tally decided"),
            None => debug!(%identity, %vote, required, "vote recorded"),
        }
        verdict
    }

    /// Number of open tallies.
    pub fn pending(&self) -> usize {
        self.tallies.len()
    }

    /// Votes collected so far for `identity`, zero if no tally is open.
    pub fn pending_votes(&self, identity: &PacketIdentity) -> usize {
        self.tallies.get(identity).map(|t| t.len()).unwrap_or(0)
    }

    /// Drops tallies older than the configured TTL. Returns how many.
    pub fn evict_expired(&self) -> usize {
        self.evict_expired_at(Instant::now())
    }

    pub fn evict_expired_at(&self, now: Instant) -> usize {
        let Some(ttl) = self.config.tally_ttl else {
            return 0;
        };
        let before = self.tallies.len();
        self.tallies
            .retain(|_, tally| now.saturating_duration_since(tally.opened_at()) < ttl);
        before.saturating_sub(self.tallies.len())
    }
}

impl std::fmt::Debug for ConsensusGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsensusGate")
            .field("config", &self.config)
            .field("pending", &self.tallies.len())
            .finish()
    }
}
