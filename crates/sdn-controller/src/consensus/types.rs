//! Vote and verdict types.

use sdn_types::MacAddress;
use std::fmt;
use std::time::Instant;

/// Fixed seeds so a frame hashes to the same identity across restarts.
const FRAME_HASH_SEEDS: [u64; 4] = [
    0x5344_4e5f_6761_7465,
    0x7061_636b_6574_5f69,
    0x6465_6e74_6974_795f,
    0x7630_0000_0000_0001,
];

/// One switch's opinion about a packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Vote {
    Allow,
    Drop,
    Abstain,
}

impl Vote {
    /// Maps the raw vote field carried by a packet-in.
    ///
    /// `1` is allow, `2` is drop, anything else abstains.
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => Vote::Allow,
            2 => Vote::Drop,
            _ => Vote::Abstain,
        }
    }
}

impl fmt::Display for Vote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Vote::Allow => write!(f, "allow"),
            Vote::Drop => write!(f, "drop"),
            Vote::Abstain => write!(f, "abstain"),
        }
    }
}

/// Outcome of a completed tally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    /// Forward the packet and install its path
    Allow,
    /// Discard silently
    Drop,
}

impl Verdict {
    pub fn is_allow(&self) -> bool {
        matches!(self, Verdict::Allow)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Allow => write!(f, "allow"),
            Verdict::Drop => write!(f, "drop"),
        }
    }
}

/// Identity of "the same logical packet" across vote submissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PacketIdentity(u64);

impl PacketIdentity {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Identity supplied by the protocol layer.
    pub const fn from_transaction_id(xid: u64) -> Self {
        Self(xid)
    }

    /// Identity derived from the frame when no transaction id exists.
    ///
    /// Covers the Ethernet addresses and the raw bytes but not the reporting
    /// switch or port, so every switch voting on the same frame lands in the
    /// same tally.
    pub fn from_frame(src: MacAddress, dst: MacAddress, payload: &[u8]) -> Self {
        let [k0, k1, k2, k3] = FRAME_HASH_SEEDS;
        Self(ahash::RandomState::with_seeds(k0, k1, k2, k3).hash_one((src, dst, payload)))
    }

    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for PacketIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

/// Votes collected so far for one identity.
#[derive(Debug, Clone)]
pub struct VoteTally {
    votes: Vec<Vote>,
    opened_at: Instant,
}

impl VoteTally {
    pub fn new(first: Vote, opened_at: Instant) -> Self {
        Self {
            votes: vec![first],
            opened_at,
        }
    }

    pub fn push(&mut self, vote: Vote) {
        self.votes.push(vote);
    }

    pub fn len(&self) -> usize {
        self.votes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.votes.is_empty()
    }

    pub fn votes(&self) -> &[Vote] {
        &self.votes
    }

    pub fn opened_at(&self) -> Instant {
        self.opened_at
    }

    /// Strict majority of allow over drop; abstains only fill the quorum.
    pub fn decide(&self) -> Verdict {
        let (allow, drop) = self.votes.iter().fold((0usize, 0usize), |(a, d), vote| match vote {
            Vote::Allow => (a + 1, d),
            Vote::Drop => (a, d + 1),
            Vote::Abstain => (a, d),
        });
        if allow > drop {
            Verdict::Allow
        } else {
            Verdict::Drop
        }
    }
}
