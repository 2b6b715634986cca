//! Consensus-gated admission.
//!
//! Every switch that sees a packet reports a vote on it; once enough votes
//! for the same packet have arrived the gate decides whether the packet may
//! proceed. The quorum is a percentage of the switches currently in the
//! topology.

mod gate;
mod types;

pub use gate::{required_votes_for, ConsensusGate, GateConfig};
pub use types::{PacketIdentity, Verdict, Vote, VoteTally};
