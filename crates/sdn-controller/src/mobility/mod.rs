//! Mobility-aware path installation.
//!
//! Learns where each host sits from the packets it sends and installs the
//! forwarding path toward wherever the destination was last seen.

mod router;

pub use router::{MobilityRouter, RouteOutcome, RouterConfig};
