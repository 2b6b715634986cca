//! OpenFlow port numbers.

use crate::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An OpenFlow 1.3 port number.
///
/// Values above [`PortNo::MAX`] are reserved ports with special forwarding
/// meaning; they are displayed and parsed by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PortNo(u32);

impl PortNo {
    /// Highest number usable for a physical port.
    pub const MAX: PortNo = PortNo(0xffff_ff00);
    /// Send the packet out the port it arrived on.
    pub const IN_PORT: PortNo = PortNo(0xffff_fff8);
    /// Submit the packet to the first flow table.
    pub const TABLE: PortNo = PortNo(0xffff_fff9);
    pub const NORMAL: PortNo = PortNo(0xffff_fffa);
    pub const FLOOD: PortNo = PortNo(0xffff_fffb);
    pub const ALL: PortNo = PortNo(0xffff_fffc);
    /// Send the packet to the controller.
    pub const CONTROLLER: PortNo = PortNo(0xffff_fffd);
    pub const LOCAL: PortNo = PortNo(0xffff_fffe);
    /// Wildcard used in requests; never a real port.
    pub const ANY: PortNo = PortNo(0xffff_ffff);

    const RESERVED: [(PortNo, &'static str); 8] = [
        (PortNo::IN_PORT, "in_port"),
        (PortNo::TABLE, "table"),
        (PortNo::NORMAL, "normal"),
        (PortNo::FLOOD, "flood"),
        (PortNo::ALL, "all"),
        (PortNo::CONTROLLER, "controller"),
        (PortNo::LOCAL, "local"),
        (PortNo::ANY, "any"),
    ];

    pub const fn new(port: u32) -> Self {
        PortNo(port)
    }

    pub const fn as_u32(&self) -> u32 {
        self.0
    }

    /// Returns true for the reserved ports above [`PortNo::MAX`].
    pub const fn is_reserved(&self) -> bool {
        self.0 > Self::MAX.0
    }

    fn reserved_name(&self) -> Option<&'static str> {
        Self::RESERVED
            .iter()
            .find(|(port, _)| port == self)
            .map(|(_, name)| *name)
    }
}

impl fmt::Display for PortNo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.reserved_name() {
            Some(name) => f.write_str(name),
            None => write!(f, "{}", self.0),
        }
    }
}

impl FromStr for PortNo {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.to_ascii_lowercase();
        if let Some((port, _)) = Self::RESERVED.iter().find(|(_, name)| *name == lowered) {
            return Ok(*port);
        }
        s.parse::<u32>()
            .map(PortNo)
            .map_err(|_| ParseError::InvalidPortNumber(s.to_string()))
    }
}

impl From<u32> for PortNo {
    fn from(port: u32) -> Self {
        PortNo(port)
    }
}
