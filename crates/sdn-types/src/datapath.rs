//! Switch (datapath) identifiers.

use crate::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// OpenFlow datapath id of a fabric switch.
///
/// Displayed as the conventional 16 hex digits. Parsing accepts a decimal
/// number, a `0x`-prefixed hex number, or the colon-separated 8-octet form
/// some switches report.
///
/// # Examples
///
/// ```
/// use sdn_types::SwitchId;
///
/// let dpid: SwitchId = "0x1f".parse().unwrap();
/// assert_eq!(dpid, SwitchId::new(31));
/// assert_eq!(dpid.to_string(), "000000000000001f");
/// assert_eq!(dpid, "00:00:00:00:00:00:00:1f".parse::<SwitchId>().unwrap());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SwitchId(u64);

impl SwitchId {
    pub const fn new(dpid: u64) -> Self {
        SwitchId(dpid)
    }

    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SwitchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl FromStr for SwitchId {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseError::InvalidDatapathId(s.to_string());

        if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            return u64::from_str_radix(hex, 16).map(SwitchId).map_err(|_| invalid());
        }

        if s.contains(':') {
            let octets: Vec<&str> = s.split(':').collect();
            if octets.len() != 8 {
                return Err(invalid());
            }
            let mut dpid = 0u64;
            for octet in octets {
                if octet.is_empty() || octet.len() > 2 {
                    return Err(invalid());
                }
                let byte = u8::from_str_radix(octet, 16).map_err(|_| invalid())?;
                dpid = (dpid << 8) | u64::from(byte);
            }
            return Ok(SwitchId(dpid));
        }

        s.parse::<u64>().map(SwitchId).map_err(|_| invalid())
    }
}

impl From<u64> for SwitchId {
    fn from(dpid: u64) -> Self {
        SwitchId(dpid)
    }
}

impl From<SwitchId> for u64 {
    fn from(id: SwitchId) -> u64 {
        id.0
    }
}
