//! Common identifier types for the SDN control plane.
//!
//! This crate provides type-safe representations of the identifiers that flow
//! between the fabric and the controller core:
//!
//! - [`MacAddress`]: 48-bit Ethernet address, used as the host identifier
//! - [`SwitchId`]: OpenFlow datapath id of a fabric switch
//! - [`PortNo`]: OpenFlow port number, including the reserved ports

mod datapath;
mod mac;
mod port;

pub use datapath::SwitchId;
pub use mac::MacAddress;
pub use port::PortNo;

/// Common error type for parsing failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid MAC address format: {0}")]
    InvalidMacAddress(String),

    #[error("invalid datapath id: {0}")]
    InvalidDatapathId(String),

    #[error("invalid port number: {0}")]
    InvalidPortNumber(String),
}
