//! Host location learning.

mod table;
mod types;

pub use table::HostLocationTable;
pub use types::{HostLocation, HostRecord};
