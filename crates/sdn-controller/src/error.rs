//! Error types for the controller process.
//!
//! The decision core itself never fails: malformed votes, unknown switches
//! and missing paths all degrade to a safe default. Errors only arise at the
//! process edges, while loading configuration or decoding recorded events.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ControllerError {
    /// Configuration could not be parsed or failed validation
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Event could not be decoded
    #[error("Event decode error at line {line}: {source}")]
    EventDecode {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    /// Event channel closed while the source was still producing
    #[error("Event channel closed")]
    ChannelClosed,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ControllerError {
    pub fn configuration(message: impl Into<String>) -> Self {
        ControllerError::Configuration(message.into())
    }
}

/// Result type for controller operations
pub type Result<T> = std::result::Result<T, ControllerError>;
