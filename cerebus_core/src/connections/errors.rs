use thiserror::Error;

use super::types::SdkStatus;

/// A central error enum for connection-related errors.
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// The SDK refused to open the interface (device absent, port in use, ...).
    #[error("Failed to connect to NSP: SDK status {status}")]
    Connect { status: SdkStatus },

    /// A data or control call was made without an open session.
    #[error("Not connected to NSP")]
    NotConnected,

    /// The requested stream is switched off in the held configuration.
    #[error("Stream '{0}' is disabled in the current configuration")]
    StreamDisabled(&'static str),

    /// A control call (close, trial_config, ...) returned a failure status.
    #[error("SDK call '{op}' failed with status {status}")]
    Sdk { op: &'static str, status: SdkStatus },
}

impl ConnectionError {
    /// Status code carried by SDK-originated errors.
    pub fn status(&self) -> Option<SdkStatus> {
        match self {
            ConnectionError::Connect { status } | ConnectionError::Sdk { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }
}
