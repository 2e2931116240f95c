//! Error types for the channel radio

use thiserror::Error;

// ----------------------------------------------------------------------------
// Error Types
// ----------------------------------------------------------------------------

/// Errors raised by a [`Radio`](crate::Radio)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RadioError {
    #[error("Invalid channel {channel}: must be between 0 and 255")]
    InvalidChannel { channel: i64 },

    #[error("Message too large: {size} bytes (max: {max})")]
    OversizeMessage { size: usize, max: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// Errors surfaced by an advertisement provider
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("BLE adapter not available")]
    AdapterNotAvailable,

    #[error("BLE advertising not supported: {0}")]
    Unsupported(String),

    #[error("Failed to advertise: {0}")]
    Advertise(String),

    #[error("Failed to scan: {0}")]
    Scan(String),

    #[error("Provider has been shut down")]
    Closed,
}

/// Result type for radio operations
pub type Result<T> = std::result::Result<T, RadioError>;
