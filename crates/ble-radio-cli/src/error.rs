//! Error handling for the radio CLI

use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Radio error: {0}")]
    Radio(#[from] ble_radio::RadioError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("Hex decoding error: {0}")]
    HexDecoding(#[from] hex::FromHexError),

    #[error("Feature not available: {0}")]
    FeatureNotAvailable(String),
}

impl From<ble_radio::ProviderError> for CliError {
    fn from(err: ble_radio::ProviderError) -> Self {
        CliError::Radio(err.into())
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
