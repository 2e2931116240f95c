//! Radio CLI configuration
//!
//! Settings come from an optional TOML file, then command-line overrides.
//! Timings are written in milliseconds:
//!
//! ```toml
//! channel = 7
//! advertise_duration_ms = 500
//! scan_window_ms = 1000
//! minimum_rssi = -90
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use ble_radio::RadioConfig;

use crate::error::Result;

// ----------------------------------------------------------------------------
// CLI Application Configuration
// ----------------------------------------------------------------------------

/// Configuration for the radio CLI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Channel to send and listen on
    pub channel: i64,
    /// How long each message stays on air
    pub advertise_duration_ms: u64,
    /// How long each listen poll scans
    pub scan_window_ms: u64,
    /// Ignore advertisements weaker than this (dBm)
    pub minimum_rssi: i16,
}

impl Default for AppConfig {
    fn default() -> Self {
        let radio = RadioConfig::default();
        Self {
            channel: radio.channel,
            advertise_duration_ms: radio.advertise_duration.as_millis() as u64,
            scan_window_ms: radio.scan_window.as_millis() as u64,
            minimum_rssi: radio.minimum_rssi,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_toml(&text)?;
        debug!("Loaded configuration from {}", path.as_ref().display());
        Ok(config)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.to_radio_config()?;
        Ok(config)
    }

    /// Apply command-line overrides
    pub fn with_overrides(mut self, channel: Option<i64>) -> Self {
        if let Some(channel) = channel {
            self.channel = channel;
        }
        self
    }

    /// Build and validate the library configuration
    pub fn to_radio_config(&self) -> Result<RadioConfig> {
        let config = RadioConfig::new()
            .with_channel(self.channel)
            .with_advertise_duration(Duration::from_millis(self.advertise_duration_ms))
            .with_scan_window(Duration::from_millis(self.scan_window_ms))
            .with_minimum_rssi(self.minimum_rssi);
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CliError;
    use ble_radio::RadioError;

    #[test]
    fn test_defaults_match_library() {
        let config = AppConfig::default();
        assert_eq!(config.channel, 42);
        assert_eq!(config.advertise_duration_ms, 500);
        assert_eq!(config.scan_window_ms, 1000);
        assert_eq!(config.to_radio_config().unwrap(), RadioConfig::default());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = AppConfig::from_toml("channel = 7\nminimum_rssi = -90\n").unwrap();
        assert_eq!(config.channel, 7);
        assert_eq!(config.minimum_rssi, -90);
        assert_eq!(config.scan_window_ms, 1000);

        let radio = config.to_radio_config().unwrap();
        assert_eq!(radio.channel, 7);
        assert_eq!(radio.minimum_rssi, -90);
    }

    #[test]
    fn test_invalid_channel_in_file() {
        let err = AppConfig::from_toml("channel = 300").unwrap_err();
        assert!(matches!(
            err,
            CliError::Radio(RadioError::InvalidChannel { channel: 300 })
        ));
    }

    #[test]
    fn test_zero_scan_window_in_file() {
        let err = AppConfig::from_toml("scan_window_ms = 0").unwrap_err();
        assert!(matches!(err, CliError::Radio(RadioError::InvalidConfig(_))));
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let err = AppConfig::from_toml("chanel = 7").unwrap_err();
        assert!(matches!(err, CliError::TomlParsing(_)));
    }

    #[test]
    fn test_channel_override() {
        let config = AppConfig::default().with_overrides(Some(9));
        assert_eq!(config.channel, 9);
        let config = config.with_overrides(None);
        assert_eq!(config.channel, 9);
    }

    #[test]
    fn test_load_missing_file() {
        let err = AppConfig::load_from_file("/nonexistent/ble-radio.toml").unwrap_err();
        assert!(matches!(err, CliError::Io(_)));
    }
}
