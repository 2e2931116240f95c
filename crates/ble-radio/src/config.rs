//! Radio configuration

use std::time::Duration;

use crate::error::{RadioError, Result};
use crate::protocol::{
    Channel, AD_DURATION, DEFAULT_CHANNEL, MIN_RSSI, REPEAT_GAP, SCAN_WINDOW,
};

// ----------------------------------------------------------------------------
// Configuration
// ----------------------------------------------------------------------------

/// Configuration for a [`Radio`](crate::Radio)
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RadioConfig {
    /// Channel to broadcast and listen on (0-255)
    pub channel: i64,
    /// How long each sent message stays on air
    pub advertise_duration: Duration,
    /// How long a single receive call listens
    pub scan_window: Duration,
    /// Advertisements weaker than this are ignored
    pub minimum_rssi: i16,
    /// A frame that stays on air is reported once. Silence longer than this
    /// gap makes its next appearance a new message; zero reports every poll.
    pub repeat_gap: Duration,
}

impl Default for RadioConfig {
    fn default() -> Self {
        Self {
            channel: i64::from(DEFAULT_CHANNEL),
            advertise_duration: AD_DURATION,
            scan_window: SCAN_WINDOW,
            minimum_rssi: MIN_RSSI,
            repeat_gap: REPEAT_GAP,
        }
    }
}

impl RadioConfig {
    /// Create a new configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set channel
    pub fn with_channel(mut self, channel: i64) -> Self {
        self.channel = channel;
        self
    }

    /// Set advertising duration
    pub fn with_advertise_duration(mut self, duration: Duration) -> Self {
        self.advertise_duration = duration;
        self
    }

    /// Set scan window
    pub fn with_scan_window(mut self, window: Duration) -> Self {
        self.scan_window = window;
        self
    }

    /// Set minimum accepted signal strength
    pub fn with_minimum_rssi(mut self, rssi: i16) -> Self {
        self.minimum_rssi = rssi;
        self
    }

    /// Set the silence that separates repeated frames; zero disables suppression
    pub fn with_repeat_gap(mut self, gap: Duration) -> Self {
        self.repeat_gap = gap;
        self
    }

    /// Check every field, returning the validated channel
    pub fn validate(&self) -> Result<Channel> {
        let channel = Channel::try_from(self.channel)?;
        if self.advertise_duration.is_zero() {
            return Err(RadioError::InvalidConfig(
                "advertise_duration must be greater than zero".to_string(),
            ));
        }
        if self.scan_window.is_zero() {
            return Err(RadioError::InvalidConfig(
                "scan_window must be greater than zero".to_string(),
            ));
        }
        Ok(channel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RadioConfig::default();
        assert_eq!(config.channel, 42);
        assert_eq!(config.advertise_duration, Duration::from_millis(500));
        assert_eq!(config.scan_window, Duration::from_secs(1));
        assert_eq!(config.minimum_rssi, -255);
        assert_eq!(config.repeat_gap, Duration::from_millis(250));
        assert_eq!(config.validate(), Ok(Channel::new(42)));
    }

    #[test]
    fn test_builder() {
        let config = RadioConfig::new()
            .with_channel(7)
            .with_advertise_duration(Duration::from_secs(2))
            .with_scan_window(Duration::from_millis(250))
            .with_minimum_rssi(-80)
            .with_repeat_gap(Duration::ZERO);

        assert_eq!(config.validate(), Ok(Channel::new(7)));
        assert_eq!(config.minimum_rssi, -80);
        assert_eq!(config.repeat_gap, Duration::ZERO);
    }

    #[test]
    fn test_validate_rejects_out_of_range_channel() {
        for channel in [-1, 256, i64::MAX] {
            let config = RadioConfig::new().with_channel(channel);
            assert_eq!(
                config.validate(),
                Err(RadioError::InvalidChannel { channel })
            );
        }
    }

    #[test]
    fn test_validate_rejects_zero_timings() {
        let config = RadioConfig::new().with_advertise_duration(Duration::ZERO);
        assert!(matches!(config.validate(), Err(RadioError::InvalidConfig(_))));

        let config = RadioConfig::new().with_scan_window(Duration::ZERO);
        assert!(matches!(config.validate(), Err(RadioError::InvalidConfig(_))));
    }
}
