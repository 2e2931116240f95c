//! Fallback advertising implementation for unsupported platforms

use std::time::Duration;

use tracing::warn;

use crate::error::ProviderError;

use super::BleAdvertiser;

// ----------------------------------------------------------------------------
// Fallback Implementation
// ----------------------------------------------------------------------------

/// Advertiser for platforms without manufacturer-data advertising.
/// Scanning still works through btleplug; sending reports `Unsupported`.
pub struct FallbackAdvertiser;

impl FallbackAdvertiser {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FallbackAdvertiser {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl BleAdvertiser for FallbackAdvertiser {
    async fn start_advertising(
        &mut self,
        frame: &[u8],
        _duration: Duration,
    ) -> Result<(), ProviderError> {
        warn!(
            "BLE advertising not supported on this platform; dropping {} byte frame. \
            Use Linux with BlueZ to send messages.",
            frame.len()
        );
        Err(ProviderError::Unsupported(
            "manufacturer data advertising requires BlueZ".to_string(),
        ))
    }

    async fn stop_advertising(&mut self) -> Result<(), ProviderError> {
        Ok(())
    }

    fn is_advertising(&self) -> bool {
        false
    }
}
