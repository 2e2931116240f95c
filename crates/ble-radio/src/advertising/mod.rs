//! Cross-platform advertising trait and platform detection

pub mod fallback;
#[cfg(target_os = "linux")]
pub mod linux;

use std::time::Duration;

use crate::error::ProviderError;

// ----------------------------------------------------------------------------
// Cross-platform Advertising Trait
// ----------------------------------------------------------------------------

/// Trait for BLE advertising functionality across different platforms
#[async_trait::async_trait]
pub trait BleAdvertiser: Send + Sync {
    /// Advertise `frame` as manufacturer data for `duration`, replacing any
    /// advertisement still running
    async fn start_advertising(&mut self, frame: &[u8], duration: Duration)
        -> Result<(), ProviderError>;

    /// Stop advertising
    async fn stop_advertising(&mut self) -> Result<(), ProviderError>;

    /// Check if currently advertising
    fn is_advertising(&self) -> bool;
}

// ----------------------------------------------------------------------------
// Platform Detection and Factory
// ----------------------------------------------------------------------------

/// Platform-specific advertiser enum
pub enum PlatformAdvertiser {
    #[cfg(target_os = "linux")]
    Linux(linux::LinuxAdvertiser),
    #[allow(dead_code)]
    Fallback(fallback::FallbackAdvertiser),
}

impl PlatformAdvertiser {
    /// Create the appropriate advertiser for the current platform
    pub fn new() -> Self {
        #[cfg(target_os = "linux")]
        {
            Self::Linux(linux::LinuxAdvertiser::new())
        }
        #[cfg(not(target_os = "linux"))]
        {
            Self::Fallback(fallback::FallbackAdvertiser::new())
        }
    }
}

impl Default for PlatformAdvertiser {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl BleAdvertiser for PlatformAdvertiser {
    async fn start_advertising(
        &mut self,
        frame: &[u8],
        duration: Duration,
    ) -> Result<(), ProviderError> {
        match self {
            #[cfg(target_os = "linux")]
            Self::Linux(ref mut advertiser) => advertiser.start_advertising(frame, duration).await,
            Self::Fallback(ref mut advertiser) => {
                advertiser.start_advertising(frame, duration).await
            }
        }
    }

    async fn stop_advertising(&mut self) -> Result<(), ProviderError> {
        match self {
            #[cfg(target_os = "linux")]
            Self::Linux(ref mut advertiser) => advertiser.stop_advertising().await,
            Self::Fallback(ref mut advertiser) => advertiser.stop_advertising().await,
        }
    }

    fn is_advertising(&self) -> bool {
        match self {
            #[cfg(target_os = "linux")]
            Self::Linux(ref advertiser) => advertiser.is_advertising(),
            Self::Fallback(ref advertiser) => advertiser.is_advertising(),
        }
    }
}
