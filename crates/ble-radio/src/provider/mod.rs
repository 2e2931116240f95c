//! Advertisement providers
//!
//! A provider owns whatever hardware (or simulation) actually puts frames on
//! air and listens for them. The radio only ever talks to this trait.

#[cfg(feature = "hardware")]
pub mod hardware;
pub mod simulated;

use std::time::Duration;

use tokio::time::Instant;

use crate::error::ProviderError;

// ----------------------------------------------------------------------------
// Observations
// ----------------------------------------------------------------------------

/// One advertisement frame seen during a scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    /// Address of the advertising device
    pub address: String,
    /// Frame bytes as published by the sender
    pub data: Vec<u8>,
    /// Received signal strength in dBm
    pub rssi: i16,
    /// When the frame was first seen during the scan
    pub received_at: Instant,
    /// When the frame was last seen during the scan
    pub last_heard: Instant,
}

// ----------------------------------------------------------------------------
// Provider Trait
// ----------------------------------------------------------------------------

/// Platform seam for broadcasting and observing advertisement frames
#[async_trait::async_trait]
pub trait AdvertisementProvider: Send {
    /// Put `frame` on air for `duration`. Returns once advertising has started;
    /// a later call replaces the frame being advertised.
    async fn advertise(&mut self, frame: &[u8], duration: Duration) -> Result<(), ProviderError>;

    /// Listen for `window` and return every frame observed
    async fn scan(&mut self, window: Duration) -> Result<Vec<Observation>, ProviderError>;

    /// Largest frame this provider can put in one advertisement
    fn max_frame_len(&self) -> usize;

    /// Stop advertising and release the hardware
    async fn shutdown(&mut self) -> Result<(), ProviderError>;
}
