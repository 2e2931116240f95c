//! In-process advertisement medium
//!
//! [`SimulatedAir`] stands in for the radio spectrum: every provider attached
//! to the same air sees what the others advertise, never its own frames.
//! Scans honour the requested window through `tokio::time`, so tests can run
//! on a paused clock.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

use super::{AdvertisementProvider, Observation};
use crate::error::ProviderError;
use crate::protocol::MAX_FRAME_LEN;

/// Signal strength reported for devices attached without an explicit one
pub const DEFAULT_SIMULATED_RSSI: i16 = -40;

// ----------------------------------------------------------------------------
// Shared Medium
// ----------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct Broadcast {
    frame: Vec<u8>,
    rssi: i16,
    published_at: Instant,
    expires_at: Instant,
}

/// Shared medium connecting simulated providers
#[derive(Debug, Clone, Default)]
pub struct SimulatedAir {
    broadcasts: Arc<Mutex<HashMap<String, Broadcast>>>,
    next_device: Arc<AtomicU32>,
}

impl SimulatedAir {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a new device heard at [`DEFAULT_SIMULATED_RSSI`]
    pub fn attach(&self) -> SimulatedProvider {
        self.attach_with_rssi(DEFAULT_SIMULATED_RSSI)
    }

    /// Attach a new device whose broadcasts are heard at `rssi`
    pub fn attach_with_rssi(&self, rssi: i16) -> SimulatedProvider {
        let device = self.next_device.fetch_add(1, Ordering::Relaxed) + 1;
        let address = format!(
            "02:00:00:00:{:02X}:{:02X}",
            (device >> 8) & 0xFF,
            device & 0xFF
        );
        debug!("Attached simulated device {}", address);

        SimulatedProvider {
            air: self.clone(),
            address,
            rssi,
            max_frame_len: MAX_FRAME_LEN,
            closed: false,
        }
    }

    /// Frames currently on air, keyed by sender address
    pub async fn on_air(&self) -> Vec<(String, Vec<u8>)> {
        let now = Instant::now();
        let broadcasts = self.broadcasts.lock().await;
        let mut frames: Vec<_> = broadcasts
            .iter()
            .filter(|(_, broadcast)| broadcast.expires_at > now)
            .map(|(address, broadcast)| (address.clone(), broadcast.frame.clone()))
            .collect();
        frames.sort();
        frames
    }
}

// ----------------------------------------------------------------------------
// Simulated Provider
// ----------------------------------------------------------------------------

/// A device attached to a [`SimulatedAir`]
#[derive(Debug)]
pub struct SimulatedProvider {
    air: SimulatedAir,
    address: String,
    rssi: i16,
    max_frame_len: usize,
    closed: bool,
}

impl SimulatedProvider {
    /// Override the frame capacity (defaults to [`MAX_FRAME_LEN`])
    pub fn with_max_frame_len(mut self, len: usize) -> Self {
        self.max_frame_len = len;
        self
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    fn ensure_open(&self) -> Result<(), ProviderError> {
        if self.closed {
            Err(ProviderError::Closed)
        } else {
            Ok(())
        }
    }
}

#[async_trait::async_trait]
impl AdvertisementProvider for SimulatedProvider {
    async fn advertise(&mut self, frame: &[u8], duration: Duration) -> Result<(), ProviderError> {
        self.ensure_open()?;
        if frame.len() > self.max_frame_len {
            return Err(ProviderError::Advertise(format!(
                "frame of {} bytes exceeds {} byte advertisement",
                frame.len(),
                self.max_frame_len
            )));
        }

        let now = Instant::now();
        let broadcast = Broadcast {
            frame: frame.to_vec(),
            rssi: self.rssi,
            published_at: now,
            expires_at: now + duration,
        };
        self.air
            .broadcasts
            .lock()
            .await
            .insert(self.address.clone(), broadcast);
        debug!(
            "{} advertising {} bytes for {:?}",
            self.address,
            frame.len(),
            duration
        );
        Ok(())
    }

    async fn scan(&mut self, window: Duration) -> Result<Vec<Observation>, ProviderError> {
        self.ensure_open()?;
        let start = Instant::now();
        tokio::time::sleep(window).await;
        let end = Instant::now();

        let broadcasts = self.air.broadcasts.lock().await;
        let mut observations: Vec<Observation> = broadcasts
            .iter()
            .filter(|(address, _)| **address != self.address)
            .filter(|(_, broadcast)| broadcast.published_at <= end && broadcast.expires_at > start)
            .map(|(address, broadcast)| Observation {
                address: address.clone(),
                data: broadcast.frame.clone(),
                rssi: broadcast.rssi,
                received_at: broadcast.published_at.max(start),
                last_heard: broadcast.expires_at.min(end),
            })
            .collect();
        observations.sort_by(|a, b| {
            a.received_at
                .cmp(&b.received_at)
                .then_with(|| a.address.cmp(&b.address))
        });
        Ok(observations)
    }

    fn max_frame_len(&self) -> usize {
        self.max_frame_len
    }

    async fn shutdown(&mut self) -> Result<(), ProviderError> {
        if self.closed {
            return Ok(());
        }
        self.air.broadcasts.lock().await.remove(&self.address);
        self.closed = true;
        debug!("Simulated device {} shut down", self.address);
        Ok(())
    }
}

impl Drop for SimulatedProvider {
    fn drop(&mut self) {
        if !self.closed {
            if let Ok(mut broadcasts) = self.air.broadcasts.try_lock() {
                broadcasts.remove(&self.address);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    const WINDOW: Duration = Duration::from_secs(1);

    #[tokio::test(start_paused = true)]
    async fn test_devices_get_distinct_addresses() {
        let air = SimulatedAir::new();
        let first = air.attach();
        let second = air.attach();
        assert_eq!(first.address(), "02:00:00:00:00:01");
        assert_eq!(second.address(), "02:00:00:00:00:02");
    }

    #[tokio::test(start_paused = true)]
    async fn test_scan_sees_others_but_not_self() {
        let air = SimulatedAir::new();
        let mut sender = air.attach_with_rssi(-61);
        let mut receiver = air.attach();

        assert_ok!(sender.advertise(b"\x07Hello", WINDOW * 5).await);

        let seen = receiver.scan(WINDOW).await.unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].address, sender.address());
        assert_eq!(seen[0].data, b"\x07Hello");
        assert_eq!(seen[0].rssi, -61);

        // Still on air for the sender, but it never hears itself
        let own = sender.scan(Duration::from_millis(10)).await.unwrap();
        assert!(own.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_broadcast_expires() {
        let air = SimulatedAir::new();
        let mut sender = air.attach();
        let mut receiver = air.attach();

        let start = Instant::now();
        sender
            .advertise(b"\x07Hello", Duration::from_millis(500))
            .await
            .unwrap();
        let seen = receiver.scan(WINDOW).await.unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].received_at, start);
        assert_eq!(seen[0].last_heard, start + Duration::from_millis(500));
        assert!(receiver.scan(WINDOW).await.unwrap().is_empty());
        assert!(air.on_air().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_advertisement_replaces_previous() {
        let air = SimulatedAir::new();
        let mut sender = air.attach();

        sender.advertise(b"\x01one", WINDOW).await.unwrap();
        sender.advertise(b"\x01two", WINDOW).await.unwrap();

        assert_eq!(
            air.on_air().await,
            vec![(sender.address().to_string(), b"\x01two".to_vec())]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_oversized_frame_is_rejected() {
        let air = SimulatedAir::new();
        let mut sender = air.attach().with_max_frame_len(4);

        assert_ok!(sender.advertise(&[1, 2, 3, 4], WINDOW).await);
        let err = assert_err!(sender.advertise(&[1, 2, 3, 4, 5], WINDOW).await);
        assert!(matches!(err, ProviderError::Advertise(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_withdraws_and_closes() {
        let air = SimulatedAir::new();
        let mut sender = air.attach();

        sender.advertise(b"\x01bye", WINDOW).await.unwrap();
        assert_ok!(sender.shutdown().await);
        assert!(air.on_air().await.is_empty());

        assert_eq!(
            sender.advertise(b"\x01again", WINDOW).await,
            Err(ProviderError::Closed)
        );
        assert_eq!(sender.scan(WINDOW).await, Err(ProviderError::Closed));
        assert_ok!(sender.shutdown().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_withdraws_broadcast() {
        let air = SimulatedAir::new();
        let mut sender = air.attach();
        sender.advertise(b"\x01gone", WINDOW).await.unwrap();

        drop(sender);
        assert!(air.on_air().await.is_empty());
    }
}
