//! Hardware provider: btleplug scanning plus platform advertising
//!
//! Scanning goes through btleplug's central role on every platform. Frames are
//! picked out of `ManufacturerDataAdvertisement` events under
//! [`ADAFRUIT_COMPANY_ID`]; signal strength and address come from the
//! peripheral's cached properties. Advertising is delegated to the
//! [`PlatformAdvertiser`] for the target OS.

use std::collections::HashMap;
use std::time::Duration;

use btleplug::api::{Central, CentralEvent, Manager as _, Peripheral as _, ScanFilter};
use btleplug::platform::{Adapter, Manager, PeripheralId};
use futures::StreamExt;
use tokio::time::Instant;
use tracing::{debug, info};

use super::{AdvertisementProvider, Observation};
use crate::advertising::{BleAdvertiser, PlatformAdvertiser};
use crate::error::ProviderError;
use crate::protocol::{ADAFRUIT_COMPANY_ID, MAX_FRAME_LEN, MIN_RSSI};

// ----------------------------------------------------------------------------
// Hardware Provider
// ----------------------------------------------------------------------------

/// Drives the host's first BLE adapter
pub struct HardwareProvider {
    adapter: Adapter,
    advertiser: PlatformAdvertiser,
    closed: bool,
}

impl HardwareProvider {
    /// Acquire the first available BLE adapter
    pub async fn new() -> Result<Self, ProviderError> {
        let manager = Manager::new()
            .await
            .map_err(|e| ProviderError::Scan(format!("Failed to create BLE manager: {}", e)))?;

        let adapter = manager
            .adapters()
            .await
            .map_err(|e| ProviderError::Scan(format!("Failed to get BLE adapters: {}", e)))?
            .into_iter()
            .next()
            .ok_or(ProviderError::AdapterNotAvailable)?;

        info!("BLE adapter initialized");
        Ok(Self {
            adapter,
            advertiser: PlatformAdvertiser::new(),
            closed: false,
        })
    }

    fn ensure_open(&self) -> Result<(), ProviderError> {
        if self.closed {
            Err(ProviderError::Closed)
        } else {
            Ok(())
        }
    }

    /// Resolve the sender of a frame heard between `first` and `last`
    async fn observe(
        &self,
        id: &PeripheralId,
        data: Vec<u8>,
        (first, last): (Instant, Instant),
    ) -> Option<Observation> {
        let peripheral = self.adapter.peripheral(id).await.ok()?;
        let properties = peripheral.properties().await.ok()??;

        Some(Observation {
            address: properties.address.to_string(),
            data,
            rssi: properties.rssi.unwrap_or(MIN_RSSI),
            received_at: first,
            last_heard: last,
        })
    }
}

/// Our frame, if `event` carries manufacturer data under [`ADAFRUIT_COMPANY_ID`]
fn frame_from_event(event: CentralEvent) -> Option<(PeripheralId, Vec<u8>)> {
    match event {
        CentralEvent::ManufacturerDataAdvertisement {
            id,
            manufacturer_data,
        } => company_frame(manufacturer_data).map(|data| (id, data)),
        _ => None,
    }
}

fn company_frame(mut manufacturer_data: HashMap<u16, Vec<u8>>) -> Option<Vec<u8>> {
    manufacturer_data.remove(&ADAFRUIT_COMPANY_ID)
}

#[async_trait::async_trait]
impl AdvertisementProvider for HardwareProvider {
    async fn advertise(&mut self, frame: &[u8], duration: Duration) -> Result<(), ProviderError> {
        self.ensure_open()?;
        self.advertiser.start_advertising(frame, duration).await
    }

    async fn scan(&mut self, window: Duration) -> Result<Vec<Observation>, ProviderError> {
        self.ensure_open()?;

        let mut events = self
            .adapter
            .events()
            .await
            .map_err(|e| ProviderError::Scan(format!("Failed to get BLE events: {}", e)))?;

        self.adapter
            .start_scan(ScanFilter::default())
            .await
            .map_err(|e| ProviderError::Scan(format!("Failed to start BLE scan: {}", e)))?;
        debug!("Started BLE scan for {:?}", window);

        let deadline = Instant::now() + window;
        let mut heard: HashMap<(PeripheralId, Vec<u8>), (Instant, Instant)> = HashMap::new();
        while let Ok(Some(event)) = tokio::time::timeout_at(deadline, events.next()).await {
            if let Some(key) = frame_from_event(event) {
                let now = Instant::now();
                heard
                    .entry(key)
                    .and_modify(|(_, last)| *last = now)
                    .or_insert((now, now));
            }
        }

        self.adapter
            .stop_scan()
            .await
            .map_err(|e| ProviderError::Scan(format!("Failed to stop BLE scan: {}", e)))?;

        let mut heard: Vec<_> = heard.into_iter().collect();
        heard.sort_by_key(|(_, (first, _))| *first);

        let mut observations = Vec::with_capacity(heard.len());
        for ((id, data), span) in heard {
            if let Some(observation) = self.observe(&id, data, span).await {
                observations.push(observation);
            }
        }
        debug!("BLE scan finished with {} frames", observations.len());
        Ok(observations)
    }

    fn max_frame_len(&self) -> usize {
        MAX_FRAME_LEN
    }

    async fn shutdown(&mut self) -> Result<(), ProviderError> {
        if self.closed {
            return Ok(());
        }
        if self.advertiser.is_advertising() {
            debug!("Withdrawing advertisement still on air");
        }
        self.advertiser.stop_advertising().await?;

        // A scan cancelled mid-window never reached its own stop_scan
        if let Err(e) = self.adapter.stop_scan().await {
            debug!("No BLE scan to stop: {}", e);
        }
        self.closed = true;
        info!("BLE hardware released");
        Ok(())
    }
}
