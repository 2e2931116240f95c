//! Linux BLE advertising implementation using bluer (BlueZ)

use std::collections::BTreeMap;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info};

use crate::error::ProviderError;
use crate::protocol::ADAFRUIT_COMPANY_ID;

use super::BleAdvertiser;

// ----------------------------------------------------------------------------
// Linux Implementation
// ----------------------------------------------------------------------------

pub struct LinuxAdvertiser {
    session: Option<bluer::Session>,
    adapter: Option<bluer::Adapter>,
    advertisement_handle: Option<bluer::adv::AdvertisementHandle>,
    advertising_until: Option<Instant>,
}

impl LinuxAdvertiser {
    pub fn new() -> Self {
        Self {
            session: None,
            adapter: None,
            advertisement_handle: None,
            advertising_until: None,
        }
    }

    async fn initialize(&mut self) -> Result<&bluer::Adapter, ProviderError> {
        if self.session.is_none() {
            let session = bluer::Session::new()
                .await
                .map_err(|e| ProviderError::Advertise(format!("BlueZ session: {}", e)))?;

            let adapter = session
                .default_adapter()
                .await
                .map_err(|_| ProviderError::AdapterNotAvailable)?;

            // Enable adapter if needed
            if !adapter.is_powered().await.unwrap_or(false) {
                adapter.set_powered(true).await.map_err(|e| {
                    ProviderError::Advertise(format!("Failed to power on adapter: {}", e))
                })?;
            }

            self.session = Some(session);
            self.adapter = Some(adapter);
            info!("Linux BLE adapter initialized for advertising");
        }

        self.adapter.as_ref().ok_or(ProviderError::AdapterNotAvailable)
    }
}

impl Default for LinuxAdvertiser {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl BleAdvertiser for LinuxAdvertiser {
    async fn start_advertising(
        &mut self,
        frame: &[u8],
        duration: Duration,
    ) -> Result<(), ProviderError> {
        // One advertisement at a time; the previous one is withdrawn first
        self.stop_advertising().await?;

        let adapter = self.initialize().await?;

        let mut manufacturer_data = BTreeMap::new();
        manufacturer_data.insert(ADAFRUIT_COMPANY_ID, frame.to_vec());

        // BlueZ withdraws the advertisement itself once `timeout` elapses
        let advertisement = bluer::adv::Advertisement {
            advertisement_type: bluer::adv::Type::Broadcast,
            manufacturer_data,
            discoverable: Some(false),
            timeout: Some(duration),
            ..Default::default()
        };

        let handle = adapter
            .advertise(advertisement)
            .await
            .map_err(|e| ProviderError::Advertise(e.to_string()))?;

        self.advertisement_handle = Some(handle);
        self.advertising_until = Some(Instant::now() + duration);
        debug!(
            "Started BLE advertising of {} byte frame for {:?}",
            frame.len(),
            duration
        );
        Ok(())
    }

    async fn stop_advertising(&mut self) -> Result<(), ProviderError> {
        self.advertising_until = None;
        if let Some(handle) = self.advertisement_handle.take() {
            drop(handle); // Dropping the handle unregisters the advertisement
            debug!("Stopped BLE advertising");
        }
        Ok(())
    }

    fn is_advertising(&self) -> bool {
        self.advertising_until
            .is_some_and(|until| Instant::now() < until)
    }
}
