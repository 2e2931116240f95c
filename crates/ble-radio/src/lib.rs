//! Channel-tagged messaging over Bluetooth Low Energy advertisements
//!
//! A [`Radio`] broadcasts short byte or string messages as connectionless BLE
//! advertisements and picks up messages broadcast by other devices. A one-byte
//! channel number at the front of every frame partitions traffic: a radio
//! only ever surfaces frames sent on the channel it is tuned to.
//!
//! ## Architecture
//!
//! - [`config`] - Radio configuration and validation
//! - [`error`] - Error types
//! - [`protocol`] - Frame layout and constants
//! - [`provider`] - The advertising/scanning seam, with a simulated
//!   implementation and (behind the `hardware` feature) a real one
//! - [`radio`] - The channel radio itself
//!
//! ## Usage
//!
//! ```rust,no_run
//! use ble_radio::{Radio, SimulatedAir};
//!
//! # async fn example() -> Result<(), ble_radio::RadioError> {
//! let air = SimulatedAir::new();
//! let mut sender = Radio::with_channel(air.attach(), 7)?;
//! let mut listener = Radio::with_channel(air.attach(), 7)?;
//!
//! sender.send("Hello").await?;
//! loop {
//!     if let Some(text) = listener.receive().await? {
//!         println!("{}", text);
//!         break;
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Platform Support
//!
//! With the `hardware` feature, [`HardwareProvider`] scans through btleplug on
//! every platform btleplug supports. Sending needs BlueZ and is only available
//! on Linux; elsewhere it fails with [`ProviderError::Unsupported`].

#[cfg(feature = "hardware")]
mod advertising;
pub mod config;
pub mod error;
pub mod protocol;
pub mod provider;
pub mod radio;
mod recent;

// Public API exports
pub use config::RadioConfig;
pub use error::{ProviderError, RadioError, Result};
pub use protocol::{Channel, DEFAULT_CHANNEL, MAX_LENGTH};
#[cfg(feature = "hardware")]
pub use provider::hardware::HardwareProvider;
pub use provider::simulated::{SimulatedAir, SimulatedProvider};
pub use provider::{AdvertisementProvider, Observation};
pub use radio::{Radio, ReceivedMessage};
