//! Channel-filtered send and receive over an advertisement provider

use tokio::time::Instant;
use tracing::{debug, info};

use crate::config::RadioConfig;
use crate::error::Result;
use crate::protocol::{decode_frame, decode_text, encode_frame, max_payload_len, Channel};
use crate::provider::{AdvertisementProvider, Observation};
use crate::recent::RecentMessages;

// ----------------------------------------------------------------------------
// Received Messages
// ----------------------------------------------------------------------------

/// A message observed on the radio's channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedMessage {
    /// Payload with the channel byte removed
    pub payload: Vec<u8>,
    /// Received signal strength in dBm
    pub rssi: i16,
    /// When the advertisement was picked up
    pub received_at: Instant,
    /// Address of the sending device
    pub address: String,
}

impl ReceivedMessage {
    /// Payload as text, without trailing NUL padding
    pub fn text(&self) -> Option<String> {
        decode_text(&self.payload)
    }
}

// ----------------------------------------------------------------------------
// Radio
// ----------------------------------------------------------------------------

/// Sends and receives short messages tagged with a channel number.
///
/// Every frame put on air starts with the current channel byte, and only
/// frames carrying that byte are ever handed back by the receive calls.
/// Sending is fire-and-forget; receiving is a poll that listens for one scan
/// window and returns at most one message.
pub struct Radio<P: AdvertisementProvider> {
    provider: P,
    channel: Channel,
    config: RadioConfig,
    recent: RecentMessages,
}

impl<P: AdvertisementProvider> Radio<P> {
    /// Create a radio on the default channel
    pub fn new(provider: P) -> Self {
        let config = RadioConfig::default();
        Self {
            provider,
            channel: Channel::default(),
            recent: RecentMessages::new(config.repeat_gap),
            config,
        }
    }

    /// Create a radio on `channel` with otherwise default settings
    pub fn with_channel(provider: P, channel: i64) -> Result<Self> {
        Self::with_config(provider, RadioConfig::new().with_channel(channel))
    }

    /// Create a radio from a full configuration
    pub fn with_config(provider: P, config: RadioConfig) -> Result<Self> {
        let channel = config.validate()?;
        info!("Radio tuned to channel {}", channel);
        Ok(Self {
            provider,
            channel,
            recent: RecentMessages::new(config.repeat_gap),
            config,
        })
    }

    /// Retune to `channel`. Applies to every later send and receive.
    pub fn configure(&mut self, channel: i64) -> Result<()> {
        let channel = Channel::try_from(channel)?;
        if channel != self.channel {
            self.recent.clear();
        }
        self.channel = channel;
        self.config.channel = i64::from(channel);
        info!("Radio tuned to channel {}", channel);
        Ok(())
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    pub fn config(&self) -> &RadioConfig {
        &self.config
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Largest payload a single send can carry
    pub fn max_message_len(&self) -> usize {
        max_payload_len(self.provider.max_frame_len())
    }

    /// Broadcast `text` as UTF-8
    pub async fn send(&mut self, text: &str) -> Result<()> {
        self.send_bytes(text.as_bytes()).await
    }

    /// Broadcast raw bytes on the current channel
    pub async fn send_bytes(&mut self, payload: &[u8]) -> Result<()> {
        let frame = encode_frame(self.channel, payload, self.provider.max_frame_len())?;
        self.provider
            .advertise(&frame, self.config.advertise_duration)
            .await?;
        debug!(
            "Sent {} byte message on channel {}",
            payload.len(),
            self.channel
        );
        Ok(())
    }

    /// Listen for one scan window and return the first new text message.
    /// Payloads that are not valid UTF-8 are dropped.
    pub async fn receive(&mut self) -> Result<Option<String>> {
        let message = self.receive_full().await?;
        Ok(message.and_then(|message| {
            let text = message.text();
            if text.is_none() {
                debug!("Dropped non-UTF-8 message from {}", message.address);
            }
            text
        }))
    }

    /// Listen for one scan window and return the first new message on this
    /// channel, or `None` if nothing arrived
    pub async fn receive_full(&mut self) -> Result<Option<ReceivedMessage>> {
        let started = Instant::now();
        let observations = self.provider.scan(self.config.scan_window).await?;
        self.recent.begin_pass(started);

        let mut message = None;
        for observation in observations {
            let Some(payload) = self.payload_of(&observation) else {
                continue;
            };
            let (address, frame) = (&observation.address, &observation.data);

            if self
                .recent
                .continues(address, frame, observation.received_at)
            {
                self.recent.refresh(address, frame, observation.last_heard);
                debug!("Suppressed repeat from {}", address);
                continue;
            }

            // Later new frames stay unrecorded so the next poll reports them
            if message.is_none() {
                self.recent.refresh(address, frame, observation.last_heard);
                message = Some(ReceivedMessage {
                    payload: payload.to_vec(),
                    rssi: observation.rssi,
                    received_at: observation.received_at,
                    address: address.clone(),
                });
            }
        }

        self.recent.end_pass(Instant::now());
        Ok(message)
    }

    /// Release the provider
    pub async fn shutdown(mut self) -> Result<()> {
        self.provider.shutdown().await?;
        info!("Radio on channel {} shut down", self.channel);
        Ok(())
    }

    /// Payload of an observation that is strong enough and on this channel
    fn payload_of<'a>(&self, observation: &'a Observation) -> Option<&'a [u8]> {
        if observation.rssi < self.config.minimum_rssi {
            debug!(
                "Ignored advertisement from {} at {} dBm",
                observation.address, observation.rssi
            );
            return None;
        }

        let (channel, payload) = decode_frame(&observation.data)?;
        (channel == self.channel).then_some(payload)
    }
}
