//! Frame layout and radio constants
//!
//! A frame is the byte string carried in one advertisement: the channel byte
//! followed by the application payload. On real hardware the frame travels as
//! manufacturer-specific data under [`ADAFRUIT_COMPANY_ID`].

use std::fmt;
use std::time::Duration;

use crate::error::{RadioError, Result};

// ----------------------------------------------------------------------------
// Constants
// ----------------------------------------------------------------------------

/// Channel used when none is configured
pub const DEFAULT_CHANNEL: u8 = 42;

/// Bluetooth SIG company identifier the frames are published under
pub const ADAFRUIT_COMPANY_ID: u16 = 0x0822;

/// Bytes of framing ahead of the payload
pub const CHANNEL_HEADER_LEN: usize = 1;

/// Largest frame a legacy advertisement can carry.
///
/// 31 bytes of advertising data, minus the flags structure (3 bytes) and the
/// manufacturer data header (length, AD type, 2-byte company id).
pub const MAX_FRAME_LEN: usize = 31 - 3 - 4;

/// Largest payload that fits in [`MAX_FRAME_LEN`]
pub const MAX_LENGTH: usize = MAX_FRAME_LEN - CHANNEL_HEADER_LEN;

/// How long a single message stays on air
pub const AD_DURATION: Duration = Duration::from_millis(500);

/// How long one receive call listens for
pub const SCAN_WINDOW: Duration = Duration::from_secs(1);

/// Silence longer than this separates two broadcasts of the same frame
pub const REPEAT_GAP: Duration = Duration::from_millis(250);

/// Weakest reportable signal; also the default acceptance threshold
pub const MIN_RSSI: i16 = -255;

// ----------------------------------------------------------------------------
// Channel
// ----------------------------------------------------------------------------

/// A validated channel number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Channel(u8);

impl Channel {
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    pub const fn value(self) -> u8 {
        self.0
    }
}

impl Default for Channel {
    fn default() -> Self {
        Self(DEFAULT_CHANNEL)
    }
}

impl From<u8> for Channel {
    fn from(value: u8) -> Self {
        Self(value)
    }
}

impl From<Channel> for i64 {
    fn from(channel: Channel) -> Self {
        i64::from(channel.0)
    }
}

impl TryFrom<i64> for Channel {
    type Error = RadioError;

    fn try_from(value: i64) -> Result<Self> {
        u8::try_from(value)
            .map(Self)
            .map_err(|_| RadioError::InvalidChannel { channel: value })
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ----------------------------------------------------------------------------
// Frame Encoding
// ----------------------------------------------------------------------------

/// Largest payload for a provider whose frames hold `max_frame_len` bytes
pub fn max_payload_len(max_frame_len: usize) -> usize {
    max_frame_len.saturating_sub(CHANNEL_HEADER_LEN)
}

/// Build the frame for `payload` on `channel`
pub fn encode_frame(channel: Channel, payload: &[u8], max_frame_len: usize) -> Result<Vec<u8>> {
    let max = max_payload_len(max_frame_len);
    if payload.len() > max {
        return Err(RadioError::OversizeMessage {
            size: payload.len(),
            max,
        });
    }

    let mut frame = Vec::with_capacity(CHANNEL_HEADER_LEN + payload.len());
    frame.push(channel.value());
    frame.extend_from_slice(payload);
    Ok(frame)
}

/// Split a frame into its channel and payload. Empty frames carry no channel.
pub fn decode_frame(frame: &[u8]) -> Option<(Channel, &[u8])> {
    frame
        .split_first()
        .map(|(channel, payload)| (Channel(*channel), payload))
}

/// Decode a payload as text, ignoring trailing NUL padding
pub fn decode_text(payload: &[u8]) -> Option<String> {
    let end = payload
        .iter()
        .rposition(|byte| *byte != 0)
        .map_or(0, |last| last + 1);
    std::str::from_utf8(&payload[..end]).ok().map(str::to_owned)
}
