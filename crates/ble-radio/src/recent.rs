//! Suppression of repeated advertisements
//!
//! A device keeps re-broadcasting the same frame for as long as it advertises,
//! so consecutive scans observe it several times. Frames carry no sequence
//! number, so a message is told apart from its repeats by continuity: a frame
//! that stays on air is one message, while a frame that falls silent for
//! longer than the repeat gap and then reappears is a new one.
//!
//! The pool works in scan passes. Only frames heard in the immediately
//! preceding pass can continue into the current one. The idle time between
//! two passes is unobserved and does not count as silence.

use std::collections::HashMap;
use std::time::Duration;

use tokio::time::Instant;

type Key = (String, Vec<u8>);

// ----------------------------------------------------------------------------
// Recent Message Pool
// ----------------------------------------------------------------------------

#[derive(Debug)]
pub(crate) struct RecentMessages {
    gap: Duration,
    /// Last sighting of each frame in the previous pass
    previous: HashMap<Key, Instant>,
    previous_ended: Option<Instant>,
    /// Last sighting of each frame in the pass being processed
    current: HashMap<Key, Instant>,
    current_started: Option<Instant>,
}

impl RecentMessages {
    pub(crate) fn new(gap: Duration) -> Self {
        Self {
            gap,
            previous: HashMap::new(),
            previous_ended: None,
            current: HashMap::new(),
            current_started: None,
        }
    }

    /// Start processing a scan pass that began listening at `started`
    pub(crate) fn begin_pass(&mut self, started: Instant) {
        self.current.clear();
        self.current_started = Some(started);
    }

    /// Close the pass; its sightings become the reference for the next one
    pub(crate) fn end_pass(&mut self, ended: Instant) {
        self.previous = std::mem::take(&mut self.current);
        self.previous_ended = Some(ended);
        self.current_started = None;
    }

    /// Whether a sighting first heard at `heard_at` continues a frame that was
    /// already handed to the caller
    pub(crate) fn continues(&self, address: &str, frame: &[u8], heard_at: Instant) -> bool {
        if self.gap.is_zero() {
            return false;
        }

        let key = (address.to_string(), frame.to_vec());
        if let Some(last_heard) = self.current.get(&key) {
            return heard_at.saturating_duration_since(*last_heard) <= self.gap;
        }

        match (self.previous.get(&key), self.previous_ended, self.current_started) {
            (Some(last_heard), Some(ended), Some(started)) => {
                ended.saturating_duration_since(*last_heard) <= self.gap
                    && heard_at.saturating_duration_since(started) <= self.gap
            }
            _ => false,
        }
    }

    /// Record that `(address, frame)` was on air until `last_heard` in this pass
    pub(crate) fn refresh(&mut self, address: &str, frame: &[u8], last_heard: Instant) {
        if self.gap.is_zero() {
            return;
        }

        let entry = self
            .current
            .entry((address.to_string(), frame.to_vec()))
            .or_insert(last_heard);
        *entry = (*entry).max(last_heard);
    }

    pub(crate) fn clear(&mut self) {
        self.previous.clear();
        self.previous_ended = None;
        self.current.clear();
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.previous.len() + self.current.len()
    }
}
