//! Chain of taps refining a single tempo estimate.
//!
//! A chain starts with a tap arriving after a long enough pause. The first
//! tap only anchors the phase. Each following tap adds one duration into
//! the averaging window. Once the user stops tapping for a while, the chain
//! goes stale and the next tap starts a new one.

use crate::buffer::Buffer;
use crate::configuration::{Configuration, MAX_TAP_VALUES};
use crate::log;

#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub(crate) struct Chain {
    durations: Buffer<MAX_TAP_VALUES>,
    taps: usize,
    last_tap_ms: u32,
    reset_ms: u32,
    last_tap_was_skip_corrected: bool,
}

impl Chain {
    pub fn new(now_ms: u32) -> Self {
        Self {
            durations: Buffer::new(),
            taps: 0,
            last_tap_ms: 0,
            reset_ms: now_ms,
            last_tap_was_skip_corrected: false,
        }
    }

    /// Whether a tap arriving at `ms` would still contribute to the chain.
    ///
    /// Both the hard ceiling of the maximal beat length and the window
    /// relative to the current tempo must not be reached yet.
    pub fn is_active(&self, ms: u32, beat_length_ms: u32, configuration: &Configuration) -> bool {
        let since_last_tap = ms.wrapping_sub(self.last_tap_ms);
        let relative_limit = beat_length_ms.saturating_mul(configuration.beats_until_chain_reset);
        since_last_tap < configuration.max_beat_length_ms && since_last_tap < relative_limit
    }

    pub fn reset(&mut self, ms: u32) {
        self.durations.reset();
        self.taps = 0;
        self.reset_ms = ms;
    }

    /// Register a tap, returning the newly averaged beat length.
    ///
    /// Returns `None` when the tap only started the chain and there is no
    /// duration to measure yet.
    pub fn tap(
        &mut self,
        ms: u32,
        beat_length_ms: u32,
        configuration: &Configuration,
    ) -> Option<u32> {
        if !self.is_active(ms, beat_length_ms, configuration) {
            log::debug!("Starting a new tap chain at={}", ms);
            self.reset(ms);
        }

        let duration = ms.wrapping_sub(self.last_tap_ms);
        self.last_tap_ms = ms;

        self.taps = self.taps.saturating_add(1);
        if self.taps == 1 {
            return None;
        }

        let duration = self.correct_skipped_tap(duration, beat_length_ms, configuration);
        self.durations.write(duration, configuration.total_tap_values);

        let amount = (self.taps - 1).min(configuration.total_tap_values);
        let average = self.durations.average(amount);
        Some(average.max(configuration.min_beat_length_ms))
    }

    /// Halve a duration spanning two beats, assuming the user missed one.
    ///
    /// Never corrects two taps in a row, otherwise slow, even tapping
    /// would keep being halved.
    fn correct_skipped_tap(
        &mut self,
        duration: u32,
        beat_length_ms: u32,
        configuration: &Configuration,
    ) -> u32 {
        let beat_length = beat_length_ms as f32;
        let skipped = configuration.skipped_tap_detection
            && self.taps > 2
            && !self.last_tap_was_skip_corrected
            && duration as f32 > beat_length * configuration.skipped_tap_threshold_low
            && (duration as f32) < beat_length * configuration.skipped_tap_threshold_high;

        self.last_tap_was_skip_corrected = skipped;

        if skipped {
            log::debug!("Correcting skipped tap duration={}", duration);
            duration >> 1
        } else {
            duration
        }
    }

    pub fn taps(&self) -> usize {
        self.taps
    }

    pub fn last_tap_ms(&self) -> u32 {
        self.last_tap_ms
    }

    pub fn reset_ms(&self) -> u32 {
        self.reset_ms
    }
}
