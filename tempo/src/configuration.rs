//! Tweaking of the estimator's behavior.

use crate::log;

/// The largest tap window the estimator can average over.
pub const MAX_TAP_VALUES: usize = 10;

const MILLISECONDS_IN_MINUTE: f32 = 60_000.0;

/// Parameters of the tempo estimation.
///
/// All the fields can be read directly. Writes should go through the setters,
/// which clamp or reject values that would break the estimator. A
/// configuration built by hand is passed through the same validation once
/// handed over to `TapTempo::with_configuration`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Configuration {
    /// Any tap arriving this long after the previous one starts a new chain.
    pub max_beat_length_ms: u32,
    /// Averaged beat length is never allowed below this.
    pub min_beat_length_ms: u32,
    /// The chain expires this many beats after the most recent tap.
    pub beats_until_chain_reset: u32,
    /// Number of most recent tap durations averaged into the beat length.
    pub total_tap_values: usize,
    pub skipped_tap_threshold_low: f32,
    pub skipped_tap_threshold_high: f32,
    pub skipped_tap_detection: bool,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            max_beat_length_ms: 2000, // 30 BPM
            min_beat_length_ms: 250,  // 240 BPM
            beats_until_chain_reset: 3,
            total_tap_values: 8,
            skipped_tap_threshold_low: 1.75,
            skipped_tap_threshold_high: 2.75,
            skipped_tap_detection: true,
        }
    }
}

impl Configuration {
    pub fn set_skipped_tap_threshold_low(&mut self, threshold: f32) {
        if threshold > 1.0 && threshold < 2.0 {
            self.skipped_tap_threshold_low = threshold;
        } else {
            log::info!("Rejected low skipped tap threshold={}", threshold);
        }
    }

    pub fn set_skipped_tap_threshold_high(&mut self, threshold: f32) {
        if threshold > 2.0 && threshold < 4.0 {
            self.skipped_tap_threshold_high = threshold;
        } else {
            log::info!("Rejected high skipped tap threshold={}", threshold);
        }
    }

    pub fn set_beats_until_chain_reset(&mut self, beats: u32) {
        self.beats_until_chain_reset = beats.max(2);
    }

    pub fn set_total_tap_values(&mut self, total: usize) {
        self.total_tap_values = total.clamp(2, MAX_TAP_VALUES);
    }

    pub fn set_max_beat_length_ms(&mut self, ms: u32) {
        self.max_beat_length_ms = ms;
    }

    pub fn set_min_beat_length_ms(&mut self, ms: u32) {
        // Zero would allow the beat length to collapse and divide by it.
        self.min_beat_length_ms = ms.max(1);
    }

    /// Highest tempo is just another way of setting the minimal beat length.
    pub fn set_max_bpm(&mut self, bpm: f32) {
        if let Some(ms) = bpm_to_beat_length_ms(bpm) {
            self.set_min_beat_length_ms(ms);
        } else {
            log::info!("Rejected max BPM={}", bpm);
        }
    }

    /// Lowest tempo is just another way of setting the maximal beat length.
    pub fn set_min_bpm(&mut self, bpm: f32) {
        if let Some(ms) = bpm_to_beat_length_ms(bpm) {
            self.set_max_beat_length_ms(ms);
        } else {
            log::info!("Rejected min BPM={}", bpm);
        }
    }

    /// Build a copy with every field forced into its allowed range.
    ///
    /// Thresholds outside of their range fall back to defaults.
    #[must_use]
    pub fn validated(self) -> Self {
        let mut validated = Self {
            max_beat_length_ms: self.max_beat_length_ms,
            skipped_tap_detection: self.skipped_tap_detection,
            ..Self::default()
        };
        validated.set_min_beat_length_ms(self.min_beat_length_ms);
        validated.set_beats_until_chain_reset(self.beats_until_chain_reset);
        validated.set_total_tap_values(self.total_tap_values);
        validated.set_skipped_tap_threshold_low(self.skipped_tap_threshold_low);
        validated.set_skipped_tap_threshold_high(self.skipped_tap_threshold_high);
        validated
    }
}

/// Convert tempo into the length of a single beat.
///
/// Returns `None` for tempos that cannot be represented by a beat of at
/// least one millisecond, i.e. zero, negative, NaN or absurdly fast ones.
/// Tempos too slow to fit saturate at `u32::MAX`.
#[must_use]
pub fn bpm_to_beat_length_ms(bpm: f32) -> Option<u32> {
    if bpm.is_nan() || bpm <= 0.0 {
        return None;
    }
    let ms = MILLISECONDS_IN_MINUTE / bpm;
    if ms < 1.0 {
        return None;
    }
    Some(ms as u32)
}

/// Convert length of a beat into tempo.
#[must_use]
pub fn beat_length_ms_to_bpm(ms: u32) -> f32 {
    MILLISECONDS_IN_MINUTE / ms as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn when_total_tap_values_is_too_low_it_gets_clamped_to_two() {
        let mut configuration = Configuration::default();
        configuration.set_total_tap_values(1);
        assert_eq!(configuration.total_tap_values, 2);
        configuration.set_total_tap_values(0);
        assert_eq!(configuration.total_tap_values, 2);
    }

    #[test]
    fn when_total_tap_values_is_too_high_it_gets_clamped_to_max() {
        let mut configuration = Configuration::default();
        configuration.set_total_tap_values(MAX_TAP_VALUES + 5);
        assert_eq!(configuration.total_tap_values, MAX_TAP_VALUES);
    }

    #[test]
    fn when_beats_until_chain_reset_is_below_two_it_gets_clamped() {
        let mut configuration = Configuration::default();
        configuration.set_beats_until_chain_reset(1);
        assert_eq!(configuration.beats_until_chain_reset, 2);
        configuration.set_beats_until_chain_reset(5);
        assert_eq!(configuration.beats_until_chain_reset, 5);
    }

    #[test]
    fn when_threshold_is_out_of_range_it_is_ignored() {
        let mut configuration = Configuration::default();

        configuration.set_skipped_tap_threshold_low(1.0);
        configuration.set_skipped_tap_threshold_low(2.0);
        configuration.set_skipped_tap_threshold_low(f32::NAN);
        assert_relative_eq!(configuration.skipped_tap_threshold_low, 1.75);

        configuration.set_skipped_tap_threshold_high(2.0);
        configuration.set_skipped_tap_threshold_high(4.5);
        assert_relative_eq!(configuration.skipped_tap_threshold_high, 2.75);
    }

    #[test]
    fn when_threshold_is_in_range_it_is_accepted() {
        let mut configuration = Configuration::default();
        configuration.set_skipped_tap_threshold_low(1.5);
        configuration.set_skipped_tap_threshold_high(3.0);
        assert_relative_eq!(configuration.skipped_tap_threshold_low, 1.5);
        assert_relative_eq!(configuration.skipped_tap_threshold_high, 3.0);
    }

    #[test]
    fn when_bpm_bounds_are_set_they_map_to_inverse_beat_lengths() {
        let mut configuration = Configuration::default();
        configuration.set_max_bpm(300.0);
        configuration.set_min_bpm(20.0);
        assert_eq!(configuration.min_beat_length_ms, 200);
        assert_eq!(configuration.max_beat_length_ms, 3000);
    }

    #[test]
    fn when_bpm_bound_is_not_positive_it_is_ignored() {
        let mut configuration = Configuration::default();
        configuration.set_max_bpm(0.0);
        configuration.set_min_bpm(-10.0);
        configuration.set_min_bpm(f32::NAN);
        assert_eq!(configuration.min_beat_length_ms, 250);
        assert_eq!(configuration.max_beat_length_ms, 2000);
    }

    #[test]
    fn when_min_beat_length_is_zero_it_gets_clamped_to_one() {
        let mut configuration = Configuration::default();
        configuration.set_min_beat_length_ms(0);
        assert_eq!(configuration.min_beat_length_ms, 1);
    }

    #[test]
    fn when_configuration_is_validated_it_keeps_valid_fields_and_fixes_invalid() {
        let configuration = Configuration {
            max_beat_length_ms: 4000,
            min_beat_length_ms: 0,
            beats_until_chain_reset: 0,
            total_tap_values: 100,
            skipped_tap_threshold_low: 1.5,
            skipped_tap_threshold_high: 5.0,
            skipped_tap_detection: false,
        }
        .validated();
        assert_eq!(configuration.max_beat_length_ms, 4000);
        assert_eq!(configuration.min_beat_length_ms, 1);
        assert_eq!(configuration.beats_until_chain_reset, 2);
        assert_eq!(configuration.total_tap_values, MAX_TAP_VALUES);
        assert_relative_eq!(configuration.skipped_tap_threshold_low, 1.5);
        assert_relative_eq!(configuration.skipped_tap_threshold_high, 2.75);
        assert!(!configuration.skipped_tap_detection);
    }

    #[test]
    fn convert_between_bpm_and_beat_length() {
        assert_eq!(bpm_to_beat_length_ms(120.0), Some(500));
        assert_eq!(bpm_to_beat_length_ms(0.0), None);
        assert_eq!(bpm_to_beat_length_ms(f32::INFINITY), None);
        assert_eq!(bpm_to_beat_length_ms(0.000_001), Some(u32::MAX));
        assert_relative_eq!(beat_length_ms_to_bpm(500), 120.0);
    }
}
