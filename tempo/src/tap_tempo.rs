//! Estimate tempo and phase from taps on a button.

use core::fmt;

use crate::beat::Phase;
use crate::button::Button;
use crate::chain::Chain;
use crate::clock::Clock;
use crate::configuration::{self, Configuration};
use crate::log;

const DEFAULT_BEAT_LENGTH_MS: u32 = 500; // 120 BPM

/// The tap tempo estimator.
///
/// Call `update` from the polling loop with the debounced state of the
/// button. Read `bpm`, `beat_progress` or `on_beat` whenever the output
/// needs to be rendered. None of the queries have side effects.
///
/// Single tap re-anchors the phase of the beat to its time. Multiple taps in
/// a row refine the tempo, averaging their intervals. An interval of roughly
/// two beats is treated as a missed tap and halved.
pub struct TapTempo<C> {
    clock: C,
    configuration: Configuration,
    button: Button,
    chain: Chain,
    phase: Phase,
    beat_length_ms: u32,
}

impl<C> fmt::Debug for TapTempo<C> {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.debug_struct("TapTempo")
            .field("configuration", &self.configuration)
            .field("button", &self.button)
            .field("chain", &self.chain)
            .field("phase", &self.phase)
            .field("beat_length_ms", &self.beat_length_ms)
            .finish()
    }
}

#[cfg(feature = "defmt")]
impl<C> defmt::Format for TapTempo<C> {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(
            fmt,
            "TapTempo(beat_length_ms: {}, chain: {}, phase: {})",
            self.beat_length_ms,
            self.chain,
            self.phase,
        );
    }
}

impl<C: Clock> TapTempo<C> {
    pub fn new(clock: C) -> Self {
        Self::with_configuration(clock, Configuration::default())
    }

    pub fn with_configuration(clock: C, configuration: Configuration) -> Self {
        let configuration = configuration.validated();
        let chain = Chain::new(clock.now());
        Self {
            clock,
            beat_length_ms: DEFAULT_BEAT_LENGTH_MS.max(configuration.min_beat_length_ms),
            configuration,
            button: Button::default(),
            chain,
            phase: Phase::default(),
        }
    }

    /// Pass the current state of the button, to be called on every cycle.
    pub fn update(&mut self, button_down: bool) {
        let now = self.clock.now();
        self.update_at(now, button_down);
    }

    #[must_use]
    pub fn is_chain_active(&self) -> bool {
        self.is_chain_active_at(self.clock.now())
    }

    /// Reset the chain and start the beat right now.
    pub fn reset_tap_chain(&mut self) {
        let now = self.clock.now();
        self.reset_tap_chain_at(now);
    }
}

impl<C> TapTempo<C> {
    /// Same as `update`, with time sampled by the caller.
    pub fn update_at(&mut self, ms: u32, button_down: bool) {
        if self.button.update(button_down) {
            self.tap_at(ms);
        }
        self.phase.roll(ms, self.chain.reset_ms());
    }

    /// Register a tap directly, bypassing the edge detection.
    pub fn tap_at(&mut self, ms: u32) {
        if let Some(beat_length_ms) = self.chain.tap(ms, self.beat_length_ms, &self.configuration) {
            log::debug!("Beat length updated to={}", beat_length_ms);
            self.beat_length_ms = beat_length_ms;
        }
    }

    #[must_use]
    pub fn is_chain_active_at(&self, ms: u32) -> bool {
        self.chain.is_active(ms, self.beat_length_ms, &self.configuration)
    }

    pub fn reset_tap_chain_at(&mut self, ms: u32) {
        log::debug!("Forced tap chain reset at={}", ms);
        self.chain.reset(ms);
    }

    #[must_use]
    pub fn bpm(&self) -> f32 {
        configuration::beat_length_ms_to_bpm(self.beat_length_ms)
    }

    /// Override the tempo, bypassing the averaging.
    ///
    /// Tempos that are not positive are ignored. The resulting beat length
    /// still respects the configured minimum.
    pub fn set_bpm(&mut self, bpm: f32) {
        if let Some(beat_length_ms) = configuration::bpm_to_beat_length_ms(bpm) {
            self.beat_length_ms = beat_length_ms.max(self.configuration.min_beat_length_ms);
        } else {
            log::info!("Rejected BPM={}", bpm);
        }
    }

    /// Fraction of the current beat, in `[0.0, 1.0)`.
    ///
    /// Beats are counted from the last chain reset, not from the last tap.
    #[must_use]
    pub fn beat_progress(&self) -> f32 {
        self.phase.progress(self.beat_length_ms)
    }

    /// Whether a beat started since the previous `update`.
    ///
    /// This is good enough for LEDs, not for audio timing. It may fire twice
    /// shortly after each other when a tap resets the phase right after a
    /// beat.
    #[must_use]
    pub fn on_beat(&self) -> bool {
        self.phase.crossed_beat(self.beat_length_ms)
    }

    #[must_use]
    pub fn beat_length_ms(&self) -> u32 {
        self.beat_length_ms
    }

    #[must_use]
    pub fn last_tap_time_ms(&self) -> u32 {
        self.chain.last_tap_ms()
    }

    #[must_use]
    pub fn taps_in_chain(&self) -> usize {
        self.chain.taps()
    }

    #[must_use]
    pub fn configuration(&self) -> Configuration {
        self.configuration
    }

    pub fn enable_skipped_tap_detection(&mut self) {
        self.configuration.skipped_tap_detection = true;
    }

    pub fn disable_skipped_tap_detection(&mut self) {
        self.configuration.skipped_tap_detection = false;
    }

    #[must_use]
    pub fn is_skipped_tap_detection_enabled(&self) -> bool {
        self.configuration.skipped_tap_detection
    }

    /// Accepts values from the open range `(1.0, 2.0)`, ignores the rest.
    pub fn set_skipped_tap_threshold_low(&mut self, threshold: f32) {
        self.configuration.set_skipped_tap_threshold_low(threshold);
    }

    /// Accepts values from the open range `(2.0, 4.0)`, ignores the rest.
    pub fn set_skipped_tap_threshold_high(&mut self, threshold: f32) {
        self.configuration.set_skipped_tap_threshold_high(threshold);
    }

    pub fn set_beats_until_chain_reset(&mut self, beats: u32) {
        self.configuration.set_beats_until_chain_reset(beats);
    }

    /// Larger window is more precise, but slower to follow tempo changes.
    pub fn set_total_tap_values(&mut self, total: usize) {
        self.configuration.set_total_tap_values(total);
    }

    pub fn set_max_beat_length_ms(&mut self, ms: u32) {
        self.configuration.set_max_beat_length_ms(ms);
    }

    pub fn set_min_beat_length_ms(&mut self, ms: u32) {
        self.configuration.set_min_beat_length_ms(ms);
        self.enforce_min_beat_length();
    }

    pub fn set_max_bpm(&mut self, bpm: f32) {
        self.configuration.set_max_bpm(bpm);
        self.enforce_min_beat_length();
    }

    pub fn set_min_bpm(&mut self, bpm: f32) {
        self.configuration.set_min_bpm(bpm);
    }

    fn enforce_min_beat_length(&mut self) {
        self.beat_length_ms = self.beat_length_ms.max(self.configuration.min_beat_length_ms);
    }
}
