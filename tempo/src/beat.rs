//! Position within the current beat.

/// Time elapsed since the chain was reset, sampled once per polling cycle.
///
/// Both the current and the previous sample are kept, so it is possible to
/// tell whether a beat boundary was crossed in between.
#[derive(Debug, Default, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub(crate) struct Phase {
    elapsed_ms: u32,
    previous_elapsed_ms: u32,
}

impl Phase {
    pub fn roll(&mut self, now_ms: u32, reset_ms: u32) {
        self.previous_elapsed_ms = self.elapsed_ms;
        self.elapsed_ms = now_ms.wrapping_sub(reset_ms);
    }

    /// Fraction of the current beat that already passed, in `[0.0, 1.0)`.
    pub fn progress(&self, beat_length_ms: u32) -> f32 {
        let beat_length_ms = beat_length_ms.max(1);
        let within_beat = self.elapsed_ms % beat_length_ms;
        let progress = within_beat as f32 / beat_length_ms as f32;
        // Rounding of very long beats may reach the boundary.
        if progress < 1.0 {
            progress
        } else {
            0.0
        }
    }

    /// Whether a beat boundary was crossed between the last two samples.
    pub fn crossed_beat(&self, beat_length_ms: u32) -> bool {
        let beat_length_ms = beat_length_ms.max(1);
        self.elapsed_ms % beat_length_ms < self.previous_elapsed_ms % beat_length_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn when_half_of_beat_passed_progress_is_half() {
        let mut phase = Phase::default();
        phase.roll(1250, 1000);
        assert_relative_eq!(phase.progress(500), 0.5);
    }

    #[test]
    fn when_many_beats_passed_progress_wraps() {
        let mut phase = Phase::default();
        phase.roll(1000 + 500 * 7 + 125, 1000);
        assert_relative_eq!(phase.progress(500), 0.25);
    }

    #[test]
    fn when_beat_is_extremely_long_progress_stays_below_one() {
        let mut phase = Phase::default();
        phase.roll(u32::MAX - 1, 0);
        let progress = phase.progress(u32::MAX);
        assert!((0.0..1.0).contains(&progress));
    }

    #[test]
    fn when_beat_length_is_zero_it_does_not_panic() {
        let mut phase = Phase::default();
        phase.roll(100, 0);
        assert_relative_eq!(phase.progress(0), 0.0);
        assert!(!phase.crossed_beat(0));
    }

    #[test]
    fn when_sample_passes_boundary_it_crosses_beat() {
        let mut phase = Phase::default();
        phase.roll(490, 0);
        phase.roll(495, 0);
        assert!(!phase.crossed_beat(500));
        phase.roll(505, 0);
        assert!(phase.crossed_beat(500));
        phase.roll(510, 0);
        assert!(!phase.crossed_beat(500));
    }

    #[test]
    fn when_clock_rolls_over_elapsed_time_is_continuous() {
        let mut phase = Phase::default();
        let reset = u32::MAX - 99;
        phase.roll(reset.wrapping_add(90), reset);
        phase.roll(reset.wrapping_add(110), reset);
        assert!(phase.crossed_beat(100));
        assert_relative_eq!(phase.progress(100), 0.1);
    }
}
