//! Turn button's state into discrete taps.

/// Use this to hold button's state between polling cycles.
///
/// Debouncing is expected to happen before the state gets here.
#[derive(Debug, Default, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Button {
    pressed: bool,
}

impl Button {
    /// Record the current state, returning whether it was a rising edge.
    pub fn update(&mut self, down: bool) -> bool {
        let was_pressed = self.pressed;
        self.pressed = down;
        !was_pressed && self.pressed
    }
}
