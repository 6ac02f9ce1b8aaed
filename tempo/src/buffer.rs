//! Window of the most recent tap durations.

/// Fixed-capacity circular buffer averaging the durations it holds.
///
/// The capacity `N` is the upper bound, the window actually cycled through
/// is passed on each write, so it can be changed at runtime without
/// moving any memory around.
#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub(crate) struct Buffer<const N: usize> {
    buffer: [u32; N],
    pointer: usize,
    filled: usize,
}

impl<const N: usize> Default for Buffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> Buffer<N> {
    pub fn new() -> Self {
        Self {
            buffer: [0; N],
            pointer: 0,
            filled: 0,
        }
    }

    /// Store the value, overwriting the oldest one once `window` is full.
    pub fn write(&mut self, value: u32, window: usize) {
        let window = window.clamp(1, N);
        if self.pointer >= window {
            self.pointer = 0;
        }
        self.buffer[self.pointer] = value;
        self.pointer += 1;
        self.filled = self.filled.max(self.pointer);
        if self.pointer == window {
            self.pointer = 0;
        }
    }

    /// Mean of the first `amount` slots.
    ///
    /// Slots never written since the last reset are not counted. The amount
    /// is forced into `1..=N`, so this never divides by zero.
    pub fn average(&self, amount: usize) -> u32 {
        let amount = amount.min(self.filled).clamp(1, N);
        let sum: u64 = self.buffer[..amount].iter().map(|x| u64::from(*x)).sum();
        (sum / amount as u64) as u32
    }

    pub fn reset(&mut self) {
        self.buffer = [0; N];
        self.pointer = 0;
        self.filled = 0;
    }
}
