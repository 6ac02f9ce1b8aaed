//! Source of monotonic time.

/// Monotonic millisecond counter.
///
/// The counter is expected to roll over once it reaches `u32::MAX`. All the
/// arithmetic done on its values is wrapping, so the rollover is harmless.
pub trait Clock {
    fn now(&self) -> u32;
}

impl<F> Clock for F
where
    F: Fn() -> u32,
{
    fn now(&self) -> u32 {
        self()
    }
}
