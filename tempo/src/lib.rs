//! Estimate tempo and phase of a beat tapped in on a button.
//!
//! It is mainly targeted to run in a firmware's control loop, polling a
//! debounced button and driving LEDs or a clock output. It does not allocate
//! and needs nothing but a millisecond counter. However, it may be useful in
//! software as well.
//!
//! ```text
//!      [ Clock ]       [ Button ]
//!          |               |
//!          +-------+-------+
//!                  | (now, down)
//!                  V
//!   [ Edge ] -> [ Chain ] -> [ Averaging ]
//!                  |              |
//!                  V              V
//!             (reset time)  (beat length)
//!                  |              |
//!                  +------+-------+
//!                         V
//!             [ Phase: progress, on beat ]
//! ```
//!
//! Usage:
//!
//! ```
//! use tap_tempo::TapTempo;
//!
//! let mut tap_tempo = TapTempo::new(|| 0_u32);
//! for ms in [0, 500, 1000, 1500] {
//!     tap_tempo.update_at(ms, true);
//!     tap_tempo.update_at(ms + 10, false);
//! }
//! assert_eq!(tap_tempo.beat_length_ms(), 500);
//! ```

#![cfg_attr(not(test), no_std)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]

#[cfg(test)]
#[macro_use]
extern crate approx;

mod beat;
mod buffer;
mod button;
mod chain;
mod clock;
mod configuration;
mod log;
mod tap_tempo;

pub use crate::clock::Clock;
pub use crate::configuration::{
    beat_length_ms_to_bpm, bpm_to_beat_length_ms, Configuration, MAX_TAP_VALUES,
};
pub use crate::tap_tempo::TapTempo;
