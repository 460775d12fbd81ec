//! One-pole lowpass filter, used both on audio and on control signals.
//!
//! A single-pole IIR lowpass with the difference equation:
//!
//! ```text
//! z1 = x·a0 + z1·b1
//! ```
//!
//! where `b1 = exp(-2π · freq / sample_rate)` and `a0 = 1 - b1`.
//!
//! 6 dB/octave rolloff, zero latency, two multiplies per sample. The
//! linear-lag parameter smoother ([`SmoothedParam`](crate::SmoothedParam))
//! is this filter fed with a stepwise target.
//!
//! # Usage
//!
//! ```rust
//! use attila_core::OnePole;
//!
//! let mut lp = OnePole::new(48000.0, 4000.0);
//! let filtered = lp.process(1.0);
//! assert!(filtered < 1.0);
//! ```
//!
//! # Reference
//!
//! Julius O. Smith III, "Introduction to Digital Filters with Audio Applications",
//! Section: One-Pole Filter.

use crate::flush_denormal;
use libm::expf;

/// One-pole (6 dB/oct) lowpass filter.
///
/// # Invariants
///
/// - `b1` is in `(0, 1]` for any `freq_hz >= 0`, so the filter is stable
/// - `freq_hz == 0` gives `b1 = 1, a0 = 0`: the output is frozen
/// - `z1` is flushed to zero when below 1e-20 (denormal protection)
#[derive(Debug, Clone)]
pub struct OnePole {
    z1: f32,
    a0: f32,
    b1: f32,
    sample_rate: f32,
    freq: f32,
}

impl OnePole {
    /// Create a new one-pole lowpass filter.
    ///
    /// # Arguments
    ///
    /// * `sample_rate` - Sample rate in Hz
    /// * `freq_hz` - Cutoff frequency in Hz (0 to sample_rate/2)
    pub fn new(sample_rate: f32, freq_hz: f32) -> Self {
        let mut filter = Self {
            z1: 0.0,
            a0: 1.0,
            b1: 0.0,
            sample_rate,
            freq: freq_hz,
        };
        filter.recalculate_coeff();
        filter
    }

    /// Set the cutoff frequency and recalculate the coefficients.
    pub fn set_frequency(&mut self, freq_hz: f32) {
        self.freq = freq_hz;
        self.recalculate_coeff();
    }

    /// Current cutoff frequency in Hz.
    pub fn frequency(&self) -> f32 {
        self.freq
    }

    /// Process one sample through the lowpass filter.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        self.z1 = flush_denormal(input * self.a0 + self.z1 * self.b1);
        self.z1
    }

    /// Last output without advancing.
    #[inline]
    pub fn state(&self) -> f32 {
        self.z1
    }

    /// Overwrite the filter memory, e.g. to start settled at a value.
    pub fn set_state(&mut self, value: f32) {
        self.z1 = value;
    }

    /// Reset filter state to zero.
    pub fn reset(&mut self) {
        self.z1 = 0.0;
    }

    /// Update sample rate and recalculate the coefficients.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.recalculate_coeff();
    }

    /// `b1 = exp(-2π · freq / sample_rate)`, `a0 = 1 - b1`.
    ///
    /// Higher freq → lower `b1` → less filtering. Inputs at or above the
    /// sample rate still give a finite `b1` close to zero.
    fn recalculate_coeff(&mut self) {
        if self.sample_rate <= 0.0 {
            return;
        }
        self.b1 = expf(-core::f32::consts::TAU * self.freq / self.sample_rate);
        self.a0 = 1.0 - self.b1;
    }
}
