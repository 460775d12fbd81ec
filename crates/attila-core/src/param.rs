//! Parameter smoothing for zipper-free, click-free automation.
//!
//! Audio parameters (gain, drive, crossover frequency, ...) arrive as
//! stepwise control values at block rate. Applying them directly produces
//! zipper noise and clicks, so every control value is passed through a
//! smoother that produces a continuous per-sample trajectory.
//!
//! ## Smoothing Methods
//!
//! - [`SmoothedParam`]: **linear lag**. A [`OnePole`] lowpass fed with the
//!   target. Exponential approach, never overshoots. Used for drive, knee,
//!   mix, gains and crossover cutoffs.
//! - [`LogSmoothedParam`]: **logarithmic ramp**. Geometric (linear-in-dB)
//!   ramp of fixed length, with separate attack and release times. Used for
//!   band enables and the global bypass crossfade, where a 0 ↔ 1 toggle must
//!   not jump.
//!
//! ## Threading
//!
//! Targets are written at control rate (`set_target`, `set_value`) and read
//! per sample (`advance`). Both happen on the audio thread in this crate;
//! the host-facing processor hands control values over through atomics.
//!
//! ## Usage
//!
//! ```rust
//! use attila_core::SmoothedParam;
//!
//! let mut gain = SmoothedParam::with_config(1.0, 48000.0, 10.0);
//! gain.set_target(0.5);
//!
//! for _ in 0..480 {
//!     let smoothed_gain = gain.advance();
//!     assert!(smoothed_gain <= 1.0 && smoothed_gain >= 0.5);
//! }
//! ```

use crate::math::{SILENCE, ms_to_samples};
use crate::one_pole::OnePole;
use libm::{powf, roundf};

/// Default smoothing time constant for control parameters, in milliseconds.
pub const DEFAULT_SMOOTHING_MS: f32 = 20.0;

/// Default attack time for [`LogSmoothedParam`] ramps, in milliseconds.
pub const DEFAULT_ATTACK_MS: f32 = 20.0;

/// Default release time for [`LogSmoothedParam`] ramps, in milliseconds.
pub const DEFAULT_RELEASE_MS: f32 = 20.0;

/// A parameter with one-pole (linear lag) smoothing.
///
/// The smoothed value is a [`OnePole`] lowpass of the target:
/// `z1 = target·a0 + z1·b1` with `b1 = exp(-2π·fc/fs)`. The cutoff is set
/// either directly ([`set_cutoff_hz`](Self::set_cutoff_hz)) or from a time
/// constant ([`set_smoothing_time_ms`](Self::set_smoothing_time_ms), where
/// `fc = 1 / (2π·τ)`).
///
/// # Invariants
///
/// - Monotonic approach toward the target, no overshoot
/// - A smoothing time of zero means instant changes
#[derive(Debug, Clone)]
pub struct SmoothedParam {
    filter: OnePole,
    target: f32,
    smoothing_time_ms: f32,
}

impl SmoothedParam {
    /// Create a new smoothed parameter with an initial value.
    ///
    /// Smoothing is disabled (instant changes) until a smoothing time is set.
    pub fn new(initial: f32) -> Self {
        Self::with_config(initial, 44100.0, 0.0)
    }

    /// Create a smoothed parameter with full configuration.
    ///
    /// # Arguments
    /// * `initial` - Initial value; the smoother starts settled on it
    /// * `sample_rate` - Sample rate in Hz
    /// * `smoothing_time_ms` - Time constant in milliseconds
    pub fn with_config(initial: f32, sample_rate: f32, smoothing_time_ms: f32) -> Self {
        let mut filter = OnePole::new(sample_rate, cutoff_for_time_ms(smoothing_time_ms));
        filter.set_state(initial);
        Self {
            filter,
            target: initial,
            smoothing_time_ms,
        }
    }

    /// Smoothed parameter with the default time constant
    /// ([`DEFAULT_SMOOTHING_MS`]).
    pub fn standard(initial: f32, sample_rate: f32) -> Self {
        Self::with_config(initial, sample_rate, DEFAULT_SMOOTHING_MS)
    }

    /// Set the target value. The output approaches it over the smoothing time.
    #[inline]
    pub fn set_target(&mut self, target: f32) {
        self.target = target;
    }

    /// Set target and snap the output to it.
    #[inline]
    pub fn set_immediate(&mut self, value: f32) {
        self.target = value;
        self.filter.set_state(value);
    }

    /// Update the sample rate, keeping the smoothing time.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.filter.set_sample_rate(sample_rate);
    }

    /// Set the smoothing time constant in milliseconds. Zero disables smoothing.
    pub fn set_smoothing_time_ms(&mut self, time_ms: f32) {
        self.smoothing_time_ms = time_ms;
        self.filter.set_frequency(cutoff_for_time_ms(time_ms));
    }

    /// Smoothing time constant in milliseconds.
    pub fn smoothing_time_ms(&self) -> f32 {
        self.smoothing_time_ms
    }

    /// Set the smoother's lowpass cutoff directly, in Hz.
    ///
    /// Zero freezes the output at its current value.
    pub fn set_cutoff_hz(&mut self, freq_hz: f32) {
        self.filter.set_frequency(freq_hz);
    }

    /// Advance one sample and return the smoothed value.
    #[inline]
    pub fn advance(&mut self) -> f32 {
        self.filter.process(self.target)
    }

    /// Current smoothed value without advancing.
    #[inline]
    pub fn get(&self) -> f32 {
        self.filter.state()
    }

    /// Target value.
    #[inline]
    pub fn target(&self) -> f32 {
        self.target
    }

    /// Whether the output is within 1e-6 of the target.
    #[inline]
    pub fn is_settled(&self) -> bool {
        (self.filter.state() - self.target).abs() < 1e-6
    }

    /// Jump to the target immediately.
    #[inline]
    pub fn snap_to_target(&mut self) {
        self.filter.set_state(self.target);
    }
}

impl Default for SmoothedParam {
    fn default() -> Self {
        Self::new(0.0)
    }
}

/// Lowpass cutoff equivalent to a one-pole time constant.
fn cutoff_for_time_ms(time_ms: f32) -> f32 {
    if time_ms <= 0.0 {
        // b1 = exp(-inf) = 0: output follows the input immediately
        f32::INFINITY
    } else {
        1000.0 / (core::f32::consts::TAU * time_ms)
    }
}

/// A gain with logarithmic (geometric) ramps.
///
/// On [`set_value`](Self::set_value) the ramp length is chosen from the
/// attack time when rising and from the release time when falling, and a
/// per-sample multiplier is computed so that the internal gain reaches the
/// target in exactly that many samples:
///
/// ```text
/// target     = value + SILENCE
/// samples    = sample_rate · ms · 0.001
/// multiplier = (target / current)^(1 / samples)
/// ```
///
/// Each [`advance`](Self::advance) multiplies by `multiplier` and clamps to
/// the target once it has been reached or crossed in the direction of travel.
/// Linear-in-dB ramps avoid the perceptual jump of linear-in-amplitude fades.
///
/// The reported value is the internal gain minus [`SILENCE`]; once settled
/// it is exactly the value passed to `set_value`, so a ramp to 0 ends in true
/// silence and a ramp to 1 ends in exact unity.
///
/// Values must be non-negative.
#[derive(Debug, Clone)]
pub struct LogSmoothedParam {
    current: f32,
    target: f32,
    value: f32,
    multiplier: f32,
    remaining: u32,
    sample_rate: f32,
    attack_ms: f32,
    release_ms: f32,
}

impl LogSmoothedParam {
    /// Create a settled smoother at `initial` with default attack/release.
    pub fn new(initial: f32) -> Self {
        Self::with_config(initial, 44100.0, DEFAULT_ATTACK_MS, DEFAULT_RELEASE_MS)
    }

    /// Create with full configuration.
    pub fn with_config(initial: f32, sample_rate: f32, attack_ms: f32, release_ms: f32) -> Self {
        Self {
            current: initial + SILENCE,
            target: initial + SILENCE,
            value: initial,
            multiplier: 1.0,
            remaining: 0,
            sample_rate,
            attack_ms,
            release_ms,
        }
    }

    /// Update the sample rate. Takes effect on the next `set_value`.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
    }

    /// Start a ramp toward `value`.
    ///
    /// Repeating the current target is a no-op, so an ongoing ramp keeps its
    /// original end time.
    pub fn set_value(&mut self, value: f32) {
        if value == self.value {
            return;
        }
        self.value = value;
        self.target = value + SILENCE;

        let time_ms = if self.target > self.current {
            self.attack_ms
        } else {
            self.release_ms
        };
        let samples = roundf(ms_to_samples(time_ms, self.sample_rate)).max(1.0);

        self.multiplier = powf(self.target / self.current, 1.0 / samples);
        self.remaining = samples as u32;
    }

    /// Snap to `value` without ramping.
    pub fn set_immediate(&mut self, value: f32) {
        self.value = value;
        self.target = value + SILENCE;
        self.current = self.target;
        self.multiplier = 1.0;
        self.remaining = 0;
    }

    /// Advance one sample and return the gain.
    #[inline]
    pub fn advance(&mut self) -> f32 {
        if self.remaining == 0 {
            return self.value;
        }

        self.current *= self.multiplier;
        self.remaining -= 1;

        let rising = self.multiplier > 1.0;
        let crossed = if rising {
            self.current >= self.target
        } else {
            self.current <= self.target
        };

        if crossed || self.remaining == 0 {
            self.current = self.target;
            self.remaining = 0;
            return self.value;
        }
        self.current - SILENCE
    }

    /// Current gain without advancing.
    #[inline]
    pub fn get(&self) -> f32 {
        if self.remaining == 0 {
            self.value
        } else {
            self.current - SILENCE
        }
    }

    /// Target value as passed to `set_value`.
    #[inline]
    pub fn target(&self) -> f32 {
        self.value
    }

    /// Whether the ramp has finished.
    #[inline]
    pub fn is_settled(&self) -> bool {
        self.remaining == 0
    }
}

impl Default for LogSmoothedParam {
    fn default() -> Self {
        Self::new(0.0)
    }
}
