//! Mathematical utility functions for DSP.
//!
//! Allocation-free helpers shared by the smoothers, the nonlinear stage and
//! the multiband orchestrator. All functions are `no_std` friendly and use
//! `libm` for transcendental math.
//!
//! # Level Conversions
//!
//! - [`db_to_linear`] / [`linear_to_db`] - Convert between dB and linear gain
//!
//! # Utilities
//!
//! - [`fast_atan`] - Rational arctangent approximation used by the knee clipper
//! - [`sign`] - Sign function that maps zero to `+1`
//! - [`flush_denormal`] - Subnormal protection for recursive state
//! - [`ms_to_samples`] - Time conversion

use libm::{expf, logf};

/// Silence floor added to gain targets before taking logarithms.
///
/// Equivalent to −120 dBFS. Keeps ratios such as `target / current` finite
/// when a gain ramps to or from zero.
pub const SILENCE: f32 = 1e-6;

/// Convert decibels to linear gain.
///
/// `linear = 10^(dB/20)`.
///
/// # Example
/// ```rust
/// use attila_core::db_to_linear;
///
/// assert!((db_to_linear(0.0) - 1.0).abs() < 0.001);
/// assert!((db_to_linear(-6.02) - 0.5).abs() < 0.01);
/// ```
#[inline]
pub fn db_to_linear(db: f32) -> f32 {
    // 10^(dB/20) = e^(dB * ln(10)/20)
    const FACTOR: f32 = core::f32::consts::LN_10 / 20.0;
    expf(db * FACTOR)
}

/// Convert linear gain to decibels.
///
/// The magnitude is offset by [`SILENCE`] so that zero maps to −120 dB
/// instead of negative infinity.
///
/// # Example
/// ```rust
/// use attila_core::linear_to_db;
///
/// assert!(linear_to_db(1.0).abs() < 0.001);
/// assert!((linear_to_db(0.5) - (-6.02)).abs() < 0.01);
/// ```
#[inline]
pub fn linear_to_db(linear: f32) -> f32 {
    const FACTOR: f32 = 20.0 / core::f32::consts::LN_10;
    logf(linear.abs() + SILENCE) * FACTOR
}

/// Fast rational approximation of `atan(x)` for `x >= 0`.
///
/// `atan(x) ≈ x / (1 + 0.28·x²)`. Accurate to ~0.005 rad on `[0, 1]`; for
/// large `x` the curve falls back toward zero instead of approaching π/2,
/// which is what gives the variable-hardness clipper its characteristic
/// fold above the knee.
///
/// Reference: musicdsp.org #104, "Variable-hardness clipping function".
#[inline]
pub fn fast_atan(x: f32) -> f32 {
    x / (1.0 + 0.28 * (x * x))
}

/// Sign of `x`, with zero treated as positive.
///
/// Unlike [`f32::signum`], `-0.0` yields `1.0`.
#[inline]
pub fn sign(x: f32) -> f32 {
    if x < 0.0 { -1.0 } else { 1.0 }
}

/// Convert milliseconds to samples.
#[inline]
pub fn ms_to_samples(ms: f32, sample_rate: f32) -> f32 {
    sample_rate * ms * 0.001
}

/// Flush subnormal (denormalized) floats to zero.
///
/// Subnormal floats cause severe slowdowns on most FPUs. Values below 1e-20
/// are replaced with zero, leaving a wide margin above the IEEE 754
/// subnormal range.
///
/// Use this on recursive state (filter integrators, smoother memories) where
/// the signal can decay indefinitely toward zero.
#[allow(clippy::inline_always)]
#[inline(always)]
pub fn flush_denormal(x: f32) -> f32 {
    if x.abs() < 1e-20 { 0.0 } else { x }
}

/// Crossfade between dry and wet signals: `dry * (1 - mix) + wet * mix`.
///
/// Exact at the endpoints: `mix == 1` returns `wet` and `mix == 0` returns
/// `dry` bit for bit.
#[inline]
pub fn wet_dry_mix(dry: f32, wet: f32, mix: f32) -> f32 {
    dry * (1.0 - mix) + wet * mix
}
