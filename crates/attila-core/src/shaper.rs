//! Nonlinear stage: stateless per-sample transfer functions.
//!
//! Different curves produce different harmonic characters:
//!
//! | Curve | Function | Character |
//! |-------|----------|-----------|
//! | [`Curve::SoftKnee`] | [`soft_clip_knee`] | Variable hardness, odd harmonics |
//! | [`Curve::Hard`] | [`hard_clip`] | Flat tops, harsh |
//! | [`Curve::Tanh`] | [`tanh_clip`] | Smooth tube-like saturation |
//! | [`Curve::Sigmoid`] | [`sigmoid_clip`] | Logistic, slightly softer than tanh |
//! | [`Curve::Fuzz`] | [`exp_fuzz`] | Exponential, fast onset |
//! | [`Curve::Fold`] | [`sine_fold`] | Sinusoidal wavefolding |
//!
//! After shaping, [`bitcrush`] (or [`bitcrush_shaped`]) reduces amplitude
//! resolution and [`limit`] clamps the result into a safe range. None of the
//! curves guarantee a bounded output on their own; the limiter does.
//!
//! # Contract
//!
//! `knee > 0` and `bits >= 1` are the caller's responsibility. Violations do
//! not panic but produce `NaN`/`inf` samples.

use libm::{expf, fabsf, powf, sinf, tanhf, trunc, round};

use crate::math::{fast_atan, sign};

/// Default angular scale for [`sine_fold`]: maps `[-1, 1]` onto a quarter sine.
pub const DEFAULT_FOLD_FREQUENCY: f32 = core::f32::consts::FRAC_PI_2;

/// Output range of the final limiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LimitRange {
    /// `[-1, 1]`, used inside the multiband chain.
    #[default]
    Unit,
    /// `[-4, 4]`, used by the single-band effect, which leaves headroom for
    /// an oversampling stage downstream.
    Wide,
}

impl LimitRange {
    /// Absolute ceiling of the range.
    #[inline]
    pub fn ceiling(self) -> f32 {
        match self {
            Self::Unit => 1.0,
            Self::Wide => 4.0,
        }
    }
}

/// Transfer function selection for a distortion band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Curve {
    /// Variable-hardness soft clip, controlled by knee.
    #[default]
    SoftKnee,
    /// Hard clip to ±1.
    Hard,
    /// Hyperbolic tangent.
    Tanh,
    /// Logistic sigmoid rescaled to ±1.
    Sigmoid,
    /// Asymmetric-onset exponential fuzz.
    Fuzz,
    /// Sinusoidal foldover.
    Fold,
}

impl Curve {
    /// All curves, in choice-parameter order.
    pub const ALL: [Curve; 6] = [
        Curve::SoftKnee,
        Curve::Hard,
        Curve::Tanh,
        Curve::Sigmoid,
        Curve::Fuzz,
        Curve::Fold,
    ];

    /// Curve for a choice index; out-of-range indices fall back to the default.
    pub fn from_index(index: usize) -> Self {
        Self::ALL.get(index).copied().unwrap_or_default()
    }

    /// Display label.
    pub fn label(self) -> &'static str {
        match self {
            Self::SoftKnee => "Soft",
            Self::Hard => "Hard",
            Self::Tanh => "Tanh",
            Self::Sigmoid => "Sigmoid",
            Self::Fuzz => "Fuzz",
            Self::Fold => "Fold",
        }
    }

    /// Apply the curve to `x` with a linear `drive` pre-gain.
    ///
    /// `knee` is only read by [`Curve::SoftKnee`].
    #[inline]
    pub fn apply(self, x: f32, drive: f32, knee: f32) -> f32 {
        match self {
            Self::SoftKnee => soft_clip_knee(x, drive, knee),
            Self::Hard => hard_clip(x * drive),
            Self::Tanh => tanh_clip(x, drive),
            Self::Sigmoid => sigmoid_clip(x, drive),
            Self::Fuzz => exp_fuzz(x, drive),
            Self::Fold => sine_fold(x, drive, DEFAULT_FOLD_FREQUENCY),
        }
    }
}

/// Soft clip with variable knee.
///
/// ```text
/// y = sign(x·drive) · atan_approx(|x·drive|^knee)^(1/knee)
/// ```
///
/// `knee` near 1 gives gentle saturation; larger values sharpen the
/// transition toward hard clipping. The rational arctangent peaks at ~0.945,
/// so the output never leaves `[-1, 1]` for finite input.
///
/// Reference: musicdsp.org #104, "Variable-hardness clipping function".
#[inline]
pub fn soft_clip_knee(x: f32, drive: f32, knee: f32) -> f32 {
    let input = x * drive;
    let v = powf(fabsf(input), knee);
    // fast_atan tends to zero for large v, but inf/inf would be NaN
    let bent = if v.is_finite() { fast_atan(v) } else { 0.0 };
    sign(input) * powf(bent, 1.0 / knee)
}

/// Hard clip to ±1.
#[inline]
pub fn hard_clip(x: f32) -> f32 {
    x.clamp(-1.0, 1.0)
}

/// `tanh(drive·x)`.
#[inline]
pub fn tanh_clip(x: f32, drive: f32) -> f32 {
    tanhf(drive * x)
}

/// Logistic sigmoid rescaled to `(-1, 1)`: `2 / (1 + e^(−drive·x)) − 1`.
#[inline]
pub fn sigmoid_clip(x: f32, drive: f32) -> f32 {
    2.0 / (1.0 + expf(-drive * x)) - 1.0
}

/// Exponential fuzz normalized so that `|x| = 1` maps to `±1`.
///
/// ```text
/// y = sign(x) · (1 − e^(−|drive·x|)) / (1 − e^(−drive))
/// ```
///
/// As `drive → 0` the curve tends to the identity; drives at or below zero
/// return the input unchanged instead of dividing by zero.
#[inline]
pub fn exp_fuzz(x: f32, drive: f32) -> f32 {
    if drive <= 1e-6 {
        return x;
    }
    sign(x) * (1.0 - expf(-fabsf(drive * x))) / (1.0 - expf(-drive))
}

/// Sinusoidal foldover: `sin(drive·x·fold_frequency)`.
#[inline]
pub fn sine_fold(x: f32, drive: f32, fold_frequency: f32) -> f32 {
    sinf(drive * x * fold_frequency)
}

/// Quantization step for a bit depth: `2 / (2^bits − 1)`.
#[inline]
pub fn quantization_step(bits: u32) -> f64 {
    2.0 / (libm::pow(2.0, f64::from(bits)) - 1.0)
}

/// Bit-depth reduction by truncation toward zero.
///
/// ```text
/// QL = 2 / (2^bits − 1)
/// y  = QL · trunc(x / QL)
/// ```
///
/// Truncation (not rounding) is intentional: it biases small signals toward
/// zero and is part of the lo-fi character. Values that already sit on a
/// step, up to `f32` rounding, are kept on that step, so quantizing twice
/// gives the same result as quantizing once.
#[inline]
pub fn bitcrush(x: f32, bits: u32) -> f32 {
    let step = quantization_step(bits);
    let ratio = f64::from(x) / step;
    let nearest = round(ratio);
    // Grid points survive the f32 round trip with at most 2^-24 relative error
    let levels = if (ratio - nearest).abs() <= nearest.abs() * f64::from(f32::EPSILON) {
        nearest
    } else {
        trunc(ratio)
    };
    (step * levels) as f32
}

/// Companding bit-depth reduction.
///
/// Raises `|x|` to `shape` before quantizing and applies the inverse power
/// afterwards. `shape < 1` spends more quantization levels on small
/// amplitudes; `shape > 1` on large ones. `shape == 1` is plain [`bitcrush`].
#[inline]
pub fn bitcrush_shaped(x: f32, bits: u32, shape: f32) -> f32 {
    let shaped = sign(x) * powf(fabsf(x), shape);
    let quantized = bitcrush(shaped, bits);
    sign(quantized) * powf(fabsf(quantized), 1.0 / shape)
}

/// Final safety clamp into the limiter range.
#[inline]
pub fn limit(x: f32, range: LimitRange) -> f32 {
    let ceiling = range.ceiling();
    x.clamp(-ceiling, ceiling)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn soft_clip_knee_one_is_fast_atan() {
        for &x in &[-2.0f32, -0.5, 0.0, 0.25, 1.0, 3.0] {
            let expected = sign(x) * fast_atan(x.abs());
            assert!((soft_clip_knee(x, 1.0, 1.0) - expected).abs() < 1e-6);
        }
    }

    #[test]
    fn soft_clip_knee_is_odd() {
        for &x in &[0.1f32, 0.5, 0.9, 2.0] {
            for &knee in &[1.0f32, 2.5, 12.0] {
                let pos = soft_clip_knee(x, 2.0, knee);
                let neg = soft_clip_knee(-x, 2.0, knee);
                assert!((pos + neg).abs() < 1e-6, "x={x}, knee={knee}");
            }
        }
    }

    #[test]
    fn higher_knee_is_closer_to_identity_below_one() {
        // A sharper knee keeps the linear region closer to unity gain
        let soft = soft_clip_knee(0.5, 1.0, 1.0);
        let sharp = soft_clip_knee(0.5, 1.0, 8.0);
        assert!((sharp - 0.5).abs() < (soft - 0.5).abs());
    }

    #[test]
    fn soft_clip_zero_drive_is_silent() {
        assert_eq!(soft_clip_knee(0.8, 0.0, 2.0), 0.0);
    }

    #[test]
    fn curves_are_finite_at_zero_drive() {
        for curve in Curve::ALL {
            let y = curve.apply(0.7, 0.0, 1.0);
            assert!(y.is_finite(), "{curve:?} produced {y}");
        }
    }

    #[test]
    fn exp_fuzz_maps_unity_to_unity() {
        assert!((exp_fuzz(1.0, 5.0) - 1.0).abs() < 1e-6);
        assert!((exp_fuzz(-1.0, 5.0) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn sigmoid_matches_tanh_half_drive() {
        // 2/(1+e^-x) - 1 == tanh(x/2)
        for &x in &[-1.0f32, -0.3, 0.0, 0.4, 1.0] {
            assert!((sigmoid_clip(x, 2.0) - tanh_clip(x, 1.0)).abs() < 1e-5);
        }
    }

    #[test]
    fn bitcrush_truncates_toward_zero() {
        // 2 bits: QL = 2/3, levels at 0, ±2/3
        let step = 2.0 / 3.0;
        assert_eq!(bitcrush(0.6, 2), 0.0);
        assert!((bitcrush(0.7, 2) - step).abs() < 1e-6);
        assert_eq!(bitcrush(-0.6, 2), 0.0);
        assert!((bitcrush(-0.99, 2) + step).abs() < 1e-6);
    }

    #[test]
    fn bitcrush_one_bit() {
        // QL = 2: everything inside (-2, 2) collapses to zero
        assert_eq!(bitcrush(0.99, 1), 0.0);
        assert_eq!(bitcrush(-0.99, 1), 0.0);
    }

    #[test]
    fn bitcrush_32_bits_is_transparent() {
        for &x in &[0.123_456_7f32, -0.5, 0.999, 1e-3] {
            assert!((bitcrush(x, 32) - x).abs() < 1e-7, "x={x}");
        }
    }

    #[test]
    fn bitcrush_idempotent_on_grid() {
        for bits in 1..=16 {
            for i in -100..=100 {
                let x = i as f32 / 100.0;
                let once = bitcrush(x, bits);
                assert_eq!(bitcrush(once, bits), once, "bits={bits}, x={x}");
            }
        }
    }

    #[test]
    fn bitcrush_shaped_unity_shape_matches_plain() {
        for &x in &[0.3f32, -0.71, 0.05] {
            let plain = bitcrush(x, 6);
            assert!((bitcrush_shaped(x, 6, 1.0) - plain).abs() < 1e-6);
        }
    }

    #[test]
    fn bitcrush_shaped_low_shape_preserves_small_signals() {
        let x = 0.02f32;
        let plain = bitcrush(x, 4);
        let shaped = bitcrush_shaped(x, 4, 0.25);
        assert_eq!(plain, 0.0);
        assert!(shaped > 0.0);
    }

    #[test]
    fn limiter_ranges() {
        assert_eq!(limit(3.0, LimitRange::Unit), 1.0);
        assert_eq!(limit(-3.0, LimitRange::Unit), -1.0);
        assert_eq!(limit(3.0, LimitRange::Wide), 3.0);
        assert_eq!(limit(-9.0, LimitRange::Wide), -4.0);
    }

    #[test]
    fn curve_from_index_falls_back_to_default() {
        assert_eq!(Curve::from_index(2), Curve::Tanh);
        assert_eq!(Curve::from_index(99), Curve::SoftKnee);
    }
}
