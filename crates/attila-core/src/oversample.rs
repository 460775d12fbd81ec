//! Block oversampler for anti-aliased nonlinear processing.
//!
//! Nonlinear stages (clipping, bitcrushing) generate harmonics that exceed
//! Nyquist and alias back into the audible range. The oversampler pushes
//! them up and out:
//!
//! 1. **Upsampling**: each channel is stretched by `factor` with linear
//!    interpolation into an internal channel-major buffer
//! 2. **Processing**: the caller runs its processor over that buffer at
//!    `factor ×` the base rate
//! 3. **Downsampling**: a windowed-sinc FIR removes content above the base
//!    Nyquist and every `factor`-th sample is kept
//!
//! ## Usage
//!
//! ```rust
//! use attila_core::{OversampleFactor, Oversampler};
//!
//! let mut os = Oversampler::new(OversampleFactor::X4);
//! os.prepare(1, 64);
//!
//! let input = [0.5f32; 64];
//! let mut output = [0.0f32; 64];
//! os.upsample_channel(0, &input);
//! for s in os.oversampled_mut(1, input.len()) {
//!     *s = s.clamp(-0.25, 0.25);
//! }
//! os.downsample_channel(0, &mut output);
//! ```
//!
//! ## Buffer layout
//!
//! The oversampled block is channel-major: channel `c` of an `n`-sample
//! block occupies `[c·n·factor, (c+1)·n·factor)`.

#[cfg(not(feature = "std"))]
use alloc::{vec, vec::Vec};

use core::f32::consts::PI;
use libm::{cosf, sinf};

use crate::Effect;

/// Maximum supported oversampling factor.
pub const MAX_OVERSAMPLE_FACTOR: usize = 8;

/// Anti-aliasing FIR order per unit of oversampling factor.
///
/// The filter length grows with the factor so the transition band stays the
/// same width relative to the base rate.
const ORDER_PER_FACTOR: usize = 32;

/// Anti-aliasing cutoff as a fraction of the base sample rate.
const CUTOFF_RATIO: f32 = 0.4;

/// Supported oversampling factors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OversampleFactor {
    /// No oversampling: exact passthrough.
    X1,
    /// 2×.
    X2,
    /// 4×, the default.
    #[default]
    X4,
    /// 8×.
    X8,
}

impl OversampleFactor {
    /// Factor for a multiplier, or `None` if it is not 1, 2, 4 or 8.
    pub fn from_multiplier(multiplier: usize) -> Option<Self> {
        match multiplier {
            1 => Some(Self::X1),
            2 => Some(Self::X2),
            4 => Some(Self::X4),
            8 => Some(Self::X8),
            _ => None,
        }
    }

    /// Rate multiplier.
    pub fn multiplier(self) -> usize {
        match self {
            Self::X1 => 1,
            Self::X2 => 2,
            Self::X4 => 4,
            Self::X8 => 8,
        }
    }
}

/// Per-channel filter memory.
#[derive(Debug, Clone)]
struct ChannelState {
    /// Last base-rate input, for interpolation across block boundaries.
    prev_sample: f32,
    /// FIR delay line (circular).
    history: Vec<f32>,
    /// Next write position in `history`.
    pos: usize,
}

impl ChannelState {
    fn new(taps: usize) -> Self {
        Self {
            prev_sample: 0.0,
            history: vec![0.0; taps],
            pos: 0,
        }
    }

    fn reset(&mut self) {
        self.prev_sample = 0.0;
        self.history.fill(0.0);
        self.pos = 0;
    }
}

/// Multi-channel block oversampler with a fixed power-of-two factor.
///
/// All buffers are sized in [`prepare`](Self::prepare); the per-block
/// methods never allocate.
///
/// # Latency
///
/// The anti-aliasing FIR is symmetric (linear phase) with group delay
/// `order / 2` oversampled samples, which is [`latency_samples`] at the
/// base rate. Linear interpolation adds no delay beyond that.
///
/// [`latency_samples`]: Self::latency_samples
#[derive(Debug, Clone)]
pub struct Oversampler {
    factor: OversampleFactor,
    coeffs: Vec<f32>,
    channels: Vec<ChannelState>,
    buffer: Vec<f32>,
    max_block_size: usize,
}

impl Oversampler {
    /// Create an oversampler. Call [`prepare`](Self::prepare) before use.
    pub fn new(factor: OversampleFactor) -> Self {
        Self {
            factor,
            coeffs: design_lowpass(factor),
            channels: Vec::new(),
            buffer: Vec::new(),
            max_block_size: 0,
        }
    }

    /// Size all state for `num_channels` blocks of up to `max_block_size`
    /// base-rate samples, clearing filter memory.
    pub fn prepare(&mut self, num_channels: usize, max_block_size: usize) {
        let m = self.factor.multiplier();
        self.max_block_size = max_block_size;
        self.channels = vec![ChannelState::new(self.coeffs.len()); num_channels];
        self.buffer = vec![0.0; num_channels * max_block_size * m];

        #[cfg(feature = "tracing")]
        tracing::debug!(
            factor = m,
            taps = self.coeffs.len(),
            num_channels,
            max_block_size,
            "oversampler prepared"
        );
    }

    /// Current factor.
    pub fn factor(&self) -> OversampleFactor {
        self.factor
    }

    /// Change the factor. Reallocates; call outside the audio path and
    /// follow with [`prepare`](Self::prepare).
    pub fn set_factor(&mut self, factor: OversampleFactor) {
        self.factor = factor;
        self.coeffs = design_lowpass(factor);
        self.channels.clear();
        self.buffer.clear();
    }

    /// Largest base-rate block accepted.
    pub fn max_block_size(&self) -> usize {
        self.max_block_size
    }

    /// Delay introduced by a full up/down round trip, in base-rate samples.
    pub fn latency_samples(&self) -> usize {
        if self.coeffs.is_empty() {
            0
        } else {
            (self.coeffs.len() - 1) / 2 / self.factor.multiplier()
        }
    }

    /// Interpolate one channel of base-rate `input` into the internal buffer.
    ///
    /// Every channel of a block must be passed with the same length.
    pub fn upsample_channel(&mut self, channel: usize, input: &[f32]) {
        debug_assert!(input.len() <= self.max_block_size, "block exceeds prepared size");
        let m = self.factor.multiplier();
        let len = input.len() * m;
        let region = &mut self.buffer[channel * len..(channel + 1) * len];
        let state = &mut self.channels[channel];

        if m == 1 {
            region.copy_from_slice(input);
            return;
        }

        let step = 1.0 / m as f32;
        for (frame, &x) in region.chunks_exact_mut(m).zip(input) {
            let prev = state.prev_sample;
            for (i, out) in frame.iter_mut().enumerate() {
                let t = (i as f32 + 1.0) * step;
                *out = prev + t * (x - prev);
            }
            state.prev_sample = x;
        }
    }

    /// The oversampled block: `num_channels × num_samples × factor` samples,
    /// channel-major.
    pub fn oversampled_mut(&mut self, num_channels: usize, num_samples: usize) -> &mut [f32] {
        let len = num_channels * num_samples * self.factor.multiplier();
        &mut self.buffer[..len]
    }

    /// Filter and decimate one channel of the internal buffer into `output`.
    pub fn downsample_channel(&mut self, channel: usize, output: &mut [f32]) {
        let m = self.factor.multiplier();
        let len = output.len() * m;
        let region = &self.buffer[channel * len..(channel + 1) * len];

        if m == 1 {
            output.copy_from_slice(region);
            return;
        }

        let coeffs = &self.coeffs;
        let state = &mut self.channels[channel];
        let taps = state.history.len();

        for (frame, out) in region.chunks_exact(m).zip(output.iter_mut()) {
            for &x in frame {
                state.history[state.pos] = x;
                state.pos = (state.pos + 1) % taps;
            }
            // Convolve at the decimation point only; newest sample pairs with coeffs[0]
            let mut acc = 0.0;
            let mut idx = state.pos;
            for &c in coeffs.iter().rev() {
                acc += c * state.history[idx];
                idx = if idx + 1 == taps { 0 } else { idx + 1 };
            }
            *out = acc;
        }
    }

    /// Run `effect` at the oversampled rate over host channel slices.
    ///
    /// Blocks longer than the prepared size are processed in chunks; extra
    /// channels beyond the prepared count are left untouched. All channels
    /// must have the same length.
    pub fn process<E: Effect + ?Sized>(&mut self, effect: &mut E, channels: &mut [&mut [f32]]) {
        let num_channels = channels.len().min(self.channels.len());
        let Some(len) = channels.first().map(|c| c.len()) else {
            return;
        };
        if num_channels == 0 || self.max_block_size == 0 {
            return;
        }
        let m = self.factor.multiplier();

        let mut start = 0;
        while start < len {
            let end = (start + self.max_block_size).min(len);
            let n = end - start;
            for (ch, data) in channels[..num_channels].iter().enumerate() {
                self.upsample_channel(ch, &data[start..end]);
            }
            effect.process_block(self.oversampled_mut(num_channels, n), num_channels, n * m);
            for (ch, data) in channels[..num_channels].iter_mut().enumerate() {
                self.downsample_channel(ch, &mut data[start..end]);
            }
            start = end;
        }
    }

    /// Clear interpolation and filter memory.
    pub fn reset(&mut self) {
        for ch in &mut self.channels {
            ch.reset();
        }
        self.buffer.fill(0.0);
    }
}

/// Blackman-windowed sinc lowpass at `CUTOFF_RATIO` of the base rate,
/// normalized to unity DC gain. Empty for [`OversampleFactor::X1`].
///
/// Reference: A.V. Oppenheim & R.W. Schafer, "Discrete-Time Signal
/// Processing", Chapter 7 (FIR design by windowing).
fn design_lowpass(factor: OversampleFactor) -> Vec<f32> {
    let m = factor.multiplier();
    if m == 1 {
        return Vec::new();
    }
    let order = ORDER_PER_FACTOR * m;
    let fc = CUTOFF_RATIO / m as f32;
    let center = order as f32 / 2.0;

    let mut coeffs: Vec<f32> = (0..=order)
        .map(|n| {
            let x = n as f32 - center;
            let sinc = if x == 0.0 {
                2.0 * fc
            } else {
                sinf(2.0 * PI * fc * x) / (PI * x)
            };
            let phase = 2.0 * PI * n as f32 / order as f32;
            let window = 0.42 - 0.5 * cosf(phase) + 0.08 * cosf(2.0 * phase);
            sinc * window
        })
        .collect();

    let sum: f32 = coeffs.iter().sum();
    for c in &mut coeffs {
        *c /= sum;
    }
    coeffs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(os: &mut Oversampler, input: &[f32]) -> Vec<f32> {
        let mut output = vec![0.0; input.len()];
        os.upsample_channel(0, input);
        os.downsample_channel(0, &mut output);
        output
    }

    #[test]
    fn factor_one_is_exact_passthrough() {
        let mut os = Oversampler::new(OversampleFactor::X1);
        os.prepare(1, 8);
        let input = [0.1, -0.2, 0.3, 0.9, -1.0, 0.0, 0.5, 0.25];
        assert_eq!(round_trip(&mut os, &input), input.to_vec());
        assert_eq!(os.latency_samples(), 0);
    }

    #[test]
    fn latency_is_constant_across_factors() {
        for factor in [OversampleFactor::X2, OversampleFactor::X4, OversampleFactor::X8] {
            let os = Oversampler::new(factor);
            assert_eq!(os.latency_samples(), ORDER_PER_FACTOR / 2, "{factor:?}");
        }
    }

    #[test]
    fn coefficients_are_symmetric_with_unity_dc() {
        for factor in [OversampleFactor::X2, OversampleFactor::X4, OversampleFactor::X8] {
            let coeffs = design_lowpass(factor);
            let sum: f32 = coeffs.iter().sum();
            assert!((sum - 1.0).abs() < 1e-5);
            let n = coeffs.len();
            for i in 0..n / 2 {
                assert!((coeffs[i] - coeffs[n - 1 - i]).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn dc_passes_after_latency() {
        let mut os = Oversampler::new(OversampleFactor::X4);
        os.prepare(1, 256);
        let out = round_trip(&mut os, &[1.0; 256]);
        for &s in &out[64..] {
            assert!((s - 1.0).abs() < 1e-3, "got {s}");
        }
    }

    #[test]
    fn impulse_peak_lands_at_reported_latency() {
        for factor in [OversampleFactor::X2, OversampleFactor::X4, OversampleFactor::X8] {
            let mut os = Oversampler::new(factor);
            os.prepare(1, 64);
            let mut input = [0.0f32; 64];
            input[0] = 1.0;
            let out = round_trip(&mut os, &input);
            let peak = out
                .iter()
                .enumerate()
                .max_by(|a, b| a.1.abs().total_cmp(&b.1.abs()))
                .map(|(i, _)| i);
            assert_eq!(peak, Some(os.latency_samples()), "{factor:?}");
        }
    }

    #[test]
    fn state_carries_across_blocks() {
        let input: Vec<f32> = (0..128).map(|i| libm::sinf(i as f32 * 0.05)).collect();

        let mut whole = Oversampler::new(OversampleFactor::X2);
        whole.prepare(1, 128);
        let expected = round_trip(&mut whole, &input);

        let mut split = Oversampler::new(OversampleFactor::X2);
        split.prepare(1, 64);
        let mut got = round_trip(&mut split, &input[..64]);
        got.extend(round_trip(&mut split, &input[64..]));

        for (a, b) in expected.iter().zip(&got) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn channels_do_not_share_state() {
        let mut os = Oversampler::new(OversampleFactor::X2);
        os.prepare(2, 32);
        os.upsample_channel(0, &[1.0; 32]);
        os.upsample_channel(1, &[0.0; 32]);
        let mut silent = [1.0f32; 32];
        os.downsample_channel(1, &mut silent);
        assert!(silent.iter().all(|&s| s == 0.0));
    }

    struct HalfGain;

    impl Effect for HalfGain {
        fn process_block(&mut self, buffer: &mut [f32], num_channels: usize, num_samples: usize) {
            for s in &mut buffer[..num_channels * num_samples] {
                *s *= 0.5;
            }
        }

        fn reset(&mut self) {}
    }

    #[test]
    fn process_chunks_long_blocks() {
        let mut os = Oversampler::new(OversampleFactor::X2);
        os.prepare(2, 16);
        let mut left = vec![1.0f32; 100];
        let mut right = vec![-1.0f32; 100];
        {
            let mut channels: [&mut [f32]; 2] = [&mut left, &mut right];
            os.process(&mut HalfGain, &mut channels);
        }
        for (&l, &r) in left[64..].iter().zip(&right[64..]) {
            assert!((l - 0.5).abs() < 1e-3, "left {l}");
            assert!((r + 0.5).abs() < 1e-3, "right {r}");
        }
    }

    #[test]
    fn from_multiplier_rejects_non_powers() {
        assert_eq!(OversampleFactor::from_multiplier(4), Some(OversampleFactor::X4));
        assert_eq!(OversampleFactor::from_multiplier(3), None);
        assert_eq!(OversampleFactor::from_multiplier(16), None);
    }
}
