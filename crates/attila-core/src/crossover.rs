//! Linkwitz-Riley crossover filters and the three-band splitter.
//!
//! # Topology
//!
//! Each [`LinkwitzRiley`] is a 4th-order (24 dB/oct) crossover built from two
//! cascaded TPT state-variable sections with Butterworth damping
//! (`R2 = √2`), after Zavalishin, "The Art of VA Filter Design", Chapter 3.
//! For one input sample the first section yields highpass `yH`, bandpass `yB`
//! and lowpass `yL`; the second section filters `yL` again into `yL2`:
//!
//! ```text
//! low  = yL2                       (LP4)
//! high = yL − R2·yB + yH − yL2     (AP2 − LP4)
//! ```
//!
//! so `low + high` is exactly the 2nd-order allpass `yL − R2·yB + yH` of the
//! first section. The TPT form keeps the filter stable while the cutoff is
//! swept every sample.
//!
//! # Three bands
//!
//! [`BandSplitter`] cascades two crossovers: the input splits into
//! (low, rest) at the low/mid cutoff and `rest` splits into (mid, high) at
//! the mid/high cutoff. The low band then runs through the mid/high
//! crossover's allpass so all three bands share the same phase response and
//! `low + mid + high` is a pure allpass of the input (flat magnitude).
//!
//! State is kept per channel; cutoff coefficients are shared by all channels.

#[cfg(not(feature = "std"))]
use alloc::{vec, vec::Vec};

use core::f32::consts::{PI, SQRT_2};
use libm::tanf;

use crate::flush_denormal;

/// Lowest cutoff accepted by [`LinkwitzRiley::set_cutoff`].
pub const MIN_CUTOFF_HZ: f32 = 10.0;

/// Highest cutoff as a fraction of the sample rate.
const MAX_CUTOFF_RATIO: f32 = 0.49;

/// Butterworth damping of each 2nd-order section.
const R2: f32 = SQRT_2;

/// Integrator memories of one channel: two per TPT section.
#[derive(Debug, Clone, Copy, Default)]
struct CrossoverState {
    s1: f32,
    s2: f32,
    s3: f32,
    s4: f32,
}

/// One 2nd-order TPT section tick. Returns `(yH, yB, yL)`.
#[inline]
fn tpt_section(x: f32, s1: &mut f32, s2: &mut f32, g: f32, h: f32) -> (f32, f32, f32) {
    let y_h = (x - (R2 + g) * *s1 - *s2) * h;
    let v_b = g * y_h;
    let y_b = v_b + *s1;
    *s1 = flush_denormal(v_b + y_b);
    let v_l = g * y_b;
    let y_l = v_l + *s2;
    *s2 = flush_denormal(v_l + y_l);
    (y_h, y_b, y_l)
}

/// 4th-order Linkwitz-Riley crossover with per-channel state.
///
/// ## Parameters
///
/// - `cutoff`: crossover frequency in Hz, clamped to
///   `[MIN_CUTOFF_HZ, 0.49 · sample_rate]`
///
/// # Example
///
/// ```rust
/// use attila_core::LinkwitzRiley;
///
/// let mut xover = LinkwitzRiley::new(48000.0, 1, 1000.0);
/// let (low, high) = xover.split(0, 1.0);
/// assert!((low + high).is_finite());
/// ```
#[derive(Debug, Clone)]
pub struct LinkwitzRiley {
    sample_rate: f32,
    cutoff: f32,
    g: f32,
    h: f32,
    channels: Vec<CrossoverState>,
}

impl LinkwitzRiley {
    /// Create a crossover for `num_channels` channels.
    pub fn new(sample_rate: f32, num_channels: usize, cutoff_hz: f32) -> Self {
        let mut filter = Self {
            sample_rate,
            cutoff: cutoff_hz,
            g: 0.0,
            h: 1.0,
            channels: vec![CrossoverState::default(); num_channels.max(1)],
        };
        filter.recalculate_coeffs();
        filter
    }

    /// Reconfigure sample rate and channel count, clearing all state.
    ///
    /// Allocates when the channel count grows; call outside the audio path.
    pub fn prepare(&mut self, sample_rate: f32, num_channels: usize) {
        self.sample_rate = sample_rate;
        self.channels.clear();
        self.channels
            .resize(num_channels.max(1), CrossoverState::default());
        self.recalculate_coeffs();
    }

    /// Set the crossover frequency.
    ///
    /// Safe to call every sample; coefficients are only recomputed when the
    /// value changes.
    #[inline]
    pub fn set_cutoff(&mut self, cutoff_hz: f32) {
        if cutoff_hz != self.cutoff {
            self.cutoff = cutoff_hz;
            self.recalculate_coeffs();
        }
    }

    /// Current crossover frequency as last requested (before clamping).
    pub fn cutoff(&self) -> f32 {
        self.cutoff
    }

    /// Number of channels with independent state.
    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    /// Split one sample of `channel` into `(low, high)`.
    ///
    /// `low + high` equals [`allpass`](Self::allpass) of the same input.
    #[inline]
    pub fn split(&mut self, channel: usize, input: f32) -> (f32, f32) {
        let (g, h) = (self.g, self.h);
        let st = &mut self.channels[channel];
        let (y_h, y_b, y_l) = tpt_section(input, &mut st.s1, &mut st.s2, g, h);
        let (_, _, y_l2) = tpt_section(y_l, &mut st.s3, &mut st.s4, g, h);
        (y_l2, y_l - R2 * y_b + y_h - y_l2)
    }

    /// 2nd-order allpass at the crossover frequency.
    ///
    /// Matches the phase of `low + high` from [`split`](Self::split) on an
    /// instance with the same cutoff. Uses only the first section's state.
    #[inline]
    pub fn allpass(&mut self, channel: usize, input: f32) -> f32 {
        let (g, h) = (self.g, self.h);
        let st = &mut self.channels[channel];
        let (y_h, y_b, y_l) = tpt_section(input, &mut st.s1, &mut st.s2, g, h);
        y_l - R2 * y_b + y_h
    }

    /// Clear all channel state.
    pub fn reset(&mut self) {
        self.channels.fill(CrossoverState::default());
    }

    fn recalculate_coeffs(&mut self) {
        if self.sample_rate <= 0.0 {
            return;
        }
        let max_cutoff = (self.sample_rate * MAX_CUTOFF_RATIO).max(MIN_CUTOFF_HZ);
        let fc = self.cutoff.clamp(MIN_CUTOFF_HZ, max_cutoff);
        self.g = tanf(PI * fc / self.sample_rate);
        self.h = 1.0 / (1.0 + R2 * self.g + self.g * self.g);
    }
}

/// Three-band splitter: two cascaded crossovers plus low-band phase
/// compensation.
///
/// Cutoff ordering is not enforced here; callers keep
/// `low_mid <= mid_high`.
#[derive(Debug, Clone)]
pub struct BandSplitter {
    low_mid: LinkwitzRiley,
    mid_high: LinkwitzRiley,
    low_compensation: LinkwitzRiley,
}

impl BandSplitter {
    /// Create a splitter with initial cutoffs.
    pub fn new(sample_rate: f32, num_channels: usize, low_mid_hz: f32, mid_high_hz: f32) -> Self {
        Self {
            low_mid: LinkwitzRiley::new(sample_rate, num_channels, low_mid_hz),
            mid_high: LinkwitzRiley::new(sample_rate, num_channels, mid_high_hz),
            low_compensation: LinkwitzRiley::new(sample_rate, num_channels, mid_high_hz),
        }
    }

    /// Reconfigure sample rate and channel count, clearing all state.
    pub fn prepare(&mut self, sample_rate: f32, num_channels: usize) {
        self.low_mid.prepare(sample_rate, num_channels);
        self.mid_high.prepare(sample_rate, num_channels);
        self.low_compensation.prepare(sample_rate, num_channels);
    }

    /// Apply both cutoffs. Call once per frame, before [`split`](Self::split).
    #[inline]
    pub fn set_cutoffs(&mut self, low_mid_hz: f32, mid_high_hz: f32) {
        self.low_mid.set_cutoff(low_mid_hz);
        self.mid_high.set_cutoff(mid_high_hz);
        self.low_compensation.set_cutoff(mid_high_hz);
    }

    /// Current `(low_mid, mid_high)` cutoffs.
    pub fn cutoffs(&self) -> (f32, f32) {
        (self.low_mid.cutoff(), self.mid_high.cutoff())
    }

    /// Number of channels with independent state.
    pub fn num_channels(&self) -> usize {
        self.low_mid.num_channels()
    }

    /// Split one sample of `channel` into `[low, mid, high]`.
    #[inline]
    pub fn split(&mut self, channel: usize, input: f32) -> [f32; 3] {
        let (low, rest) = self.low_mid.split(channel, input);
        let (mid, high) = self.mid_high.split(channel, rest);
        let low = self.low_compensation.allpass(channel, low);
        [low, mid, high]
    }

    /// Clear all channel state.
    pub fn reset(&mut self) {
        self.low_mid.reset();
        self.mid_high.reset();
        self.low_compensation.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use libm::sinf;

    const SR: f32 = 48000.0;

    fn sine(freq: f32, i: usize) -> f32 {
        sinf(2.0 * PI * freq * i as f32 / SR)
    }

    fn rms(samples: &[f32]) -> f32 {
        libm::sqrtf(samples.iter().map(|s| s * s).sum::<f32>() / samples.len() as f32)
    }

    #[test]
    fn split_sums_to_allpass() {
        let mut xover = LinkwitzRiley::new(SR, 1, 800.0);
        let mut reference = LinkwitzRiley::new(SR, 1, 800.0);
        for i in 0..2000 {
            let x = sine(313.0, i) + 0.3 * sine(4100.0, i);
            let (low, high) = xover.split(0, x);
            let ap = reference.allpass(0, x);
            assert!((low + high - ap).abs() < 1e-5, "sample {i}");
        }
    }

    #[test]
    fn lowpass_rejects_highs() {
        let mut xover = LinkwitzRiley::new(SR, 1, 500.0);
        let mut low = Vec::new();
        let mut high = Vec::new();
        for i in 0..9600 {
            let (l, h) = xover.split(0, sine(8000.0, i));
            if i >= 4800 {
                low.push(l);
                high.push(h);
            }
        }
        assert!(rms(&low) < 1e-3, "low band leaked: {}", rms(&low));
        assert!((rms(&high) - core::f32::consts::FRAC_1_SQRT_2).abs() < 0.02);
    }

    #[test]
    fn crossover_point_is_minus_six_db() {
        let fc = 1000.0;
        let mut xover = LinkwitzRiley::new(SR, 1, fc);
        let mut low = Vec::new();
        for i in 0..19200 {
            let (l, _) = xover.split(0, sine(fc, i));
            if i >= 9600 {
                low.push(l);
            }
        }
        let gain = rms(&low) / core::f32::consts::FRAC_1_SQRT_2;
        assert!((gain - 0.5).abs() < 0.02, "LR4 should be -6 dB at fc, got {gain}");
    }

    #[test]
    fn three_bands_sum_flat() {
        for &freq in &[40.0, 300.0, 440.0, 1200.0, 5000.0, 9000.0, 16000.0] {
            let mut splitter = BandSplitter::new(SR, 1, 440.0, 5000.0);
            let mut out = Vec::new();
            for i in 0..19200 {
                let [l, m, h] = splitter.split(0, sine(freq, i));
                if i >= 9600 {
                    out.push(l + m + h);
                }
            }
            let gain = rms(&out) / core::f32::consts::FRAC_1_SQRT_2;
            assert!((gain - 1.0).abs() < 0.01, "freq {freq}: gain {gain}");
        }
    }

    #[test]
    fn channels_are_independent() {
        let mut splitter = BandSplitter::new(SR, 2, 200.0, 2000.0);
        for i in 0..512 {
            splitter.split(0, sine(1000.0, i));
            let [l, m, h] = splitter.split(1, 0.0);
            assert_eq!(l + m + h, 0.0);
        }
    }

    #[test]
    fn cutoff_above_nyquist_stays_finite() {
        let mut xover = LinkwitzRiley::new(SR, 1, 30000.0);
        for i in 0..256 {
            let (l, h) = xover.split(0, sine(1000.0, i));
            assert!(l.is_finite() && h.is_finite());
        }
    }

    #[test]
    fn cutoff_sweep_is_stable() {
        let mut splitter = BandSplitter::new(SR, 1, 20.0, 20.0);
        for i in 0..48000 {
            let t = i as f32 / 48000.0;
            let lm = 20.0 + 19980.0 * t;
            splitter.set_cutoffs(lm, 20000.0);
            let [l, m, h] = splitter.split(0, sine(700.0, i));
            assert!((l + m + h).abs() < 4.0, "sample {i}");
        }
    }

    #[test]
    fn reset_clears_state() {
        let mut xover = LinkwitzRiley::new(SR, 1, 1000.0);
        xover.split(0, 1.0);
        xover.reset();
        assert_eq!(xover.split(0, 0.0), (0.0, 0.0));
    }
}
