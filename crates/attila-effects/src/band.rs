//! Band distortion unit: one band's gain → shaper → bitcrush → limiter chain.
//!
//! Per sample:
//!
//! ```text
//! x'  = x · inputGain
//! y   = curve(x', drive, knee)          (soft knee by default)
//! y   = bitcrush(y, bits[, shape])
//! out = limit(y) · outputGain
//! ```
//!
//! Every continuous control is smoothed; [`update`](BandDistortion::update)
//! only moves targets. Bit depth and curve switch at the next sample.
//!
//! The unit also works on its own as the single-band distortion through the
//! [`Effect`] impl, usually with the wider [`LimitRange::Wide`] ceiling.

use attila_core::{
    Curve, DEFAULT_SMOOTHING_MS, Effect, LimitRange, SmoothedParam, bitcrush, bitcrush_shaped,
    db_to_linear, limit,
};

use crate::params::BandSettings;

/// Smoothed control values for one frame.
///
/// Produced once per frame by [`BandDistortion::advance`] and shared by all
/// channels of that frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandFrame {
    /// Linear input gain.
    pub input_gain: f32,
    /// Linear output gain.
    pub output_gain: f32,
    /// Linear drive.
    pub drive: f32,
    /// Knee hardness.
    pub knee: f32,
    /// Companding exponent (1 = linear).
    pub shape: f32,
}

/// Distortion processing for one frequency band.
///
/// ## Parameters
///
/// - `input_gain_db` / `output_gain_db`: −60..6 dB
/// - `drive_db`: 0..36 dB, applied as linear pre-gain inside the curve
/// - `knee`: 1..48, soft-knee hardness
/// - `bits`: 1..32, bitcrush depth (32 is transparent)
/// - `shape_pct`: 10..400 %, bitcrush companding exponent
/// - `curve`: transfer function
///
/// There is no band-local dry path; dry/wet is mixed once after the bands
/// are summed.
///
/// # Example
///
/// ```rust
/// use attila_effects::{BandDistortion, BandSettings};
///
/// let mut band = BandDistortion::new();
/// band.prepare(48000.0, &BandSettings { drive_db: 12.0, ..BandSettings::default() });
/// let y = band.process_sample(0.25);
/// assert!(y.abs() <= 1.0);
/// ```
#[derive(Debug, Clone)]
pub struct BandDistortion {
    input_gain: SmoothedParam,
    output_gain: SmoothedParam,
    drive: SmoothedParam,
    knee: SmoothedParam,
    shape: SmoothedParam,
    bits: u32,
    curve: Curve,
    limit_range: LimitRange,
    sample_rate: f32,
}

impl Default for BandDistortion {
    fn default() -> Self {
        Self::new()
    }
}

impl BandDistortion {
    /// Create a band with the ±1 limiter used inside the multiband chain.
    pub fn new() -> Self {
        Self::with_limit_range(LimitRange::Unit)
    }

    /// Create a band with a specific limiter ceiling.
    pub fn with_limit_range(limit_range: LimitRange) -> Self {
        let sr = 44100.0;
        let smoother = |v| SmoothedParam::with_config(v, sr, DEFAULT_SMOOTHING_MS);
        Self {
            input_gain: smoother(1.0),
            output_gain: smoother(1.0),
            drive: smoother(1.0),
            knee: smoother(1.0),
            shape: smoother(1.0),
            bits: 32,
            curve: Curve::default(),
            limit_range,
            sample_rate: sr,
        }
    }

    /// Set the sample rate on every smoother, apply `settings` and jump
    /// straight to them.
    pub fn prepare(&mut self, sample_rate: f32, settings: &BandSettings) {
        self.sample_rate = sample_rate;
        for p in self.smoothers_mut() {
            p.set_sample_rate(sample_rate);
        }
        self.update(settings);
        for p in self.smoothers_mut() {
            p.snap_to_target();
        }
    }

    /// Set the smoothing time of every control, in milliseconds.
    pub fn set_smoothing_ms(&mut self, time_ms: f32) {
        for p in self.smoothers_mut() {
            p.set_smoothing_time_ms(time_ms);
        }
    }

    /// Move smoother targets to `settings`. dB values become linear gains.
    ///
    /// Bit depth is kept within 1..=32.
    pub fn update(&mut self, settings: &BandSettings) {
        self.input_gain.set_target(db_to_linear(settings.input_gain_db));
        self.output_gain.set_target(db_to_linear(settings.output_gain_db));
        self.drive.set_target(db_to_linear(settings.drive_db));
        self.knee.set_target(settings.knee);
        self.shape.set_target(settings.shape_pct * 0.01);
        self.bits = settings.bits.clamp(1, 32);
        self.curve = settings.curve;
    }

    /// Advance every smoother by one sample.
    #[inline]
    pub fn advance(&mut self) -> BandFrame {
        BandFrame {
            input_gain: self.input_gain.advance(),
            output_gain: self.output_gain.advance(),
            drive: self.drive.advance(),
            knee: self.knee.advance(),
            shape: self.shape.advance(),
        }
    }

    /// Run the chain on one sample with already-advanced controls.
    #[inline]
    pub fn render(&self, x: f32, frame: &BandFrame) -> f32 {
        let shaped = self.curve.apply(x * frame.input_gain, frame.drive, frame.knee);
        let crushed = if frame.shape == 1.0 {
            bitcrush(shaped, self.bits)
        } else {
            bitcrush_shaped(shaped, self.bits, frame.shape)
        };
        limit(crushed, self.limit_range) * frame.output_gain
    }

    /// Advance the smoothers and process one sample.
    #[inline]
    pub fn process_sample(&mut self, x: f32) -> f32 {
        let frame = self.advance();
        self.render(x, &frame)
    }

    /// Current bit depth.
    pub fn bits(&self) -> u32 {
        self.bits
    }

    /// Current transfer function.
    pub fn curve(&self) -> Curve {
        self.curve
    }

    /// Limiter ceiling.
    pub fn limit_range(&self) -> LimitRange {
        self.limit_range
    }

    /// Sample rate set by the last `prepare`.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    fn smoothers_mut(&mut self) -> [&mut SmoothedParam; 5] {
        [
            &mut self.input_gain,
            &mut self.output_gain,
            &mut self.drive,
            &mut self.knee,
            &mut self.shape,
        ]
    }
}

impl Effect for BandDistortion {
    /// Frame-major: smoothers advance once per frame for all channels.
    fn process_block(&mut self, buffer: &mut [f32], num_channels: usize, num_samples: usize) {
        debug_assert!(buffer.len() >= num_channels * num_samples);
        for s in 0..num_samples {
            let frame = self.advance();
            for ch in 0..num_channels {
                let idx = ch * num_samples + s;
                buffer[idx] = self.render(buffer[idx], &frame);
            }
        }
    }

    fn reset(&mut self) {
        for p in self.smoothers_mut() {
            p.snap_to_target();
        }
    }
}
