//! Multiband orchestrator: three distortion bands behind a phase-compensated
//! crossover, with smoothed band enables, mix, gains and global bypass.
//!
//! # Lifecycle
//!
//! Two phases only. After construction the orchestrator is *unprepared*;
//! [`prepare`](MultibandDistortion::prepare) takes the effective sample rate
//! and channel count from a [`ParameterSnapshot`] and allocates per-channel
//! filter state. From then on [`update`](MultibandDistortion::update) and
//! [`process_block`](Effect::process_block) may be called any number of
//! times. Processing before `prepare` is a contract violation, caught only by
//! a debug assertion.
//!
//! # Per-frame algorithm
//!
//! Smoothers advance once per frame; crossover state is per channel.
//!
//! ```text
//! x        = inputGain · raw
//! bands    = split(x, lowMidCut, max(midHighCut, lowMidCut))
//! wetSum   = Σ band_b.process(bands[b]) · enabled_b
//! wet      = mix · wetSum
//! dry      = (1 − mix) · x
//! output   = raw · (1 − amount) + (wet + dry) · amount · outputGain
//! ```
//!
//! `amount` is the global enable, ramped like the band enables, so toggling
//! bypass crossfades between the untouched input and the processed signal
//! without a click. Once the ramp has finished in the bypassed state the
//! output is the raw input bit for bit.

use attila_core::{
    BandSplitter, DEFAULT_SMOOTHING_MS, Effect, LogSmoothedParam, SmoothedParam, db_to_linear,
    wet_dry_mix,
};

use crate::band::{BandDistortion, BandFrame};
use crate::params::{Band, BandSettings, GlobalParam, ParameterSnapshot};

/// Multiband distortion orchestrator.
///
/// Owns three [`BandDistortion`] units, the [`BandSplitter`], and every
/// global smoother.
///
/// # Example
///
/// ```rust
/// use attila_core::Effect;
/// use attila_effects::{MultibandDistortion, ParameterSnapshot};
///
/// let mut snapshot = ParameterSnapshot::new(48000.0, 64, 1);
/// snapshot.set_by_id("drive2", 18.0);
///
/// let mut engine = MultibandDistortion::new();
/// engine.prepare(&snapshot);
///
/// let mut buffer = [0.25f32; 64];
/// engine.process_block(&mut buffer, 1, 64);
/// ```
#[derive(Debug, Clone)]
pub struct MultibandDistortion {
    bands: [BandDistortion; 3],
    band_enabled: [LogSmoothedParam; 3],
    all_enabled: LogSmoothedParam,
    splitter: BandSplitter,
    low_mid_cut: SmoothedParam,
    mid_high_cut: SmoothedParam,
    input_gain: SmoothedParam,
    output_gain: SmoothedParam,
    mix: SmoothedParam,
    bypass: bool,
    smoothing_ms: f32,
    sample_rate: f32,
    block_size: usize,
    num_channels: usize,
    prepared: bool,
}

impl Default for MultibandDistortion {
    fn default() -> Self {
        Self::new()
    }
}

impl MultibandDistortion {
    /// Create an unprepared orchestrator with the default smoothing time.
    pub fn new() -> Self {
        Self::with_smoothing_ms(DEFAULT_SMOOTHING_MS)
    }

    /// Create an unprepared orchestrator with a custom smoothing time, used by
    /// every control smoother and as the enable ramp length.
    pub fn with_smoothing_ms(smoothing_ms: f32) -> Self {
        let sr = 44100.0;
        let smoother = |v| SmoothedParam::with_config(v, sr, smoothing_ms);
        let ramp = || LogSmoothedParam::with_config(1.0, sr, smoothing_ms, smoothing_ms);
        let mut bands = [BandDistortion::new(), BandDistortion::new(), BandDistortion::new()];
        for band in &mut bands {
            band.set_smoothing_ms(smoothing_ms);
        }
        Self {
            bands,
            band_enabled: [ramp(), ramp(), ramp()],
            all_enabled: ramp(),
            splitter: BandSplitter::new(sr, 1, 440.0, 5000.0),
            low_mid_cut: smoother(440.0),
            mid_high_cut: smoother(5000.0),
            input_gain: smoother(1.0),
            output_gain: smoother(1.0),
            mix: smoother(1.0),
            bypass: false,
            smoothing_ms,
            sample_rate: sr,
            block_size: 0,
            num_channels: 0,
            prepared: false,
        }
    }

    /// Configure for the snapshot's effective sample rate, block size and
    /// channel count, then apply its values without ramping.
    ///
    /// Clears all filter state. Allocates; call outside the audio path and
    /// again whenever the sample rate or channel count changes.
    pub fn prepare(&mut self, snapshot: &ParameterSnapshot) {
        let sr = snapshot.sample_rate;
        self.sample_rate = sr;
        self.block_size = snapshot.block_size;
        self.num_channels = snapshot.num_channels.max(1);

        for (band, b) in self.bands.iter_mut().zip(Band::ALL) {
            band.prepare(sr, &snapshot.band(b));
        }
        for p in self.control_smoothers_mut() {
            p.set_sample_rate(sr);
        }
        for ramp in self.enable_ramps_mut() {
            ramp.set_sample_rate(sr);
        }
        self.splitter.prepare(sr, self.num_channels);

        self.update(snapshot);
        for p in self.control_smoothers_mut() {
            p.snap_to_target();
        }
        for (ramp, b) in self.band_enabled.iter_mut().zip(Band::ALL) {
            ramp.set_immediate(enable_gain(snapshot.band(b).bypass));
        }
        self.all_enabled.set_immediate(enable_gain(self.bypass));
        self.prepared = true;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            sample_rate = sr,
            block_size = self.block_size,
            num_channels = self.num_channels,
            "multiband distortion prepared"
        );
    }

    /// Move every smoother target to the snapshot's values.
    ///
    /// The crossover pair is ordered here: if the mid/high cutoff would fall
    /// below the low/mid cutoff it is raised to match.
    pub fn update(&mut self, snapshot: &ParameterSnapshot) {
        for ((band, ramp), b) in self
            .bands
            .iter_mut()
            .zip(self.band_enabled.iter_mut())
            .zip(Band::ALL)
        {
            let settings: BandSettings = snapshot.band(b);
            band.update(&settings);
            ramp.set_value(enable_gain(settings.bypass));
        }

        self.input_gain
            .set_target(db_to_linear(snapshot.global(GlobalParam::InputGain)));
        self.output_gain
            .set_target(db_to_linear(snapshot.global(GlobalParam::OutputGain)));
        self.mix.set_target(snapshot.global(GlobalParam::Mix) * 0.01);

        self.bypass = snapshot.global(GlobalParam::Bypass) >= 0.5;
        self.all_enabled.set_value(enable_gain(self.bypass));

        let (low_mid, mid_high) = ordered_cutoffs(
            snapshot.global(GlobalParam::LowMidCut),
            snapshot.global(GlobalParam::MidHighCut),
        );
        self.low_mid_cut.set_target(low_mid);
        self.mid_high_cut.set_target(mid_high);
    }

    /// Whether `prepare` has been called.
    pub fn is_prepared(&self) -> bool {
        self.prepared
    }

    /// Effective sample rate from the last `prepare`.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Channel count from the last `prepare`.
    pub fn num_channels(&self) -> usize {
        self.num_channels
    }

    /// Global bypass flag from the last `update`.
    pub fn is_bypassed(&self) -> bool {
        self.bypass
    }

    /// Smoothing time in milliseconds.
    pub fn smoothing_ms(&self) -> f32 {
        self.smoothing_ms
    }

    /// Current smoothed `(low_mid, mid_high)` cutoffs.
    pub fn cutoffs(&self) -> (f32, f32) {
        let low_mid = self.low_mid_cut.get();
        (low_mid, self.mid_high_cut.get().max(low_mid))
    }

    /// One band's distortion unit.
    pub fn band(&self, band: Band) -> &BandDistortion {
        &self.bands[band.index()]
    }

    /// Current enable gain of one band (0 bypassed, 1 active).
    pub fn band_enable(&self, band: Band) -> f32 {
        self.band_enabled[band.index()].get()
    }

    fn control_smoothers_mut(&mut self) -> [&mut SmoothedParam; 5] {
        [
            &mut self.low_mid_cut,
            &mut self.mid_high_cut,
            &mut self.input_gain,
            &mut self.output_gain,
            &mut self.mix,
        ]
    }

    fn enable_ramps_mut(&mut self) -> impl Iterator<Item = &mut LogSmoothedParam> {
        self.band_enabled
            .iter_mut()
            .chain(core::iter::once(&mut self.all_enabled))
    }
}

impl Effect for MultibandDistortion {
    fn process_block(&mut self, buffer: &mut [f32], num_channels: usize, num_samples: usize) {
        debug_assert!(self.prepared, "process_block called before prepare");
        debug_assert!(buffer.len() >= num_channels * num_samples);
        debug_assert!(num_channels <= self.num_channels, "more channels than prepared");
        let channels = num_channels.min(self.splitter.num_channels());

        for s in 0..num_samples {
            let input_gain = self.input_gain.advance();
            let low_mid = self.low_mid_cut.advance();
            let mid_high = self.mid_high_cut.advance().max(low_mid);
            self.splitter.set_cutoffs(low_mid, mid_high);

            let frames: [BandFrame; 3] = [
                self.bands[0].advance(),
                self.bands[1].advance(),
                self.bands[2].advance(),
            ];
            let enabled = [
                self.band_enabled[0].advance(),
                self.band_enabled[1].advance(),
                self.band_enabled[2].advance(),
            ];
            let mix = self.mix.advance();
            let amount = self.all_enabled.advance();
            let output_gain = self.output_gain.advance();

            for ch in 0..channels {
                let idx = ch * num_samples + s;
                let raw = buffer[idx];
                let x = input_gain * raw;
                let split = self.splitter.split(ch, x);

                let mut wet = 0.0;
                for b in 0..3 {
                    wet += self.bands[b].render(split[b], &frames[b]) * enabled[b];
                }
                let processed = wet_dry_mix(x, wet, mix);
                buffer[idx] = raw * (1.0 - amount) + processed * amount * output_gain;
            }
        }
    }

    fn reset(&mut self) {
        self.splitter.reset();
        for band in &mut self.bands {
            band.reset();
        }
        for p in self.control_smoothers_mut() {
            p.snap_to_target();
        }
        for ramp in self.enable_ramps_mut() {
            let target = ramp.target();
            ramp.set_immediate(target);
        }
    }
}

/// Enable gain for a bypass flag.
#[inline]
fn enable_gain(bypass: bool) -> f32 {
    if bypass { 0.0 } else { 1.0 }
}

/// Keep `low_mid <= mid_high` by raising the mid/high cutoff.
#[inline]
pub fn ordered_cutoffs(low_mid: f32, mid_high: f32) -> (f32, f32) {
    (low_mid, mid_high.max(low_mid))
}
