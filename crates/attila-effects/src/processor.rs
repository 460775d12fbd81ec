//! Host-facing processor: shared parameter store, oversampling and metering
//! around [`MultibandDistortion`].
//!
//! The control thread writes plain parameter values into [`SharedParams`]
//! (atomic `f32` bits plus a dirty flag). At the start of every block the
//! audio thread consumes the flag and, if it was raised, refreshes its
//! [`ParameterSnapshot`] and calls
//! [`MultibandDistortion::update`] once. Per-field reads are not
//! synchronized with each other; a block may see half of a burst of edits
//! and the rest one block later, which the smoothers hide.
//!
//! ```text
//! host block ──► clear extra outputs ──► upsample ──► MultibandDistortion
//!                                                     (effective rate)
//!            ◄── publish peak meters ◄── downsample ◄──┘
//! ```

#[cfg(not(feature = "std"))]
use alloc::sync::Arc;
#[cfg(feature = "std")]
use std::sync::Arc;

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use attila_core::{Effect, OversampleFactor, Oversampler};

use crate::multiband::MultibandDistortion;
use crate::params::{PARAM_COUNT, PARAMS, ParamKey, ParameterSnapshot};

/// Number of output channels with a level meter.
pub const METER_CHANNELS: usize = 2;

/// Lock-free parameter store shared between the control and audio threads.
///
/// Values are stored as `f32` bit patterns in `AtomicU32`s, in
/// [`ParamKey::index`] order.
#[derive(Debug)]
pub struct SharedParams {
    values: [AtomicU32; PARAM_COUNT],
    dirty: AtomicBool,
}

impl Default for SharedParams {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedParams {
    /// Store with every parameter at its default and the flag lowered.
    pub fn new() -> Self {
        Self {
            values: core::array::from_fn(|i| AtomicU32::new(PARAMS[i].default.to_bits())),
            dirty: AtomicBool::new(false),
        }
    }

    /// Write a value, clamped to the parameter's range, and raise the flag.
    pub fn set(&self, key: ParamKey, value: f32) {
        let clamped = key.descriptor().clamp(value);
        self.values[key.index()].store(clamped.to_bits(), Ordering::Release);
        self.dirty.store(true, Ordering::Release);
    }

    /// Write by string id. Returns `None` and leaves the flag alone for an
    /// unknown id.
    pub fn set_by_id(&self, id: &str, value: f32) -> Option<ParamKey> {
        let key = ParamKey::from_id(id)?;
        self.set(key, value);
        Some(key)
    }

    /// Current value.
    pub fn get(&self, key: ParamKey) -> f32 {
        f32::from_bits(self.values[key.index()].load(Ordering::Acquire))
    }

    /// Lower the flag and report whether it was raised.
    pub fn take_dirty(&self) -> bool {
        self.dirty
            .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Copy every value into `snapshot`.
    pub fn load_into(&self, snapshot: &mut ParameterSnapshot) {
        for (dst, src) in snapshot.values_mut().iter_mut().zip(self.values.iter()) {
            *dst = f32::from_bits(src.load(Ordering::Acquire));
        }
    }
}

/// Per-channel output levels of the last processed block.
///
/// Each level is the largest sample value of the block, starting from 0, so
/// a block that never goes positive reads 0.
#[derive(Debug, Default)]
pub struct LevelMeters {
    levels: [AtomicU32; METER_CHANNELS],
}

impl LevelMeters {
    /// Level of `channel`, or 0 for an unmetered channel.
    pub fn level(&self, channel: usize) -> f32 {
        self.levels
            .get(channel)
            .map_or(0.0, |l| f32::from_bits(l.load(Ordering::Relaxed)))
    }

    fn publish(&self, channel: usize, level: f32) {
        if let Some(l) = self.levels.get(channel) {
            l.store(level.to_bits(), Ordering::Relaxed);
        }
    }

    fn reset(&self) {
        for l in &self.levels {
            l.store(0.0f32.to_bits(), Ordering::Relaxed);
        }
    }
}

/// Multiband distortion wired for a host: parameters, oversampling, meters.
///
/// # Example
///
/// ```rust
/// use attila_effects::AttilaProcessor;
///
/// let mut processor = AttilaProcessor::new();
/// processor.prepare(48000.0, 256, 2);
/// processor.shared().set_by_id("drive1", 24.0);
///
/// let mut left = vec![0.1f32; 256];
/// let mut right = vec![0.1f32; 256];
/// processor.process(&mut [&mut left[..], &mut right[..]], 2);
/// ```
#[derive(Debug)]
pub struct AttilaProcessor {
    shared: Arc<SharedParams>,
    meters: Arc<LevelMeters>,
    snapshot: ParameterSnapshot,
    engine: MultibandDistortion,
    oversampler: Oversampler,
    non_realtime: bool,
    sample_rate: f32,
    max_block_size: usize,
    num_channels: usize,
}

impl Default for AttilaProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl AttilaProcessor {
    /// Processor with a fresh parameter store and 4× oversampling.
    pub fn new() -> Self {
        Self::with_shared(Arc::new(SharedParams::new()))
    }

    /// Processor reading from an existing parameter store.
    pub fn with_shared(shared: Arc<SharedParams>) -> Self {
        Self {
            shared,
            meters: Arc::new(LevelMeters::default()),
            snapshot: ParameterSnapshot::new(44100.0, 0, 0),
            engine: MultibandDistortion::new(),
            oversampler: Oversampler::new(OversampleFactor::default()),
            non_realtime: false,
            sample_rate: 44100.0,
            max_block_size: 0,
            num_channels: 0,
        }
    }

    /// Parameter store, for the control thread.
    pub fn shared(&self) -> Arc<SharedParams> {
        Arc::clone(&self.shared)
    }

    /// Output meters, for level displays.
    pub fn meters(&self) -> Arc<LevelMeters> {
        Arc::clone(&self.meters)
    }

    /// Change the oversampling factor.
    ///
    /// A prepared processor is re-prepared at the new effective rate with
    /// its current host settings, which clears filter memory and snaps the
    /// smoothers. Before the first `prepare` the factor is only stored.
    pub fn set_oversample_factor(&mut self, factor: OversampleFactor) {
        if factor != self.oversampler.factor() {
            self.oversampler.set_factor(factor);
            self.reprepare();
        }
    }

    /// Current oversampling factor.
    pub fn oversample_factor(&self) -> OversampleFactor {
        self.oversampler.factor()
    }

    /// Set the smoothing time of every control. Re-prepares like
    /// [`set_oversample_factor`](Self::set_oversample_factor).
    pub fn set_smoothing_ms(&mut self, smoothing_ms: f32) {
        if smoothing_ms != self.engine.smoothing_ms() {
            self.engine = MultibandDistortion::with_smoothing_ms(smoothing_ms);
            self.reprepare();
        }
    }

    /// Whether `prepare` has been called.
    pub fn is_prepared(&self) -> bool {
        self.engine.is_prepared()
    }

    fn reprepare(&mut self) {
        if self.max_block_size > 0 {
            self.prepare(self.sample_rate, self.max_block_size, self.num_channels);
        }
    }

    /// Offline rendering: refresh parameters every block regardless of the
    /// dirty flag.
    pub fn set_non_realtime(&mut self, non_realtime: bool) {
        self.non_realtime = non_realtime;
    }

    /// Configure for a host sample rate, maximum block size and channel
    /// count. Allocates.
    pub fn prepare(&mut self, sample_rate: f32, max_block_size: usize, num_channels: usize) {
        let factor = self.oversampler.factor().multiplier();
        self.sample_rate = sample_rate;
        self.max_block_size = max_block_size.max(1);
        self.num_channels = num_channels.max(1);

        self.oversampler.prepare(self.num_channels, self.max_block_size);
        self.snapshot = ParameterSnapshot::new(
            sample_rate * factor as f32,
            self.max_block_size * factor,
            self.num_channels,
        );
        self.shared.take_dirty();
        self.shared.load_into(&mut self.snapshot);
        self.engine.prepare(&self.snapshot);
        self.meters.reset();

        #[cfg(feature = "tracing")]
        tracing::info!(
            sample_rate,
            effective_rate = self.snapshot.sample_rate,
            oversample = factor,
            latency = self.latency_samples(),
            "attila processor prepared"
        );
    }

    /// Host sample rate from the last `prepare`.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Rate the distortion runs at: host rate × oversampling factor.
    pub fn effective_sample_rate(&self) -> f32 {
        self.snapshot.sample_rate
    }

    /// Latency in host-rate samples.
    pub fn latency_samples(&self) -> usize {
        self.oversampler.latency_samples()
    }

    /// The wrapped orchestrator.
    pub fn engine(&self) -> &MultibandDistortion {
        &self.engine
    }

    /// Process one host block in place.
    ///
    /// `channels[num_inputs..]` are output-only and cleared first. All
    /// slices must have the same length.
    pub fn process(&mut self, channels: &mut [&mut [f32]], num_inputs: usize) {
        for extra in channels.iter_mut().skip(num_inputs) {
            extra.fill(0.0);
        }

        if self.shared.take_dirty() || self.non_realtime {
            self.shared.load_into(&mut self.snapshot);
            self.engine.update(&self.snapshot);
        }

        let active = channels.len().min(self.num_channels);
        self.oversampler
            .process(&mut self.engine, &mut channels[..active]);

        for (ch, data) in channels.iter().enumerate().take(METER_CHANNELS) {
            let peak = data.iter().fold(0.0f32, |m, &s| m.max(s));
            self.meters.publish(ch, peak);
        }
    }

    /// Clear all filter memory, keeping parameters.
    pub fn reset(&mut self) {
        self.oversampler.reset();
        self.engine.reset();
        self.meters.reset();
    }
}
