//! Attila Core - DSP primitives for multiband distortion
//!
//! This crate provides the building blocks of the Attila signal chain,
//! designed for real-time processing with zero allocation in the audio path.
//!
//! # Core Abstractions
//!
//! ## Effect System
//!
//! - [`Effect`] - Object-safe trait for in-place multichannel block processing
//!
//! ## Parameter Smoothing
//!
//! Click-free automation of every control value:
//!
//! - [`SmoothedParam`] - One-pole linear-lag smoothing (RC-like response)
//! - [`LogSmoothedParam`] - Geometric ramps with attack/release times
//!
//! ## Filters
//!
//! - [`OnePole`] - 6 dB/oct lowpass, also the core of [`SmoothedParam`]
//! - [`LinkwitzRiley`] - 4th-order TPT crossover with allpass output
//! - [`BandSplitter`] - Phase-compensated three-band split
//!
//! ## Nonlinear Stage
//!
//! - [`soft_clip_knee`], [`bitcrush`], [`bitcrush_shaped`], [`limit`]
//! - [`Curve`] - Selectable transfer functions (soft knee, hard, tanh, ...)
//!
//! ## Anti-Aliasing
//!
//! - [`Oversampler`] - Block oversampler (1×, 2×, 4×, 8×) around any [`Effect`]
//!
//! ## Parameters
//!
//! - [`ParamDescriptor`], [`ParamValue`] - Metadata and typed values
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible (it needs `alloc` for per-channel state).
//! Disable the default `std` feature in your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! attila-core = { version = "0.1", default-features = false }
//! ```
//!
//! # Design Principles
//!
//! - **Real-time safe**: allocation only in constructors and `prepare`
//! - **No dependencies on std**: `libm` for math
//! - **Denormal-safe**: recursive state is flushed below 1e-20

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod crossover;
pub mod effect;
pub mod math;
pub mod one_pole;
pub mod oversample;
pub mod param;
pub mod param_info;
pub mod shaper;

// Re-export main types at crate root
pub use crossover::{BandSplitter, LinkwitzRiley, MIN_CUTOFF_HZ};
pub use effect::Effect;
pub use math::{
    SILENCE, db_to_linear, fast_atan, flush_denormal, linear_to_db, ms_to_samples, sign,
    wet_dry_mix,
};
pub use one_pole::OnePole;
pub use oversample::{MAX_OVERSAMPLE_FACTOR, OversampleFactor, Oversampler};
pub use param::{
    DEFAULT_ATTACK_MS, DEFAULT_RELEASE_MS, DEFAULT_SMOOTHING_MS, LogSmoothedParam, SmoothedParam,
};
pub use param_info::{ParamDescriptor, ParamKind, ParamScale, ParamUnit, ParamValue};
pub use shaper::{
    Curve, DEFAULT_FOLD_FREQUENCY, LimitRange, bitcrush, bitcrush_shaped, exp_fuzz, hard_clip,
    limit, quantization_step, sigmoid_clip, sine_fold, soft_clip_knee, tanh_clip,
};
