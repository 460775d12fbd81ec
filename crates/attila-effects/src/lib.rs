//! Attila Effects - Multiband distortion built on attila-core
//!
//! This crate assembles the attila-core primitives into the full effect:
//!
//! - [`BandDistortion`] - One band's gain, shaper, bitcrush and limiter chain,
//!   also usable on its own as a single-band distortion
//! - [`MultibandDistortion`] - Three bands behind a phase-compensated
//!   crossover, with smoothed enables, mix and bypass crossfade
//! - [`ParameterSnapshot`] - Flat, strongly typed view of every parameter
//! - [`AttilaProcessor`] - Host-facing wrapper: lock-free parameter store,
//!   oversampling and output meters
//!
//! ## Example
//!
//! ```rust
//! use attila_core::Effect;
//! use attila_effects::{MultibandDistortion, ParameterSnapshot};
//!
//! let mut snapshot = ParameterSnapshot::new(96000.0, 128, 2);
//! snapshot.set_by_id("drive1", 24.0);
//! snapshot.set_by_id("bit3", 6.0);
//!
//! let mut engine = MultibandDistortion::new();
//! engine.prepare(&snapshot);
//!
//! // Channel-major: left samples, then right samples
//! let mut buffer = vec![0.0f32; 2 * 128];
//! engine.process_block(&mut buffer, 2, 128);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod band;
pub mod multiband;
pub mod params;
pub mod processor;

// Re-export main types at crate root
pub use band::{BandDistortion, BandFrame};
pub use multiband::{MultibandDistortion, ordered_cutoffs};
pub use params::{
    BAND_PARAM_COUNT, Band, BandParam, BandSettings, CURVE_LABELS, GLOBAL_PARAM_COUNT,
    GlobalParam, PARAM_COUNT, PARAMS, ParamKey, ParameterSnapshot,
};
pub use processor::{AttilaProcessor, LevelMeters, METER_CHANNELS, SharedParams};
