//! Configuration and validation for the attila multiband distortion.
//!
//! The DSP crates never check their inputs; this crate is where values from
//! the outside world are checked before they reach the engine.
//!
//! # Features
//!
//! - **Validation**: Parameter ids, ranges and kinds; engine settings
//! - **Value parsing**: `"-6dB"`, `"4.5kHz"`, `"80%"`, `"on"`, `"Tanh"`
//! - **Render config**: TOML file with engine settings and parameter overrides
//!
//! # Example
//!
//! ```rust,no_run
//! use attila_config::{ParamPolicy, RenderConfig};
//! use attila_effects::AttilaProcessor;
//!
//! let config = RenderConfig::load("render.toml").unwrap();
//!
//! let mut processor = AttilaProcessor::new();
//! processor.set_oversample_factor(config.oversample_factor().unwrap());
//! config
//!     .apply_to_shared(&processor.shared(), ParamPolicy::Reject)
//!     .unwrap();
//! processor.prepare(48000.0, config.engine.block_size, 2);
//! ```

mod error;
mod render;

/// Parameter and engine validation.
pub mod validation;

/// Parsing of parameter values with units and labels.
pub mod value;

pub use error::{ConfigError, FileOp};
pub use render::{EngineConfig, ParamSetting, RenderConfig};
pub use validation::{
    MAX_CHANNELS, ParamPolicy, ValidationError, ValidationResult, clamp_snapshot, validate_engine,
    validate_oversample_factor, validate_param, validate_snapshot, validate_value,
};
pub use value::parse_param_value;
