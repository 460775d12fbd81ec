//! Parameter and engine validation.
//!
//! The audio path trusts its inputs: a zero knee or a negative sample rate
//! produce NaN or silence rather than an error. Everything that comes from
//! outside (config files, command-line overrides, host settings) goes
//! through this module before it reaches
//! [`MultibandDistortion::update`](attila_effects::MultibandDistortion::update).
//!
//! # Example
//!
//! ```rust
//! use attila_config::{ParamPolicy, validate_param};
//!
//! let (key, value) = validate_param("drive1", 12.0, ParamPolicy::Reject).unwrap();
//! assert_eq!(key.id(), "drive1");
//! assert_eq!(value, 12.0);
//!
//! // Out of range: rejected, or clamped on request
//! assert!(validate_param("drive1", 99.0, ParamPolicy::Reject).is_err());
//! let (_, clamped) = validate_param("drive1", 99.0, ParamPolicy::Clamp).unwrap();
//! assert_eq!(clamped, 36.0);
//! ```

use attila_core::{MAX_OVERSAMPLE_FACTOR, ParamKind};
use attila_effects::{PARAMS, ParamKey, ParameterSnapshot};
use thiserror::Error;

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// Unknown parameter id.
    #[error("unknown parameter '{0}'")]
    UnknownParameter(String),

    /// Parameter value out of range.
    #[error("parameter '{param}' value {value} out of range [{min}, {max}]")]
    OutOfRange {
        /// Parameter id.
        param: String,
        /// The value that was out of range.
        value: f32,
        /// Minimum allowed value.
        min: f32,
        /// Maximum allowed value.
        max: f32,
    },

    /// Invalid parameter format.
    #[error("invalid format for parameter '{param}': {reason}")]
    InvalidFormat {
        /// Parameter id.
        param: String,
        /// Description of the format error.
        reason: String,
    },

    /// Invalid engine setting (sample rate, block size, channels, factor).
    #[error("invalid engine setting '{setting}': {reason}")]
    InvalidEngine {
        /// Name of the setting.
        setting: &'static str,
        /// Description of the problem.
        reason: String,
    },

    /// Multiple validation errors.
    #[error("multiple validation errors: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// What to do with a finite value outside its parameter's range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParamPolicy {
    /// Report [`ValidationError::OutOfRange`].
    #[default]
    Reject,
    /// Clamp into range.
    Clamp,
}

/// Most channels the processor is validated for (mono or stereo).
pub const MAX_CHANNELS: usize = 2;

/// Validate one value for the parameter `key`.
///
/// Non-finite values are always rejected. Integer and choice parameters must
/// be whole numbers; toggles must be 0 or 1.
pub fn validate_value(key: ParamKey, value: f32, policy: ParamPolicy) -> ValidationResult<f32> {
    let desc = key.descriptor();
    if !value.is_finite() {
        return Err(ValidationError::InvalidFormat {
            param: key.id().to_string(),
            reason: format!("{value} is not a finite number"),
        });
    }

    let whole = match desc.kind {
        ParamKind::Float => true,
        ParamKind::Int | ParamKind::Choice(_) => value.fract() == 0.0,
        ParamKind::Bool => value == 0.0 || value == 1.0,
    };
    if !whole {
        return Err(ValidationError::InvalidFormat {
            param: key.id().to_string(),
            reason: format!("{value} is not a valid {}", kind_name(desc.kind)),
        });
    }

    if desc.contains(value) {
        return Ok(value);
    }
    match policy {
        ParamPolicy::Clamp => Ok(desc.clamp(value)),
        ParamPolicy::Reject => Err(ValidationError::OutOfRange {
            param: key.id().to_string(),
            value,
            min: desc.min,
            max: desc.max,
        }),
    }
}

/// Resolve a string id and validate its value.
pub fn validate_param(
    id: &str,
    value: f32,
    policy: ParamPolicy,
) -> ValidationResult<(ParamKey, f32)> {
    let key =
        ParamKey::from_id(id).ok_or_else(|| ValidationError::UnknownParameter(id.to_string()))?;
    Ok((key, validate_value(key, value, policy)?))
}

/// Check host/engine settings before `prepare`.
pub fn validate_engine(
    sample_rate: f32,
    block_size: usize,
    num_channels: usize,
) -> ValidationResult<()> {
    let mut errors = Vec::new();
    if !(sample_rate.is_finite() && sample_rate > 0.0) {
        errors.push(ValidationError::InvalidEngine {
            setting: "sample_rate",
            reason: format!("{sample_rate} Hz must be positive"),
        });
    }
    if block_size == 0 {
        errors.push(ValidationError::InvalidEngine {
            setting: "block_size",
            reason: "must be at least 1 sample".to_string(),
        });
    }
    if num_channels == 0 || num_channels > MAX_CHANNELS {
        errors.push(ValidationError::InvalidEngine {
            setting: "num_channels",
            reason: format!("{num_channels} channels, expected 1 or 2"),
        });
    }
    collect(errors)
}

/// Check an oversampling multiplier.
pub fn validate_oversample_factor(multiplier: usize) -> ValidationResult<()> {
    if multiplier.is_power_of_two() && multiplier <= MAX_OVERSAMPLE_FACTOR {
        Ok(())
    } else {
        Err(ValidationError::InvalidEngine {
            setting: "oversample_factor",
            reason: format!("{multiplier} is not one of 1, 2, 4, 8"),
        })
    }
}

/// Validate the engine settings and every value of a snapshot.
///
/// With [`ParamPolicy::Clamp`] out-of-range values are clamped in place;
/// everything else is reported together.
pub fn validate_snapshot(
    snapshot: &mut ParameterSnapshot,
    policy: ParamPolicy,
) -> ValidationResult<()> {
    let mut errors = Vec::new();
    if let Err(e) = validate_engine(
        snapshot.sample_rate,
        snapshot.block_size,
        snapshot.num_channels,
    ) {
        flatten_into(e, &mut errors);
    }
    for key in ParamKey::all() {
        match validate_value(key, snapshot.get(key), policy) {
            Ok(v) => snapshot.set(key, v),
            Err(e) => errors.push(e),
        }
    }
    collect(errors)
}

/// Clamp every value of a snapshot into range, replacing non-finite values
/// with the default.
pub fn clamp_snapshot(snapshot: &mut ParameterSnapshot) {
    for (v, desc) in snapshot.values_mut().iter_mut().zip(PARAMS.iter()) {
        *v = if v.is_finite() {
            desc.clamp(*v)
        } else {
            desc.default
        };
    }
}

fn kind_name(kind: ParamKind) -> &'static str {
    match kind {
        ParamKind::Float => "number",
        ParamKind::Int => "integer",
        ParamKind::Bool => "toggle (0 or 1)",
        ParamKind::Choice(_) => "choice index",
    }
}

fn flatten_into(error: ValidationError, errors: &mut Vec<ValidationError>) {
    match error {
        ValidationError::Multiple(inner) => errors.extend(inner),
        other => errors.push(other),
    }
}

fn collect(mut errors: Vec<ValidationError>) -> ValidationResult<()> {
    match errors.len() {
        0 => Ok(()),
        1 => Err(errors.remove(0)),
        _ => Err(ValidationError::Multiple(errors)),
    }
}
