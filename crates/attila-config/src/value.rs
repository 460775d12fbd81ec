//! Parsing of parameter values written by people.
//!
//! Accepts plain numbers and the unit suffixes of the parameter table:
//! `"-6dB"`, `"5kHz"`, `"1200 Hz"`, `"80%"`. Toggles take `on`/`off`,
//! `true`/`false` or `yes`/`no`; choices take their label (`"Tanh"`) or
//! index. Values stay in the parameter's own unit: `"-6dB"` is `-6.0`, not
//! a linear gain.

use attila_core::{ParamKind, ParamUnit};
use attila_effects::ParamKey;

use crate::validation::{ParamPolicy, ValidationError, ValidationResult, validate_value};

/// Parse `text` as a value of `key` and validate it.
///
/// # Example
///
/// ```rust
/// use attila_config::{ParamPolicy, parse_param_value};
/// use attila_effects::ParamKey;
///
/// let key = ParamKey::from_id("midHighCut").unwrap();
/// assert_eq!(parse_param_value(key, "4.5kHz", ParamPolicy::Reject), Ok(4500.0));
///
/// let curve = ParamKey::from_id("curve2").unwrap();
/// assert_eq!(parse_param_value(curve, "tanh", ParamPolicy::Reject), Ok(2.0));
/// ```
pub fn parse_param_value(key: ParamKey, text: &str, policy: ParamPolicy) -> ValidationResult<f32> {
    let desc = key.descriptor();
    let text = text.trim();
    let invalid = |reason: String| ValidationError::InvalidFormat {
        param: key.id().to_string(),
        reason,
    };

    match desc.kind {
        ParamKind::Choice(labels) => {
            if let Some(i) = labels.iter().position(|l| l.eq_ignore_ascii_case(text)) {
                return Ok(i as f32);
            }
        }
        ParamKind::Bool => {
            match text.to_ascii_lowercase().as_str() {
                "on" | "true" | "yes" => return Ok(1.0),
                "off" | "false" | "no" => return Ok(0.0),
                _ => {}
            }
        }
        ParamKind::Float | ParamKind::Int => {}
    }

    let (number, unit, scale) = split_unit(text);
    if let Some(unit) = unit
        && unit != desc.unit
    {
        return Err(invalid(format!("unit of '{text}' does not match {:?}", desc.unit)));
    }
    let value = number
        .trim()
        .parse::<f32>()
        .map_err(|_| invalid(format!("'{text}' is not a number")))?;
    validate_value(key, value * scale, policy)
}

/// Split a trailing unit off `text`: `(number, unit, multiplier)`.
fn split_unit(text: &str) -> (&str, Option<ParamUnit>, f32) {
    let suffixes: [(&str, ParamUnit, f32); 6] = [
        ("kHz", ParamUnit::Hertz, 1000.0),
        ("khz", ParamUnit::Hertz, 1000.0),
        ("Hz", ParamUnit::Hertz, 1.0),
        ("hz", ParamUnit::Hertz, 1.0),
        ("dB", ParamUnit::Decibels, 1.0),
        ("%", ParamUnit::Percent, 1.0),
    ];
    for (suffix, unit, scale) in suffixes {
        if let Some(number) = text.strip_suffix(suffix) {
            return (number, Some(unit), scale);
        }
    }
    if let Some(number) = text.strip_suffix("db") {
        return (number, Some(ParamUnit::Decibels), 1.0);
    }
    (text, None, 1.0)
}
