//! Parameter metadata and typed parameter values.
//!
//! A [`ParamDescriptor`] describes one automatable control: display names, a
//! stable string id, range, default, unit, normalization curve and kind. The
//! kind is a closed set ([`ParamKind`]) and values of each kind are carried as
//! a [`ParamValue`] with a uniform [`get`](ParamValue::get) accessor, so the
//! processing code only ever sees plain `f32`s.
//!
//! Descriptors are `const`-constructible, which lets a whole parameter table
//! live in a `static` without allocation.
//!
//! ```rust
//! use attila_core::{ParamDescriptor, ParamValue};
//!
//! let bits = ParamDescriptor::int("Bit Depth", "Bits", "bit1", 1, 32, 32);
//! assert_eq!(bits.value(7.6), ParamValue::Int(7));
//! assert_eq!(bits.value(99.0).get(), 32.0);
//! ```

use libm::{floorf, powf};

/// Scaling curve for parameter normalization.
///
/// - **Linear**: `normalized = (value - min) / (max - min)`
/// - **Power(exp)**: `normalized = ((value - min) / (max - min))^(1/exp)`
///
/// `Power(1/s)` corresponds to a knob skew factor of `s`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ParamScale {
    /// Equal resolution across the range.
    #[default]
    Linear,
    /// Power curve; exponent > 1 gives more resolution at the low end.
    Power(f32),
}

/// Unit for display and formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamUnit {
    /// Decibels.
    Decibels,
    /// Hertz.
    Hertz,
    /// Percent.
    Percent,
    /// Dimensionless.
    None,
}

impl ParamUnit {
    /// Suffix appended to formatted values.
    pub const fn suffix(&self) -> &'static str {
        match self {
            ParamUnit::Decibels => " dB",
            ParamUnit::Hertz => " Hz",
            ParamUnit::Percent => "%",
            ParamUnit::None => "",
        }
    }
}

/// The closed set of parameter kinds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamKind {
    /// Continuous value.
    Float,
    /// Integer steps between `min` and `max`.
    Int,
    /// On/off switch stored as `0.0` / `1.0`.
    Bool,
    /// One of a fixed list of labels, stored as the index.
    Choice(&'static [&'static str]),
}

/// A typed parameter value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamValue {
    /// Continuous value.
    Float(f32),
    /// Integer value.
    Int(i32),
    /// Switch.
    Bool(bool),
    /// Index into the descriptor's choice labels.
    Choice(usize),
}

impl ParamValue {
    /// Plain `f32` view used by the processing code.
    ///
    /// `Bool` maps to `0.0`/`1.0`, `Choice` to its index.
    #[inline]
    pub fn get(self) -> f32 {
        match self {
            ParamValue::Float(v) => v,
            ParamValue::Int(v) => v as f32,
            ParamValue::Bool(v) => {
                if v {
                    1.0
                } else {
                    0.0
                }
            }
            ParamValue::Choice(i) => i as f32,
        }
    }
}

/// Metadata for one parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamDescriptor {
    /// Full name for display (e.g. "Low Drive").
    pub name: &'static str,
    /// Short name, max 8 characters.
    pub short_name: &'static str,
    /// Stable string id used for lookup and serialization (e.g. `"drive1"`).
    pub string_id: &'static str,
    /// Display unit.
    pub unit: ParamUnit,
    /// Value kind.
    pub kind: ParamKind,
    /// Minimum plain value.
    pub min: f32,
    /// Maximum plain value.
    pub max: f32,
    /// Default plain value.
    pub default: f32,
    /// Normalization curve.
    pub scale: ParamScale,
    /// Group for tree display (`""` means top level).
    pub group: &'static str,
}

impl ParamDescriptor {
    /// Continuous parameter.
    pub const fn float(
        name: &'static str,
        short_name: &'static str,
        string_id: &'static str,
        unit: ParamUnit,
        min: f32,
        max: f32,
        default: f32,
    ) -> Self {
        Self {
            name,
            short_name,
            string_id,
            unit,
            kind: ParamKind::Float,
            min,
            max,
            default,
            scale: ParamScale::Linear,
            group: "",
        }
    }

    /// Gain in decibels.
    pub const fn gain_db(
        name: &'static str,
        short_name: &'static str,
        string_id: &'static str,
        min: f32,
        max: f32,
        default: f32,
    ) -> Self {
        Self::float(name, short_name, string_id, ParamUnit::Decibels, min, max, default)
    }

    /// Integer parameter.
    pub const fn int(
        name: &'static str,
        short_name: &'static str,
        string_id: &'static str,
        min: i32,
        max: i32,
        default: i32,
    ) -> Self {
        Self {
            kind: ParamKind::Int,
            ..Self::float(
                name,
                short_name,
                string_id,
                ParamUnit::None,
                min as f32,
                max as f32,
                default as f32,
            )
        }
    }

    /// On/off switch.
    pub const fn toggle(
        name: &'static str,
        short_name: &'static str,
        string_id: &'static str,
        default: bool,
    ) -> Self {
        Self {
            kind: ParamKind::Bool,
            ..Self::float(
                name,
                short_name,
                string_id,
                ParamUnit::None,
                0.0,
                1.0,
                if default { 1.0 } else { 0.0 },
            )
        }
    }

    /// Choice among fixed labels; the plain value is the label index.
    pub const fn choice(
        name: &'static str,
        short_name: &'static str,
        string_id: &'static str,
        labels: &'static [&'static str],
        default: usize,
    ) -> Self {
        Self {
            kind: ParamKind::Choice(labels),
            ..Self::float(
                name,
                short_name,
                string_id,
                ParamUnit::None,
                0.0,
                (labels.len() - 1) as f32,
                default as f32,
            )
        }
    }

    /// Builder: set the normalization curve.
    pub const fn with_scale(mut self, scale: ParamScale) -> Self {
        self.scale = scale;
        self
    }

    /// Builder: set the group.
    pub const fn with_group(mut self, group: &'static str) -> Self {
        self.group = group;
        self
    }

    /// Clamp to `[min, max]`.
    ///
    /// ```rust
    /// use attila_core::ParamDescriptor;
    ///
    /// let desc = ParamDescriptor::gain_db("Gain", "Gain", "gain", -60.0, 6.0, 0.0);
    /// assert_eq!(desc.clamp(-100.0), -60.0);
    /// assert_eq!(desc.clamp(100.0), 6.0);
    /// ```
    #[inline]
    pub fn clamp(&self, value: f32) -> f32 {
        if value < self.min {
            self.min
        } else if value > self.max {
            self.max
        } else {
            value
        }
    }

    /// Whether `value` lies inside `[min, max]`.
    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }

    /// Typed value for a plain input, clamped and snapped to the kind.
    ///
    /// Integer kinds truncate toward negative infinity after clamping; a bool
    /// is on at `>= 0.5`.
    pub fn value(&self, plain: f32) -> ParamValue {
        let v = self.clamp(plain);
        match self.kind {
            ParamKind::Float => ParamValue::Float(v),
            ParamKind::Int => ParamValue::Int(floorf(v) as i32),
            ParamKind::Bool => ParamValue::Bool(v >= 0.5),
            ParamKind::Choice(_) => ParamValue::Choice(floorf(v) as usize),
        }
    }

    /// Default as a typed value.
    pub fn default_value(&self) -> ParamValue {
        self.value(self.default)
    }

    /// Label of a choice index, if this is a choice parameter.
    pub fn choice_label(&self, index: usize) -> Option<&'static str> {
        match self.kind {
            ParamKind::Choice(labels) => labels.get(index).copied(),
            _ => None,
        }
    }

    /// Plain value to `[0, 1]`, respecting [`ParamScale`].
    #[inline]
    pub fn normalize(&self, value: f32) -> f32 {
        let range = self.max - self.min;
        if range == 0.0 {
            return 0.0;
        }
        match self.scale {
            ParamScale::Linear => (value - self.min) / range,
            ParamScale::Power(exp) => powf((value - self.min) / range, 1.0 / exp),
        }
    }

    /// Inverse of [`normalize`](Self::normalize).
    #[inline]
    pub fn denormalize(&self, normalized: f32) -> f32 {
        match self.scale {
            ParamScale::Linear => self.min + normalized * (self.max - self.min),
            ParamScale::Power(exp) => self.min + powf(normalized, exp) * (self.max - self.min),
        }
    }
}
