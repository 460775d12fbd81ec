//! Render configuration file format.

use attila_core::{DEFAULT_SMOOTHING_MS, OversampleFactor};
use attila_effects::{ParamKey, ParameterSnapshot, SharedParams};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::ConfigError;
use crate::validation::{
    ParamPolicy, ValidationError, ValidationResult, validate_oversample_factor, validate_value,
};
use crate::value::parse_param_value;

/// Engine settings of a render.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Oversampling multiplier: 1, 2, 4 or 8.
    pub oversample_factor: usize,
    /// Host block size in samples.
    pub block_size: usize,
    /// Control smoothing time in milliseconds.
    pub smoothing_ms: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            oversample_factor: OversampleFactor::default().multiplier(),
            block_size: 512,
            smoothing_ms: DEFAULT_SMOOTHING_MS,
        }
    }
}

/// One parameter value as written in a config file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ParamSetting {
    /// `bypass1 = true`
    Toggle(bool),
    /// `drive1 = 12` or `knee2 = 3.5`
    Number(f32),
    /// `midHighCut = "4.5kHz"`, `curve3 = "Tanh"`
    Text(String),
}

impl ParamSetting {
    /// Plain value for `key`, validated.
    pub fn resolve(&self, key: ParamKey, policy: ParamPolicy) -> ValidationResult<f32> {
        match self {
            ParamSetting::Toggle(on) => validate_value(key, if *on { 1.0 } else { 0.0 }, policy),
            ParamSetting::Number(v) => validate_value(key, *v, policy),
            ParamSetting::Text(text) => parse_param_value(key, text, policy),
        }
    }
}

impl From<f32> for ParamSetting {
    fn from(v: f32) -> Self {
        ParamSetting::Number(v)
    }
}

impl From<bool> for ParamSetting {
    fn from(v: bool) -> Self {
        ParamSetting::Toggle(v)
    }
}

impl From<&str> for ParamSetting {
    fn from(v: &str) -> Self {
        ParamSetting::Text(v.to_string())
    }
}

/// Settings for an offline render: engine configuration plus parameter
/// overrides by string id.
///
/// # TOML Format
///
/// ```toml
/// [engine]
/// oversample_factor = 4
/// block_size = 512
/// smoothing_ms = 20.0
///
/// [params]
/// drive1 = 12
/// knee2 = 3.5
/// bit3 = 8
/// curve3 = "Tanh"
/// midHighCut = "4.5kHz"
/// bypass2 = true
/// ```
///
/// Parameters not listed keep their defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RenderConfig {
    /// Engine settings.
    #[serde(default)]
    pub engine: EngineConfig,

    /// Parameter overrides, id → value.
    #[serde(default)]
    pub params: BTreeMap<String, ParamSetting>,
}

impl RenderConfig {
    /// Default engine, no overrides.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a parameter override.
    pub fn with_param(mut self, id: impl Into<String>, value: impl Into<ParamSetting>) -> Self {
        self.params.insert(id.into(), value.into());
        self
    }

    /// Set the oversampling multiplier.
    pub fn with_oversample_factor(mut self, multiplier: usize) -> Self {
        self.engine.oversample_factor = multiplier;
        self
    }

    /// Set the block size.
    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.engine.block_size = block_size;
        self
    }

    /// Load from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Parse from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save to a TOML file, creating the parent directory if needed.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }
        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Oversampling factor, validated.
    pub fn oversample_factor(&self) -> Result<OversampleFactor, ConfigError> {
        let m = self.engine.oversample_factor;
        validate_oversample_factor(m)?;
        OversampleFactor::from_multiplier(m).ok_or_else(|| {
            ValidationError::InvalidEngine {
                setting: "oversample_factor",
                reason: format!("{m} is not supported"),
            }
            .into()
        })
    }

    /// Validate engine settings and resolve every override to
    /// `(key, plain value)`. All problems are reported together.
    pub fn resolve_params(&self, policy: ParamPolicy) -> Result<Vec<(ParamKey, f32)>, ConfigError> {
        let mut errors = Vec::new();
        if let Err(ConfigError::Validation(e)) = self.oversample_factor() {
            errors.push(e);
        }
        if self.engine.block_size == 0 {
            errors.push(ValidationError::InvalidEngine {
                setting: "block_size",
                reason: "must be at least 1 sample".to_string(),
            });
        }
        if !(self.engine.smoothing_ms.is_finite() && self.engine.smoothing_ms >= 0.0) {
            errors.push(ValidationError::InvalidEngine {
                setting: "smoothing_ms",
                reason: format!("{} ms must be zero or positive", self.engine.smoothing_ms),
            });
        }

        let mut resolved = Vec::with_capacity(self.params.len());
        for (id, setting) in &self.params {
            let Some(key) = ParamKey::from_id(id) else {
                errors.push(ValidationError::UnknownParameter(id.clone()));
                continue;
            };
            match setting.resolve(key, policy) {
                Ok(v) => resolved.push((key, v)),
                Err(e) => errors.push(e),
            }
        }

        match errors.len() {
            0 => Ok(resolved),
            1 => Err(errors.remove(0).into()),
            _ => Err(ValidationError::Multiple(errors).into()),
        }
    }

    /// Check the whole configuration.
    pub fn validate(&self, policy: ParamPolicy) -> Result<(), ConfigError> {
        self.resolve_params(policy).map(|_| ())
    }

    /// Write the overrides into a snapshot.
    pub fn apply_to_snapshot(
        &self,
        snapshot: &mut ParameterSnapshot,
        policy: ParamPolicy,
    ) -> Result<(), ConfigError> {
        for (key, value) in self.resolve_params(policy)? {
            snapshot.set(key, value);
        }
        Ok(())
    }

    /// Write the overrides into a live parameter store.
    pub fn apply_to_shared(
        &self,
        shared: &SharedParams,
        policy: ParamPolicy,
    ) -> Result<(), ConfigError> {
        for (key, value) in self.resolve_params(policy)? {
            shared.set(key, value);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXAMPLE: &str = r#"
[engine]
oversample_factor = 2
block_size = 256

[params]
drive1 = 12
knee2 = 3.5
bit3 = 8
curve3 = "Tanh"
midHighCut = "4.5kHz"
bypass2 = true
"#;

    #[test]
    fn parses_example() {
        let config = RenderConfig::from_toml(EXAMPLE).unwrap();
        assert_eq!(config.engine.oversample_factor, 2);
        assert_eq!(config.engine.block_size, 256);
        assert_eq!(config.engine.smoothing_ms, DEFAULT_SMOOTHING_MS);
        assert_eq!(config.params.len(), 6);
        assert_eq!(config.params["bypass2"], ParamSetting::Toggle(true));
        assert_eq!(config.oversample_factor().unwrap(), OversampleFactor::X2);
    }

    #[test]
    fn empty_config_is_default() {
        let config = RenderConfig::from_toml("").unwrap();
        assert_eq!(config, RenderConfig::default());
        assert_eq!(config.oversample_factor().unwrap(), OversampleFactor::X4);
    }

    #[test]
    fn applies_to_snapshot() {
        let config = RenderConfig::from_toml(EXAMPLE).unwrap();
        let mut snap = ParameterSnapshot::new(48000.0, 256, 2);
        config.apply_to_snapshot(&mut snap, ParamPolicy::Reject).unwrap();
        assert_eq!(snap.get_by_id("drive1"), Some(12.0));
        assert_eq!(snap.get_by_id("curve3"), Some(2.0));
        assert_eq!(snap.get_by_id("midHighCut"), Some(4500.0));
        assert_eq!(snap.get_by_id("bypass2"), Some(1.0));
        assert_eq!(snap.get_by_id("drive2"), Some(0.0));
    }

    #[test]
    fn applies_to_shared_store() {
        let config = RenderConfig::new().with_param("mix", "50%");
        let shared = SharedParams::new();
        config.apply_to_shared(&shared, ParamPolicy::Reject).unwrap();
        assert_eq!(shared.get(ParamKey::from_id("mix").unwrap()), 50.0);
        assert!(shared.take_dirty());
    }

    #[test]
    fn reports_every_problem() {
        let config = RenderConfig::new()
            .with_oversample_factor(3)
            .with_param("drive7", 1.0)
            .with_param("knee1", 100.0);
        let err = config.validate(ParamPolicy::Reject).unwrap_err();
        match err {
            ConfigError::Validation(ValidationError::Multiple(errs)) => assert_eq!(errs.len(), 3),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn clamp_policy_accepts_out_of_range() {
        let config = RenderConfig::new().with_param("knee1", 100.0);
        let resolved = config.resolve_params(ParamPolicy::Clamp).unwrap();
        assert_eq!(resolved, vec![(ParamKey::from_id("knee1").unwrap(), 48.0)]);
    }

    #[test]
    fn toml_round_trip() {
        let config = RenderConfig::new()
            .with_block_size(128)
            .with_param("drive2", 6.0)
            .with_param("curve2", "Fuzz")
            .with_param("bypass", false);
        let text = config.to_toml().unwrap();
        assert_eq!(RenderConfig::from_toml(&text).unwrap(), config);
    }
}
