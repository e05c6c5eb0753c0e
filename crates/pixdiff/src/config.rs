//! Comparison configuration (YAML).
//!
//! ```yaml
//! strategy:
//!   type: cluster
//!   threshold: 2
//!   block_size: 3
//! color: red            # or { red: 1.0, green: 0.5, blue: 0.0 }
//! record_difference: true
//! backend: auto
//! ```
//!
//! Every key is optional; defaults are an exact comparison with threshold 0,
//! a green overlay, difference recording enabled and automatic backend
//! selection.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use pixdiff_compute::Backend;
use pixdiff_core::{Error, MismatchColor, Result};

use crate::comparator::CompareOptions;
use crate::strategy::Strategy;

/// Named overlay presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorPreset {
    /// [`MismatchColor::RED`]
    Red,
    /// [`MismatchColor::GREEN`]
    Green,
    /// [`MismatchColor::BLUE`]
    Blue,
}

impl From<ColorPreset> for MismatchColor {
    fn from(preset: ColorPreset) -> Self {
        match preset {
            ColorPreset::Red => MismatchColor::RED,
            ColorPreset::Green => MismatchColor::GREEN,
            ColorPreset::Blue => MismatchColor::BLUE,
        }
    }
}

/// Overlay color as a preset name or explicit components.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorSetting {
    /// `red`, `green` or `blue`
    Preset(ColorPreset),
    /// `{ red, green, blue }` components in [0, 1]
    Rgb(MismatchColor),
}

impl Default for ColorSetting {
    fn default() -> Self {
        Self::Preset(ColorPreset::Green)
    }
}

impl ColorSetting {
    /// Resolved overlay color.
    pub fn color(&self) -> MismatchColor {
        match *self {
            Self::Preset(p) => p.into(),
            Self::Rgb(c) => c,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_backend() -> String {
    Backend::Auto.name().to_string()
}

/// Serializable comparison settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompareConfig {
    /// Tolerance strategy.
    pub strategy: Strategy,
    /// Overlay color for difference images.
    pub color: ColorSetting,
    /// Produce a difference image when the comparison is rejected.
    #[serde(default = "default_true")]
    pub record_difference: bool,
    /// Execution backend name (`auto`, `cpu`, `scalar`).
    #[serde(default = "default_backend")]
    pub backend: String,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::default(),
            color: ColorSetting::default(),
            record_difference: true,
            backend: default_backend(),
        }
    }
}

impl CompareConfig {
    /// Parses a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml).map_err(|e| Error::config(e.to_string()))?;
        debug!(strategy = config.strategy.name(), backend = %config.backend, "config parsed");
        Ok(config)
    }

    /// Reads and parses a YAML file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&text)
    }

    /// Serializes the configuration to YAML.
    pub fn to_yaml_string(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| Error::config(e.to_string()))
    }

    /// Resolves the backend name.
    pub fn backend(&self) -> Result<Backend> {
        Backend::from_name(&self.backend).ok_or_else(|| {
            Error::configuration("config", "backend", &self.backend, "auto, cpu or scalar")
        })
    }

    /// Options for [`Comparator::compare_with`](crate::Comparator::compare_with).
    pub fn options(&self) -> CompareOptions {
        CompareOptions {
            strategy: self.strategy,
            color: self.color.color(),
            record_difference: self.record_difference,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_document() {
        let config = CompareConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, CompareConfig::default());
        assert_eq!(config.backend().unwrap(), Backend::Auto);
        assert_eq!(config.options().color, MismatchColor::GREEN);
        assert!(config.record_difference);
    }

    #[test]
    fn test_full_document() {
        let yaml = r#"
strategy:
  type: perceptual_precision
  threshold: 5
  perceptual_precision: 0.98
color: red
record_difference: false
backend: scalar
"#;
        let config = CompareConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(
            config.strategy,
            Strategy::PerceptualPrecision {
                threshold: 5,
                perceptual_precision: 0.98
            }
        );
        assert_eq!(config.color.color(), MismatchColor::RED);
        assert!(!config.record_difference);
        assert_eq!(config.backend().unwrap(), Backend::Scalar);
    }

    #[test]
    fn test_strategy_field_defaults() {
        let config = CompareConfig::from_yaml_str("strategy: { type: cluster }").unwrap();
        assert_eq!(
            config.strategy,
            Strategy::Cluster {
                threshold: 0,
                block_size: 1
            }
        );
    }

    #[test]
    fn test_custom_color() {
        let config =
            CompareConfig::from_yaml_str("color: { red: 1.0, green: 0.5, blue: 0.0 }").unwrap();
        assert_eq!(config.color.color(), MismatchColor::new(1.0, 0.5, 0.0));
    }

    #[test]
    fn test_yaml_roundtrip() {
        let config = CompareConfig {
            strategy: Strategy::PerceptualRatio {
                pixel_fraction: 0.5,
                perceptual_precision: 0.75,
            },
            color: ColorSetting::Preset(ColorPreset::Blue),
            record_difference: false,
            backend: "cpu".into(),
        };
        let yaml = config.to_yaml_string().unwrap();
        assert_eq!(CompareConfig::from_yaml_str(&yaml).unwrap(), config);
    }

    #[test]
    fn test_bad_documents() {
        let err = CompareConfig::from_yaml_str("strategy: { type: fuzzy }").unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let config = CompareConfig::from_yaml_str("backend: gpu").unwrap();
        assert!(config.backend().unwrap_err().is_configuration_error());
    }
}
