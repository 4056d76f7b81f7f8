//! Configuration types for infer-rs.

use serde::Deserialize;

use crate::inference::Device;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Model configuration.
    #[serde(default)]
    pub model: ModelSection,

    /// Inference configuration.
    #[serde(default)]
    pub inference: InferenceSection,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSection,
}

/// Model configuration.
#[derive(Debug, Deserialize)]
pub struct ModelSection {
    /// Path to the model file.
    #[serde(default)]
    pub path: Option<String>,

    /// Device to load model on.
    #[serde(default = "default_device")]
    pub device: String,
}

impl Default for ModelSection {
    fn default() -> Self {
        Self {
            path: None,
            device: default_device(),
        }
    }
}

/// Inference configuration.
#[derive(Debug, Deserialize)]
pub struct InferenceSection {
    /// Number of highest-probability classes to report.
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

impl Default for InferenceSection {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
pub struct LoggingSection {
    /// Maximum level: error, warn, info, debug or trace.
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_device() -> String {
    "cpu".to_string()
}

fn default_top_k() -> usize {
    3
}

fn default_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<std::path::Path>) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from a YAML string.
    pub fn from_yaml_str(yaml: &str) -> crate::error::Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Parse the configured device.
    pub fn device(&self) -> crate::error::Result<Device> {
        self.model.device.parse()
    }

    /// Parse the configured log level.
    pub fn log_level(&self) -> crate::error::Result<tracing::Level> {
        self.logging.level.parse().map_err(|_| {
            crate::error::InferError::config(format!("Invalid log level: {}", self.logging.level))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::from_yaml_str("{}").unwrap();
        assert_eq!(config.device().unwrap(), Device::Cpu);
        assert_eq!(config.inference.top_k, 3);
        assert_eq!(config.log_level().unwrap(), tracing::Level::INFO);
        assert!(config.model.path.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_yaml_str(
            "model:\n  path: iris.infm\n  device: MOCK\ninference:\n  top_k: 1\nlogging:\n  level: debug\n",
        )
        .unwrap();
        assert_eq!(config.model.path.as_deref(), Some("iris.infm"));
        assert_eq!(config.device().unwrap(), Device::Mock);
        assert_eq!(config.inference.top_k, 1);
        assert_eq!(config.log_level().unwrap(), tracing::Level::DEBUG);
    }

    #[test]
    fn test_invalid_values() {
        let config = Config::from_yaml_str("model:\n  device: tpu\nlogging:\n  level: loud\n").unwrap();
        assert!(config.device().is_err());
        assert!(config.log_level().is_err());
        assert!(Config::from_yaml_str("inference: [1, 2]").is_err());
    }
}
