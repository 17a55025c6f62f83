//! Configuration file loading utilities.
//!
//! Loads a [`PipelineConfig`] from YAML (the reference format) or JSON,
//! auto-detecting the format from the file extension.

use super::stages::PipelineConfig;
use crate::core::errors::SegError;
use std::path::Path;

/// Configuration file format
#[derive(Debug, Clone, Copy)]
pub enum ConfigFormat {
    /// YAML format
    Yaml,
    /// JSON format
    Json,
}

impl ConfigFormat {
    /// Detect format from file extension
    pub fn from_extension(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "yaml" | "yml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Configuration loader for the segmentation pipeline
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a file, auto-detecting the format from the extension
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// A Result containing the loaded PipelineConfig or a SegError
    pub fn load_from_file(path: &Path) -> Result<PipelineConfig, SegError> {
        let format = ConfigFormat::from_extension(path).ok_or_else(|| SegError::Config {
            message: format!("Unsupported config file extension: {:?}", path.extension()),
        })?;

        let content = std::fs::read_to_string(path).map_err(|e| SegError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        Self::load_from_string(&content, format)
    }

    /// Load configuration from a string with specified format
    pub fn load_from_string(
        content: &str,
        format: ConfigFormat,
    ) -> Result<PipelineConfig, SegError> {
        match format {
            ConfigFormat::Yaml => Self::load_from_yaml(content),
            ConfigFormat::Json => Self::load_from_json(content),
        }
    }

    /// Load configuration from YAML string
    pub fn load_from_yaml(content: &str) -> Result<PipelineConfig, SegError> {
        serde_yaml::from_str(content).map_err(|e| SegError::Config {
            message: format!("Failed to parse YAML config: {e}"),
        })
    }

    /// Load configuration from JSON string
    pub fn load_from_json(content: &str) -> Result<PipelineConfig, SegError> {
        serde_json::from_str(content).map_err(|e| SegError::Config {
            message: format!("Failed to parse JSON config: {e}"),
        })
    }

    /// Save configuration to a file, auto-detecting the format from the extension
    pub fn save_to_file(config: &PipelineConfig, path: &Path) -> Result<(), SegError> {
        let format = ConfigFormat::from_extension(path).ok_or_else(|| SegError::Config {
            message: format!("Unsupported config file extension: {:?}", path.extension()),
        })?;

        let content = Self::save_to_string(config, format)?;

        std::fs::write(path, content).map_err(|e| SegError::Config {
            message: format!("Failed to write config file {}: {}", path.display(), e),
        })
    }

    /// Save configuration to string with specified format
    pub fn save_to_string(
        config: &PipelineConfig,
        format: ConfigFormat,
    ) -> Result<String, SegError> {
        match format {
            ConfigFormat::Yaml => Self::save_to_yaml(config),
            ConfigFormat::Json => Self::save_to_json(config),
        }
    }

    /// Save configuration to YAML string
    pub fn save_to_yaml(config: &PipelineConfig) -> Result<String, SegError> {
        serde_yaml::to_string(config).map_err(|e| SegError::Config {
            message: format!("Failed to serialize config to YAML: {e}"),
        })
    }

    /// Save configuration to JSON string
    pub fn save_to_json(config: &PipelineConfig) -> Result<String, SegError> {
        serde_json::to_string_pretty(config).map_err(|e| SegError::Config {
            message: format!("Failed to serialize config to JSON: {e}"),
        })
    }
}
