//! Configuration error types and validation traits.

use std::path::Path;
use thiserror::Error;

/// Errors that can occur during configuration validation.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Error indicating that an input path does not exist.
    #[error("input path does not exist: {path}")]
    InputPathNotFound { path: std::path::PathBuf },

    /// Error indicating that a configuration value is invalid.
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Error indicating that validation failed.
    #[error("validation failed: {message}")]
    ValidationFailed { message: String },
}

/// A trait for validating pipeline configuration parameters.
///
/// Provides the per-stage `validate` entry point plus reusable checks for
/// the value shapes that recur across stages: per-axis factors, spline
/// interpolation orders, unit-interval thresholds, and patch triples.
pub trait ConfigValidator {
    /// Validates the configuration.
    ///
    /// # Returns
    ///
    /// A Result indicating success or a ConfigError if validation fails.
    fn validate(&self) -> Result<(), ConfigError>;

    /// Returns the default configuration.
    fn get_defaults() -> Self
    where
        Self: Sized;

    /// Validates a per-axis rescaling factor.
    ///
    /// Each of the three components must be finite and strictly positive.
    fn validate_factor(&self, factor: &[f64; 3], field_name: &str) -> Result<(), ConfigError> {
        for (axis, &f) in factor.iter().enumerate() {
            if !f.is_finite() || f <= 0.0 {
                return Err(ConfigError::InvalidConfig {
                    message: format!(
                        "{} must be positive and finite on every axis, got {} on axis {}",
                        field_name, f, axis
                    ),
                });
            }
        }
        Ok(())
    }

    /// Validates a spline interpolation order (degree 0 through 5).
    fn validate_spline_order(&self, order: u8, field_name: &str) -> Result<(), ConfigError> {
        if order > 5 {
            Err(ConfigError::InvalidConfig {
                message: format!("{} must be in 0..=5, got {}", field_name, order),
            })
        } else {
            Ok(())
        }
    }

    /// Validates a value expected to lie in the closed unit interval.
    fn validate_unit_interval(&self, value: f64, field_name: &str) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&value) {
            Err(ConfigError::InvalidConfig {
                message: format!(
                    "{} must be between 0.0 and 1.0, got {}",
                    field_name, value
                ),
            })
        } else {
            Ok(())
        }
    }

    /// Validates a float value is non-negative and finite.
    fn validate_non_negative_f64(&self, value: f64, field_name: &str) -> Result<(), ConfigError> {
        if !value.is_finite() || value < 0.0 {
            Err(ConfigError::InvalidConfig {
                message: format!("{} must be >= 0, got {}", field_name, value),
            })
        } else {
            Ok(())
        }
    }

    /// Validates a patch/stride/padding triple: every axis must be positive.
    fn validate_positive_triple(
        &self,
        triple: &[usize; 3],
        field_name: &str,
    ) -> Result<(), ConfigError> {
        for (axis, &v) in triple.iter().enumerate() {
            if v == 0 {
                return Err(ConfigError::InvalidConfig {
                    message: format!(
                        "{} must be positive on every axis, got 0 on axis {}",
                        field_name, axis
                    ),
                });
            }
        }
        Ok(())
    }

    /// Validates a usize value is positive.
    fn validate_positive_usize(&self, value: usize, field_name: &str) -> Result<(), ConfigError> {
        if value == 0 {
            Err(ConfigError::InvalidConfig {
                message: format!("{} must be greater than 0, got {}", field_name, value),
            })
        } else {
            Ok(())
        }
    }

    /// Validates that an input path exists on disk.
    fn validate_input_path(&self, path: &Path) -> Result<(), ConfigError> {
        if !path.exists() {
            Err(ConfigError::InputPathNotFound {
                path: path.to_path_buf(),
            })
        } else {
            Ok(())
        }
    }
}

/// Extension trait for ConfigValidator that provides error wrapping utilities.
///
/// Extends ConfigValidator with a convenient method for wrapping validation
/// errors into the crate-level SegError, removing the repeated
/// `config.validate().map_err(...)` pattern at call sites.
pub trait ConfigValidatorExt: ConfigValidator {
    /// Validates configuration and wraps any errors into SegError::Config.
    fn validate_and_wrap_seg_error(self) -> Result<Self, crate::core::errors::SegError>
    where
        Self: Sized,
    {
        self.validate()
            .map_err(|e| crate::core::errors::SegError::Config {
                message: e.to_string(),
            })?;
        Ok(self)
    }
}

// Blanket implementation for all ConfigValidator types
impl<T: ConfigValidator> ConfigValidatorExt for T {}

impl From<ConfigError> for String {
    /// Converts a ConfigError to a String.
    fn from(error: ConfigError) -> Self {
        error.to_string()
    }
}
