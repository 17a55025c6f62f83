//! The core module of the segmentation pipeline.
//!
//! This module contains the fundamental components of the pipeline:
//! - Configuration management and validation
//! - Error handling
//!
//! It also re-exports the commonly used types for convenience.

pub mod config;
pub mod errors;

pub use config::{
    ConfigError, ConfigFormat, ConfigLoader, ConfigValidator, ConfigValidatorExt, PipelineConfig,
};
pub use errors::{ProcessingStage, SegError, SegResult};
