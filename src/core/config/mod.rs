//! Configuration management for the segmentation pipeline.
//!
//! This module provides the typed stage configuration, validation traits,
//! and file loading utilities.

pub mod errors;
pub mod loader;
pub mod stages;

// Re-export commonly used types
pub use errors::{ConfigError, ConfigValidator, ConfigValidatorExt};
pub use loader::{ConfigFormat, ConfigLoader};
pub use stages::{
    CnnPostprocessingConfig, CnnPredictionConfig, Device, FilterConfig, FilterType,
    PipelineConfig, PreprocessingConfig, SegmentationAlgorithm, SegmentationConfig,
    SegmentationPostprocessingConfig,
};
