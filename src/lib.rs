//! # bioseg
//!
//! Configuration schema and volume processing utilities for a bio-image
//! segmentation pipeline.
//!
//! The pipeline runs in five stages over a microscopy volume:
//! preprocessing, CNN prediction, CNN post-processing, segmentation, and
//! segmentation post-processing. Each stage is toggled and parameterized by
//! one section of a YAML configuration document. This crate provides the
//! typed schema for that document, its validation rules, and the volume
//! primitives the locally-run stages are built from (cropping, rescaling,
//! smoothing, label relabeling, patch slicing). Prediction and the
//! graph-partitioning segmentation algorithms themselves run in external
//! engines and are out of scope here.
//!
//! ## Modules
//!
//! * [`core`] - Configuration schema, validation, and error handling
//! * [`processors`] - Volume processing primitives
//! * [`pipeline`] - Stage planning and execution of the local stages
//! * [`utils`] - Input classification and logging setup
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bioseg::prelude::*;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConfigLoader::load_from_file(Path::new("config.yaml"))?;
//! let plan = PipelinePlan::from_config(config)?;
//!
//! for stage in plan.stages() {
//!     println!("will run: {stage}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ### Building a configuration in code
//!
//! ```rust
//! use bioseg::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PipelineConfig::new("dataset/sample_ovules.h5");
//! let plan = PipelinePlan::from_config(config)?;
//! assert_eq!(plan.stages().len(), 5);
//! # Ok(())
//! # }
//! ```

// Core modules
pub mod core;
pub mod pipeline;
pub mod processors;
pub mod utils;

/// Prelude module for convenient imports.
///
/// Bring the essentials into scope with a single use statement:
///
/// ```rust
/// use bioseg::prelude::*;
/// ```
///
/// Included items focus on the most common tasks:
/// - Configuration (`PipelineConfig`, `ConfigLoader`, `ConfigValidator`)
/// - Planning (`PipelinePlan`, `StageKind`)
/// - Essential error and result types (`SegError`, `SegResult`)
///
/// For the individual volume primitives, import directly from
/// `bioseg::processors`.
pub mod prelude {
    // Configuration (essential)
    pub use crate::core::config::{ConfigLoader, ConfigValidator, PipelineConfig};

    // Planning (essential)
    pub use crate::pipeline::{PipelinePlan, StageKind};

    // Error handling (essential)
    pub use crate::core::{SegError, SegResult};
}
