//! Stage planning and execution for the segmentation pipeline.
//!
//! A [`PipelinePlan`] turns a validated configuration into the ordered list
//! of enabled stages; the runner functions execute the stages that operate
//! on in-memory volumes.

pub mod plan;
pub mod runner;

pub use plan::{PipelinePlan, StageKind, STAGE_ORDER};
pub use runner::{
    prediction_windows, run_prediction_postprocessing, run_preprocessing,
    run_segmentation_postprocessing,
};
