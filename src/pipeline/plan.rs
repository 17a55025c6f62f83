//! Stage resolution: from a validated configuration to an ordered plan.

use crate::core::config::errors::{ConfigValidator, ConfigValidatorExt};
use crate::core::config::stages::PipelineConfig;
use crate::core::errors::{SegError, SegResult};
use tracing::info;

/// The pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageKind {
    Preprocessing,
    CnnPrediction,
    CnnPostprocessing,
    Segmentation,
    SegmentationPostprocessing,
}

/// Fixed execution order of the pipeline.
pub const STAGE_ORDER: [StageKind; 5] = [
    StageKind::Preprocessing,
    StageKind::CnnPrediction,
    StageKind::CnnPostprocessing,
    StageKind::Segmentation,
    StageKind::SegmentationPostprocessing,
];

impl std::fmt::Display for StageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StageKind::Preprocessing => write!(f, "preprocessing"),
            StageKind::CnnPrediction => write!(f, "cnn_prediction"),
            StageKind::CnnPostprocessing => write!(f, "cnn_postprocessing"),
            StageKind::Segmentation => write!(f, "segmentation"),
            StageKind::SegmentationPostprocessing => {
                write!(f, "segmentation_postprocessing")
            }
        }
    }
}

/// An ordered, dependency-checked execution plan.
///
/// Building a plan validates the configuration and resolves which stages
/// are enabled. A post-processing stage without the stage that produces its
/// input is a configuration error: predictions cannot be post-processed
/// without a prediction, and likewise for the segmentation.
#[derive(Debug, Clone)]
pub struct PipelinePlan {
    config: PipelineConfig,
    stages: Vec<StageKind>,
}

impl PipelinePlan {
    /// Builds a plan from a configuration.
    pub fn from_config(config: PipelineConfig) -> SegResult<Self> {
        let config = config.validate_and_wrap_seg_error()?;

        if config.cnn_postprocessing.state && !config.cnn_prediction.state {
            return Err(SegError::config(
                "cnn_postprocessing is enabled but cnn_prediction is not",
            ));
        }
        if config.segmentation_postprocessing.state && !config.segmentation.state {
            return Err(SegError::config(
                "segmentation_postprocessing is enabled but segmentation is not",
            ));
        }

        let stages: Vec<StageKind> = STAGE_ORDER
            .into_iter()
            .filter(|kind| Self::stage_enabled(&config, *kind))
            .collect();

        if stages.is_empty() {
            return Err(SegError::config("every pipeline stage is disabled"));
        }

        for stage in &stages {
            info!(stage = %stage, "stage scheduled");
        }

        Ok(Self { config, stages })
    }

    fn stage_enabled(config: &PipelineConfig, kind: StageKind) -> bool {
        match kind {
            StageKind::Preprocessing => config.preprocessing.state,
            StageKind::CnnPrediction => config.cnn_prediction.state,
            StageKind::CnnPostprocessing => config.cnn_postprocessing.state,
            StageKind::Segmentation => config.segmentation.state,
            StageKind::SegmentationPostprocessing => config.segmentation_postprocessing.state,
        }
    }

    /// The enabled stages, in execution order.
    pub fn stages(&self) -> &[StageKind] {
        &self.stages
    }

    /// Whether a stage is part of the plan.
    pub fn is_enabled(&self, kind: StageKind) -> bool {
        self.stages.contains(&kind)
    }

    /// The validated configuration backing the plan.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }
}

// Validation happens in from_config; the impl makes plans usable wherever a
// validated config is expected.
impl ConfigValidator for PipelinePlan {
    fn validate(&self) -> Result<(), crate::core::config::errors::ConfigError> {
        ConfigValidator::validate(&self.config)
    }

    fn get_defaults() -> Self {
        Self {
            config: PipelineConfig::get_defaults(),
            stages: STAGE_ORDER.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> PipelineConfig {
        PipelineConfig::new("dataset/sample_ovules.h5")
    }

    #[test]
    fn test_full_plan_order() {
        let plan = PipelinePlan::from_config(config()).unwrap();
        assert_eq!(plan.stages(), &STAGE_ORDER);
    }

    #[test]
    fn test_disabled_stages_are_skipped() {
        let mut cfg = config();
        cfg.preprocessing.state = false;
        cfg.segmentation.state = false;
        cfg.segmentation_postprocessing.state = false;

        let plan = PipelinePlan::from_config(cfg).unwrap();
        assert_eq!(
            plan.stages(),
            &[StageKind::CnnPrediction, StageKind::CnnPostprocessing]
        );
        assert!(!plan.is_enabled(StageKind::Preprocessing));
    }

    #[test]
    fn test_postprocessing_requires_producer() {
        let mut cfg = config();
        cfg.cnn_prediction.state = false;
        assert!(PipelinePlan::from_config(cfg).is_err());

        let mut cfg = config();
        cfg.segmentation.state = false;
        assert!(PipelinePlan::from_config(cfg).is_err());
    }

    #[test]
    fn test_all_disabled_is_an_error() {
        let mut cfg = config();
        cfg.preprocessing.state = false;
        cfg.cnn_prediction.state = false;
        cfg.cnn_postprocessing.state = false;
        cfg.segmentation.state = false;
        cfg.segmentation_postprocessing.state = false;
        assert!(PipelinePlan::from_config(cfg).is_err());
    }

    #[test]
    fn test_invalid_config_rejected_at_plan_time() {
        let mut cfg = config();
        cfg.segmentation.beta = 2.0;
        assert!(PipelinePlan::from_config(cfg).is_err());
    }

    #[test]
    fn test_stage_display_names_match_config_keys() {
        assert_eq!(StageKind::Preprocessing.to_string(), "preprocessing");
        assert_eq!(
            StageKind::SegmentationPostprocessing.to_string(),
            "segmentation_postprocessing"
        );
    }
}
