//! Typed configuration for the five pipeline stages.
//!
//! The on-disk document is a nested mapping from stage name to stage
//! parameters, in pipeline order: `preprocessing`, `cnn_prediction`,
//! `cnn_postprocessing`, `segmentation`, `segmentation_postprocessing`,
//! plus the top-level input `path`. Every field carries a default matching
//! the reference configuration, so partial documents load; unknown keys
//! inside a stage are rejected.

use super::errors::{ConfigError, ConfigValidator};
use crate::processors::crop::CropSpec;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Compute device used for CNN prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    /// CUDA-capable GPU.
    Cuda,
    /// CPU fallback.
    Cpu,
}

impl std::fmt::Display for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Device::Cuda => write!(f, "cuda"),
            Device::Cpu => write!(f, "cpu"),
        }
    }
}

/// Smoothing filter applied during preprocessing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterType {
    /// Gaussian smoothing; `filter_param` is the sigma.
    Gaussian,
    /// Median filtering; `filter_param` is the footprint radius.
    Median,
}

/// Segmentation algorithm selected by the `segmentation.name` key.
///
/// The algorithms themselves run outside this crate; the name is validated
/// here so a typo fails at load time instead of halfway through a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SegmentationAlgorithm {
    #[serde(rename = "GASP")]
    Gasp,
    #[serde(rename = "MutexWS")]
    MutexWs,
    #[serde(rename = "MultiCut")]
    MultiCut,
    #[serde(rename = "DtWatershed")]
    DtWatershed,
}

impl std::fmt::Display for SegmentationAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SegmentationAlgorithm::Gasp => write!(f, "GASP"),
            SegmentationAlgorithm::MutexWs => write!(f, "MutexWS"),
            SegmentationAlgorithm::MultiCut => write!(f, "MultiCut"),
            SegmentationAlgorithm::DtWatershed => write!(f, "DtWatershed"),
        }
    }
}

fn default_unit_factor() -> [f64; 3] {
    [1.0, 1.0, 1.0]
}

/// Nested filter section of the preprocessing stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilterConfig {
    /// Whether the filter is applied.
    pub state: bool,
    /// The filter kind.
    #[serde(rename = "type")]
    pub filter_type: FilterType,
    /// Sigma (gaussian) or radius (median).
    pub filter_param: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            state: false,
            filter_type: FilterType::Gaussian,
            filter_param: 1.0,
        }
    }
}

impl ConfigValidator for FilterConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.validate_non_negative_f64(self.filter_param, "filter.filter_param")?;
        if self.state && self.filter_type == FilterType::Median && self.filter_param < 1.0 {
            return Err(ConfigError::InvalidConfig {
                message: format!(
                    "filter.filter_param must be >= 1 for a median filter, got {}",
                    self.filter_param
                ),
            });
        }
        Ok(())
    }

    fn get_defaults() -> Self {
        Self::default()
    }
}

/// Preprocessing stage: optional crop, rescaling, and smoothing of the raw
/// volume before prediction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PreprocessingConfig {
    /// Whether the stage runs.
    pub state: bool,
    /// Directory (relative to the input) where results are saved.
    pub save_directory: String,
    /// Per-axis (z, y, x) rescaling factor.
    pub factor: [f64; 3],
    /// Spline interpolation order used for rescaling.
    pub order: u8,
    /// Optional crop expression, e.g. `[:, 0:620, 420:1750]`.
    pub crop_volume: Option<String>,
    /// Optional smoothing filter.
    pub filter: FilterConfig,
}

impl Default for PreprocessingConfig {
    fn default() -> Self {
        Self {
            state: true,
            save_directory: "PreProcessing".to_string(),
            factor: default_unit_factor(),
            order: 2,
            crop_volume: None,
            filter: FilterConfig::default(),
        }
    }
}

impl PreprocessingConfig {
    /// Sets the per-axis rescaling factor.
    pub fn factor(mut self, factor: [f64; 3]) -> Self {
        self.factor = factor;
        self
    }

    /// Sets the crop expression.
    pub fn crop_volume(mut self, crop: impl Into<String>) -> Self {
        self.crop_volume = Some(crop.into());
        self
    }
}

impl ConfigValidator for PreprocessingConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.validate_factor(&self.factor, "preprocessing.factor")?;
        self.validate_spline_order(self.order, "preprocessing.order")?;
        if let Some(crop) = &self.crop_volume {
            CropSpec::parse(crop).map_err(|e| ConfigError::InvalidConfig {
                message: format!("preprocessing.crop_volume: {e}"),
            })?;
        }
        self.filter.validate()
    }

    fn get_defaults() -> Self {
        Self::default()
    }
}

/// CNN prediction stage: model selection, device, and the patch geometry
/// used for tiled inference.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CnnPredictionConfig {
    /// Whether the stage runs.
    pub state: bool,
    /// Name of the pretrained model.
    pub model_name: String,
    /// Compute device.
    pub device: Device,
    /// Patch shape (z, y, x) fed to the network.
    pub patch: [usize; 3],
    /// Stride between consecutive patches; must not exceed the patch.
    pub stride: [usize; 3],
    /// Halo added around each patch and trimmed from the prediction.
    pub patch_halo: [usize; 3],
    /// Model weights version, `best` or `last`.
    pub version: String,
    /// Whether to re-download updated model weights.
    pub model_update: bool,
    /// Reflective padding (z, y, x) applied to the volume before slicing.
    pub mirror_padding: [usize; 3],
    /// Number of data-loading workers.
    pub num_workers: usize,
}

impl Default for CnnPredictionConfig {
    fn default() -> Self {
        Self {
            state: true,
            model_name: "generic_confocal_3D_unet".to_string(),
            device: Device::Cuda,
            patch: [80, 160, 160],
            stride: [40, 80, 80],
            patch_halo: [8, 16, 16],
            version: "best".to_string(),
            model_update: false,
            mirror_padding: [16, 32, 32],
            num_workers: 8,
        }
    }
}

impl CnnPredictionConfig {
    /// Sets the compute device.
    pub fn device(mut self, device: Device) -> Self {
        self.device = device;
        self
    }

    /// Sets the patch shape.
    pub fn patch(mut self, patch: [usize; 3]) -> Self {
        self.patch = patch;
        self
    }

    /// Sets the patch stride.
    pub fn stride(mut self, stride: [usize; 3]) -> Self {
        self.stride = stride;
        self
    }
}

impl ConfigValidator for CnnPredictionConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.validate_positive_triple(&self.patch, "cnn_prediction.patch")?;
        self.validate_positive_triple(&self.stride, "cnn_prediction.stride")?;
        for axis in 0..3 {
            if self.stride[axis] > self.patch[axis] {
                return Err(ConfigError::InvalidConfig {
                    message: format!(
                        "cnn_prediction.stride must not exceed patch, got stride {} > patch {} on axis {}",
                        self.stride[axis], self.patch[axis], axis
                    ),
                });
            }
        }
        if self.version != "best" && self.version != "last" {
            return Err(ConfigError::InvalidConfig {
                message: format!(
                    "cnn_prediction.version must be 'best' or 'last', got '{}'",
                    self.version
                ),
            });
        }
        self.validate_positive_usize(self.num_workers, "cnn_prediction.num_workers")
    }

    fn get_defaults() -> Self {
        Self::default()
    }
}

/// Post-processing applied to the CNN prediction (rescale back, export).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CnnPostprocessingConfig {
    /// Whether the stage runs.
    pub state: bool,
    /// Whether to export the result as TIFF.
    pub tiff: bool,
    /// Output sample type, `data_uint8` or `data_float32`.
    pub output_type: String,
    /// Per-axis rescaling factor applied to the prediction.
    pub factor: [f64; 3],
    /// Spline interpolation order used for rescaling.
    pub order: u8,
    /// Whether to also save the raw (unscaled) prediction.
    pub save_raw: bool,
}

impl Default for CnnPostprocessingConfig {
    fn default() -> Self {
        Self {
            state: true,
            tiff: true,
            output_type: "data_float32".to_string(),
            factor: default_unit_factor(),
            order: 2,
            save_raw: false,
        }
    }
}

impl ConfigValidator for CnnPostprocessingConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.validate_factor(&self.factor, "cnn_postprocessing.factor")?;
        self.validate_spline_order(self.order, "cnn_postprocessing.order")?;
        if self.output_type != "data_uint8" && self.output_type != "data_float32" {
            return Err(ConfigError::InvalidConfig {
                message: format!(
                    "cnn_postprocessing.output_type must be 'data_uint8' or 'data_float32', got '{}'",
                    self.output_type
                ),
            });
        }
        Ok(())
    }

    fn get_defaults() -> Self {
        Self::default()
    }
}

/// Segmentation stage: algorithm selection plus the watershed seeding
/// parameters shared by the graph-partitioning algorithms.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SegmentationConfig {
    /// Whether the stage runs.
    pub state: bool,
    /// Segmentation algorithm.
    pub name: SegmentationAlgorithm,
    /// Under/over-segmentation bias in [0, 1].
    pub beta: f64,
    /// Directory (relative to the input) where results are saved.
    pub save_directory: String,
    /// Whether to seed the agglomeration with a watershed oversegmentation.
    pub run_ws: bool,
    /// Run the watershed per 2D slice instead of in 3D.
    #[serde(rename = "ws_2D")]
    pub ws_2d: bool,
    /// Boundary-probability threshold applied before the distance transform.
    pub ws_threshold: f64,
    /// Minimal size of a watershed superpixel, in voxels.
    pub ws_minsize: u64,
    /// Smoothing sigma for the watershed seed map.
    pub ws_sigma: f64,
    /// Smoothing sigma for the watershed weight map.
    pub ws_w_sigma: f64,
    /// Minimal size of a final segment, in voxels; 0 disables the filter.
    pub post_minsize: u64,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            state: true,
            name: SegmentationAlgorithm::Gasp,
            beta: 0.6,
            save_directory: "GASP".to_string(),
            run_ws: true,
            ws_2d: true,
            ws_threshold: 0.5,
            ws_minsize: 50,
            ws_sigma: 2.0,
            ws_w_sigma: 0.0,
            post_minsize: 50,
        }
    }
}

impl ConfigValidator for SegmentationConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.validate_unit_interval(self.beta, "segmentation.beta")?;
        self.validate_unit_interval(self.ws_threshold, "segmentation.ws_threshold")?;
        self.validate_non_negative_f64(self.ws_sigma, "segmentation.ws_sigma")?;
        self.validate_non_negative_f64(self.ws_w_sigma, "segmentation.ws_w_sigma")?;
        Ok(())
    }

    fn get_defaults() -> Self {
        Self::default()
    }
}

/// Post-processing applied to the segmentation (rescale back, export).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SegmentationPostprocessingConfig {
    /// Whether the stage runs.
    pub state: bool,
    /// Whether to export the result as TIFF.
    pub tiff: bool,
    /// Per-axis rescaling factor applied to the segmentation.
    pub factor: [f64; 3],
    /// Spline interpolation order; labels are resampled with order 0.
    pub order: u8,
    /// Whether to also save the raw (unscaled) segmentation.
    pub save_raw: bool,
}

impl Default for SegmentationPostprocessingConfig {
    fn default() -> Self {
        Self {
            state: true,
            tiff: true,
            factor: default_unit_factor(),
            order: 0,
            save_raw: false,
        }
    }
}

impl ConfigValidator for SegmentationPostprocessingConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.validate_factor(&self.factor, "segmentation_postprocessing.factor")?;
        self.validate_spline_order(self.order, "segmentation_postprocessing.order")
    }

    fn get_defaults() -> Self {
        Self::default()
    }
}

/// Top-level pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Path to the input volume (TIFF or HDF5), or a directory of inputs.
    pub path: PathBuf,
    /// Preprocessing stage.
    pub preprocessing: PreprocessingConfig,
    /// CNN prediction stage.
    pub cnn_prediction: CnnPredictionConfig,
    /// CNN post-processing stage.
    pub cnn_postprocessing: CnnPostprocessingConfig,
    /// Segmentation stage.
    pub segmentation: SegmentationConfig,
    /// Segmentation post-processing stage.
    pub segmentation_postprocessing: SegmentationPostprocessingConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::new(),
            preprocessing: PreprocessingConfig::default(),
            cnn_prediction: CnnPredictionConfig::default(),
            cnn_postprocessing: CnnPostprocessingConfig::default(),
            segmentation: SegmentationConfig::default(),
            segmentation_postprocessing: SegmentationPostprocessingConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Creates a configuration with default stage parameters for an input.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Sets the input path.
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = path.into();
        self
    }

    /// Validates every stage, including the input path if one is set.
    ///
    /// The path check is separate from the schema checks so that configs can
    /// be validated structurally before the data is staged.
    pub fn validate_with_path(&self) -> Result<(), ConfigError> {
        ConfigValidator::validate(self)?;
        crate::utils::paths::validate_input_path(&self.path)
    }
}

impl ConfigValidator for PipelineConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidConfig {
                message: "path must not be empty".to_string(),
            });
        }
        self.preprocessing.validate()?;
        self.cnn_prediction.validate()?;
        self.cnn_postprocessing.validate()?;
        self.segmentation.validate()?;
        self.segmentation_postprocessing.validate()
    }

    fn get_defaults() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> PipelineConfig {
        PipelineConfig::new("dataset/sample_ovules.h5")
    }

    #[test]
    fn test_defaults_validate() {
        assert!(ConfigValidator::validate(&config()).is_ok());
    }

    #[test]
    fn test_empty_path_rejected() {
        let cfg = PipelineConfig::default();
        assert!(ConfigValidator::validate(&cfg).is_err());
    }

    #[test]
    fn test_factor_shape_and_sign() {
        let mut cfg = config();
        cfg.preprocessing.factor = [1.0, 0.0, 1.0];
        assert!(ConfigValidator::validate(&cfg).is_err());

        cfg.preprocessing.factor = [2.0, 1.5, 1.5];
        assert!(ConfigValidator::validate(&cfg).is_ok());
    }

    #[test]
    fn test_spline_order_range() {
        let mut cfg = config();
        cfg.cnn_postprocessing.order = 6;
        assert!(ConfigValidator::validate(&cfg).is_err());
        cfg.cnn_postprocessing.order = 5;
        assert!(ConfigValidator::validate(&cfg).is_ok());
    }

    #[test]
    fn test_stride_must_not_exceed_patch() {
        let mut cfg = config();
        cfg.cnn_prediction.stride = [100, 80, 80];
        assert!(ConfigValidator::validate(&cfg).is_err());
    }

    #[test]
    fn test_unknown_version_rejected() {
        let mut cfg = config();
        cfg.cnn_prediction.version = "latest".to_string();
        assert!(ConfigValidator::validate(&cfg).is_err());
    }

    #[test]
    fn test_zero_workers_rejected() {
        let mut cfg = config();
        cfg.cnn_prediction.num_workers = 0;
        assert!(ConfigValidator::validate(&cfg).is_err());
    }

    #[test]
    fn test_watershed_ranges() {
        let mut cfg = config();
        cfg.segmentation.ws_threshold = 1.5;
        assert!(ConfigValidator::validate(&cfg).is_err());

        let mut cfg = config();
        cfg.segmentation.beta = -0.2;
        assert!(ConfigValidator::validate(&cfg).is_err());

        let mut cfg = config();
        cfg.segmentation.ws_minsize = 0;
        cfg.segmentation.post_minsize = 0;
        assert!(ConfigValidator::validate(&cfg).is_ok());
    }

    #[test]
    fn test_crop_volume_parse_checked() {
        let mut cfg = config();
        cfg.preprocessing.crop_volume = Some("[:, 0:620, 420:1750]".to_string());
        assert!(ConfigValidator::validate(&cfg).is_ok());

        cfg.preprocessing.crop_volume = Some("[:, 620:0]".to_string());
        assert!(ConfigValidator::validate(&cfg).is_err());
    }

    #[test]
    fn test_device_and_algorithm_serde_names() {
        let device: Device = serde_yaml::from_str("cuda").unwrap();
        assert_eq!(device, Device::Cuda);
        assert!(serde_yaml::from_str::<Device>("tpu").is_err());

        let algo: SegmentationAlgorithm = serde_yaml::from_str("GASP").unwrap();
        assert_eq!(algo, SegmentationAlgorithm::Gasp);
        assert_eq!(algo.to_string(), "GASP");
        assert!(serde_yaml::from_str::<SegmentationAlgorithm>("gasp").is_err());
    }

    #[test]
    fn test_unknown_stage_key_rejected() {
        let yaml = "state: true\nbogus_key: 1\n";
        assert!(serde_yaml::from_str::<SegmentationConfig>(yaml).is_err());
    }

    #[test]
    fn test_partial_document_gets_defaults() {
        let yaml = "state: false\n";
        let cfg: CnnPredictionConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(!cfg.state);
        assert_eq!(cfg.patch, [80, 160, 160]);
        assert_eq!(cfg.device, Device::Cuda);
    }
}
