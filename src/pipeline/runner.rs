//! Execution of the locally-run stages.
//!
//! Preprocessing and the two post-processing stages operate on in-memory
//! volumes and run here. Prediction and segmentation are carried out by
//! external engines; for those this module only derives the patch geometry
//! the prediction stage is configured with.

use crate::core::config::stages::{
    CnnPostprocessingConfig, CnnPredictionConfig, FilterType, PreprocessingConfig,
    SegmentationPostprocessingConfig,
};
use crate::core::errors::SegResult;
use crate::processors::crop::CropSpec;
use crate::processors::rescale::{rescale, rescale_labels};
use crate::processors::slicing::{mirror_pad, PatchWindow, SliceBuilder};
use crate::processors::smoothing::{gaussian_smoothing, median_filter};
use ndarray::Array3;
use tracing::{debug, info};

/// Runs the preprocessing stage on a raw volume: crop, rescale, filter.
///
/// A disabled stage passes the volume through untouched.
pub fn run_preprocessing(
    config: &PreprocessingConfig,
    volume: Array3<f32>,
) -> SegResult<Array3<f32>> {
    if !config.state {
        debug!("preprocessing disabled, passing volume through");
        return Ok(volume);
    }

    let mut volume = volume;

    if let Some(expr) = &config.crop_volume {
        let spec = CropSpec::parse(expr)?;
        volume = spec.apply(&volume)?;
        debug!(crop = %spec, shape = ?volume.dim(), "cropped volume");
    }

    volume = rescale(&volume, config.factor, config.order)?;
    debug!(factor = ?config.factor, shape = ?volume.dim(), "rescaled volume");

    if config.filter.state {
        volume = match config.filter.filter_type {
            FilterType::Gaussian => gaussian_smoothing(&volume, config.filter.filter_param)?,
            FilterType::Median => {
                median_filter(&volume, config.filter.filter_param.round() as usize)?
            }
        };
        debug!(
            filter = ?config.filter.filter_type,
            param = config.filter.filter_param,
            "filtered volume"
        );
    }

    info!(shape = ?volume.dim(), "preprocessing finished");
    Ok(volume)
}

/// Rescales a prediction volume per the CNN post-processing stage.
pub fn run_prediction_postprocessing(
    config: &CnnPostprocessingConfig,
    prediction: Array3<f32>,
) -> SegResult<Array3<f32>> {
    if !config.state {
        return Ok(prediction);
    }
    let result = rescale(&prediction, config.factor, config.order)?;
    info!(shape = ?result.dim(), "prediction post-processing finished");
    Ok(result)
}

/// Rescales a segmentation per the segmentation post-processing stage.
///
/// Labels are resampled nearest-neighbor regardless of the configured
/// order, which only governs intensity volumes.
pub fn run_segmentation_postprocessing(
    config: &SegmentationPostprocessingConfig,
    segmentation: Array3<u32>,
) -> SegResult<Array3<u32>> {
    if !config.state {
        return Ok(segmentation);
    }
    let result = rescale_labels(&segmentation, config.factor)?;
    info!(shape = ?result.dim(), "segmentation post-processing finished");
    Ok(result)
}

/// Pads a volume and derives the patch windows the prediction stage will
/// be fed, from its configured geometry.
pub fn prediction_windows(
    config: &CnnPredictionConfig,
    volume: &Array3<f32>,
) -> SegResult<(Array3<f32>, Vec<PatchWindow>)> {
    let padded = mirror_pad(volume, config.mirror_padding)?;
    let builder = SliceBuilder::new(config.patch, config.stride, config.patch_halo)?;
    let windows = builder.build(padded.dim())?;
    info!(
        windows = windows.len(),
        device = %config.device,
        model = %config.model_name,
        "prediction geometry resolved"
    );
    Ok((padded, windows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::stages::FilterConfig;

    #[test]
    fn test_disabled_preprocessing_is_identity() {
        let config = PreprocessingConfig {
            state: false,
            ..Default::default()
        };
        let volume = Array3::from_elem((2, 3, 4), 1.5_f32);
        let result = run_preprocessing(&config, volume.clone()).unwrap();
        assert_eq!(result, volume);
    }

    #[test]
    fn test_preprocessing_crop_then_rescale() {
        let config = PreprocessingConfig::default()
            .crop_volume("[:, 0:4, :]")
            .factor([1.0, 1.0, 2.0]);
        let volume = Array3::from_elem((2, 8, 4), 1.0_f32);
        let result = run_preprocessing(&config, volume).unwrap();
        assert_eq!(result.dim(), (2, 4, 8));
    }

    #[test]
    fn test_preprocessing_applies_filter() {
        let config = PreprocessingConfig {
            filter: FilterConfig {
                state: true,
                filter_type: FilterType::Gaussian,
                filter_param: 1.0,
            },
            ..Default::default()
        };
        let mut volume = Array3::<f32>::zeros((5, 5, 5));
        volume[[2, 2, 2]] = 1.0;
        let result = run_preprocessing(&config, volume).unwrap();
        assert!(result[[2, 2, 2]] < 1.0);
    }

    #[test]
    fn test_prediction_postprocessing_rescales() {
        let config = CnnPostprocessingConfig {
            factor: [1.0, 2.0, 2.0],
            ..Default::default()
        };
        let prediction = Array3::from_elem((2, 4, 4), 0.5_f32);
        let result = run_prediction_postprocessing(&config, prediction).unwrap();
        assert_eq!(result.dim(), (2, 8, 8));
    }

    #[test]
    fn test_segmentation_postprocessing_keeps_label_values() {
        let config = SegmentationPostprocessingConfig {
            factor: [1.0, 2.0, 2.0],
            ..Default::default()
        };
        let mut labels = Array3::<u32>::zeros((1, 2, 2));
        labels[[0, 0, 0]] = 3;
        labels[[0, 1, 1]] = 8;
        let result = run_segmentation_postprocessing(&config, labels).unwrap();
        assert_eq!(result.dim(), (1, 4, 4));
        for &v in result.iter() {
            assert!(v == 0 || v == 3 || v == 8);
        }
    }

    #[test]
    fn test_prediction_windows_cover_padded_volume() {
        let config = CnnPredictionConfig {
            patch: [8, 8, 8],
            stride: [4, 4, 4],
            patch_halo: [2, 2, 2],
            mirror_padding: [2, 2, 2],
            ..Default::default()
        };
        let volume = Array3::<f32>::zeros((8, 8, 8));
        let (padded, windows) = prediction_windows(&config, &volume).unwrap();
        assert_eq!(padded.dim(), (12, 12, 12));
        assert!(!windows.is_empty());
        for window in &windows {
            for axis in 0..3 {
                assert!(window.outer[axis].end <= 12);
            }
        }
    }
}
