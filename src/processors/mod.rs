//! Volume processing primitives driven by the stage configuration.
//!
//! Everything here operates on in-memory (z, y, x) volumes: cropping,
//! rescaling, normalization, smoothing, label post-processing, and the
//! patch slicing used for tiled prediction.

pub mod crop;
pub mod labels;
pub mod normalization;
pub mod rescale;
pub mod slicing;
pub mod smoothing;

pub use crop::{AxisSpec, CropSpec};
pub use labels::{relabel_segmentation, set_background_to_value};
pub use normalization::{fix_input_shape, normalize_01};
pub use rescale::{
    compute_scaling_factor, compute_scaling_voxelsize, rescale, rescale_labels,
    scale_to_voxel_size,
};
pub use slicing::{mirror_pad, PatchWindow, SliceBuilder};
pub use smoothing::{gaussian_smoothing, median_filter};
