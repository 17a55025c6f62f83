//! Intensity and shape normalization for raw volumes.

use crate::core::errors::{SegError, SegResult};
use ndarray::{Array3, ArrayD, Axis, Ix3};

/// Rescales intensities linearly to the [0, 1] range.
///
/// A small epsilon keeps constant volumes from dividing by zero; those map
/// to all zeros.
pub fn normalize_01(volume: &Array3<f32>) -> Array3<f32> {
    let min = volume.iter().copied().fold(f32::INFINITY, f32::min);
    let max = volume.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let range = max - min + 1e-12;
    volume.mapv(|v| (v - min) / range)
}

/// Normalizes input data of 2, 3, or 4 dimensions to a (z, y, x) volume.
///
/// A 2D image gains a singleton z axis, a 4D stack drops to its first
/// channel, and 3D data passes through. Anything else is an error.
pub fn fix_input_shape(data: ArrayD<f32>) -> SegResult<Array3<f32>> {
    match data.ndim() {
        2 => {
            let expanded = data.insert_axis(Axis(0));
            Ok(expanded.into_dimensionality::<Ix3>()?)
        }
        3 => Ok(data.into_dimensionality::<Ix3>()?),
        4 => {
            let first = data.index_axis(Axis(0), 0).to_owned();
            Ok(first.into_dimensionality::<Ix3>()?)
        }
        ndim => Err(SegError::invalid_input(format!(
            "expected input data to be 2d, 3d or 4d, but got {ndim}d input"
        ))),
    }
}
