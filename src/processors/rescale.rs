//! Volume rescaling and voxel-size helpers.
//!
//! Rescaling is driven by a per-axis (z, y, x) factor: the output shape is
//! `round(dim * factor)` per axis. Order 0 resamples nearest-neighbor (the
//! only correct choice for label volumes); orders 1 through 5 resample with
//! trilinear interpolation. A factor of `[1, 1, 1]` returns the input
//! unchanged.

use crate::core::errors::{SegError, SegResult};
use ndarray::Array3;
use rayon::prelude::*;

/// Computes the per-axis scaling factor that maps a volume from one voxel
/// size to another.
pub fn compute_scaling_factor(
    input_voxel_size: [f64; 3],
    output_voxel_size: [f64; 3],
) -> SegResult<[f64; 3]> {
    let mut factor = [0.0; 3];
    for axis in 0..3 {
        let (i, o) = (input_voxel_size[axis], output_voxel_size[axis]);
        if !i.is_finite() || !o.is_finite() || i <= 0.0 || o <= 0.0 {
            return Err(SegError::invalid_input(format!(
                "voxel sizes must be positive, got {i} -> {o} on axis {axis}"
            )));
        }
        factor[axis] = i / o;
    }
    Ok(factor)
}

/// Computes the voxel size a volume ends up with after rescaling by `factor`.
pub fn compute_scaling_voxelsize(
    input_voxel_size: [f64; 3],
    factor: [f64; 3],
) -> SegResult<[f64; 3]> {
    let mut output = [0.0; 3];
    for axis in 0..3 {
        let (i, f) = (input_voxel_size[axis], factor[axis]);
        if !i.is_finite() || !f.is_finite() || i <= 0.0 || f <= 0.0 {
            return Err(SegError::invalid_input(format!(
                "voxel size and factor must be positive, got size {i}, factor {f} on axis {axis}"
            )));
        }
        output[axis] = i / f;
    }
    Ok(output)
}

/// Rescales a volume so that its voxel size matches `output_voxel_size`.
pub fn scale_to_voxel_size(
    volume: &Array3<f32>,
    input_voxel_size: [f64; 3],
    output_voxel_size: [f64; 3],
    order: u8,
) -> SegResult<Array3<f32>> {
    let factor = compute_scaling_factor(input_voxel_size, output_voxel_size)?;
    rescale(volume, factor, order)
}

fn is_identity(factor: [f64; 3]) -> bool {
    factor == [1.0, 1.0, 1.0]
}

fn output_shape(dim: (usize, usize, usize), factor: [f64; 3]) -> (usize, usize, usize) {
    let scale = |d: usize, f: f64| ((d as f64 * f).round() as usize).max(1);
    (
        scale(dim.0, factor[0]),
        scale(dim.1, factor[1]),
        scale(dim.2, factor[2]),
    )
}

fn check_rescale_args(dim: (usize, usize, usize), factor: [f64; 3]) -> SegResult<()> {
    if dim.0 == 0 || dim.1 == 0 || dim.2 == 0 {
        return Err(SegError::invalid_input("cannot rescale an empty volume"));
    }
    for (axis, &f) in factor.iter().enumerate() {
        if !f.is_finite() || f <= 0.0 {
            return Err(SegError::invalid_input(format!(
                "rescaling factor must be positive, got {f} on axis {axis}"
            )));
        }
    }
    Ok(())
}

/// Rescales an intensity volume by a per-axis factor.
pub fn rescale(volume: &Array3<f32>, factor: [f64; 3], order: u8) -> SegResult<Array3<f32>> {
    check_rescale_args(volume.dim(), factor)?;
    if is_identity(factor) {
        return Ok(volume.clone());
    }

    if order == 0 {
        rescale_nearest(volume, factor)
    } else {
        rescale_trilinear(volume, factor)
    }
}

/// Rescales a label volume by a per-axis factor.
///
/// Labels are always resampled nearest-neighbor; interpolating ids would
/// invent labels that exist nowhere in the segmentation.
pub fn rescale_labels(volume: &Array3<u32>, factor: [f64; 3]) -> SegResult<Array3<u32>> {
    check_rescale_args(volume.dim(), factor)?;
    if is_identity(factor) {
        return Ok(volume.clone());
    }
    rescale_nearest(volume, factor)
}

fn nearest_source(i: usize, factor: f64, dim: usize) -> usize {
    ((i as f64 / factor).floor() as usize).min(dim - 1)
}

fn rescale_nearest<T: Copy + Send + Sync>(
    volume: &Array3<T>,
    factor: [f64; 3],
) -> SegResult<Array3<T>> {
    let (nz, ny, nx) = volume.dim();
    let (oz, oy, ox) = output_shape(volume.dim(), factor);

    let data: Vec<T> = (0..oz * oy * ox)
        .into_par_iter()
        .map(|flat| {
            let z = flat / (oy * ox);
            let y = (flat / ox) % oy;
            let x = flat % ox;
            let sz = nearest_source(z, factor[0], nz);
            let sy = nearest_source(y, factor[1], ny);
            let sx = nearest_source(x, factor[2], nx);
            volume[[sz, sy, sx]]
        })
        .collect();

    Ok(Array3::from_shape_vec((oz, oy, ox), data)?)
}

fn rescale_trilinear(volume: &Array3<f32>, factor: [f64; 3]) -> SegResult<Array3<f32>> {
    let (nz, ny, nx) = volume.dim();
    let (oz, oy, ox) = output_shape(volume.dim(), factor);

    // Continuous source coordinate per output voxel, clamped to the volume.
    let coord = |i: usize, f: f64, dim: usize| -> (usize, usize, f32) {
        let c = (i as f64 / f).min((dim - 1) as f64);
        let lo = c.floor() as usize;
        let hi = (lo + 1).min(dim - 1);
        (lo, hi, (c - lo as f64) as f32)
    };

    let data: Vec<f32> = (0..oz * oy * ox)
        .into_par_iter()
        .map(|flat| {
            let z = flat / (oy * ox);
            let y = (flat / ox) % oy;
            let x = flat % ox;
            let (z0, z1, fz) = coord(z, factor[0], nz);
            let (y0, y1, fy) = coord(y, factor[1], ny);
            let (x0, x1, fx) = coord(x, factor[2], nx);

            let c000 = volume[[z0, y0, x0]];
            let c001 = volume[[z0, y0, x1]];
            let c010 = volume[[z0, y1, x0]];
            let c011 = volume[[z0, y1, x1]];
            let c100 = volume[[z1, y0, x0]];
            let c101 = volume[[z1, y0, x1]];
            let c110 = volume[[z1, y1, x0]];
            let c111 = volume[[z1, y1, x1]];

            let c00 = c000 * (1.0 - fx) + c001 * fx;
            let c01 = c010 * (1.0 - fx) + c011 * fx;
            let c10 = c100 * (1.0 - fx) + c101 * fx;
            let c11 = c110 * (1.0 - fx) + c111 * fx;

            let c0 = c00 * (1.0 - fy) + c01 * fy;
            let c1 = c10 * (1.0 - fy) + c11 * fy;

            c0 * (1.0 - fz) + c1 * fz
        })
        .collect();

    Ok(Array3::from_shape_vec((oz, oy, ox), data)?)
}
