//! Gaussian and median smoothing of volumes.
//!
//! The gaussian filter is separable and runs axis by axis with reflected
//! borders. The sigma on each axis is clamped to `(dim - 1) / 3` so the
//! kernel never outgrows the volume; axes of length 1 are skipped. The
//! median filter picks its footprint from the volume shape: a flat disk for
//! single-slice volumes and a ball otherwise.

use crate::core::errors::{SegError, SegResult};
use ndarray::Array3;
use rayon::prelude::*;

/// Reflects an index into `0..n` without repeating the edge sample.
pub(crate) fn reflect_index(mut i: isize, n: usize) -> usize {
    if n == 1 {
        return 0;
    }
    let last = (n - 1) as isize;
    loop {
        if i < 0 {
            i = -i;
        } else if i > last {
            i = 2 * last - i;
        } else {
            return i as usize;
        }
    }
}

fn gaussian_kernel(sigma: f64) -> Vec<f32> {
    let radius = (3.0 * sigma).ceil() as isize;
    let mut kernel = Vec::with_capacity((2 * radius + 1) as usize);
    let mut sum = 0.0;
    for offset in -radius..=radius {
        let w = (-0.5 * (offset as f64 / sigma).powi(2)).exp();
        kernel.push(w);
        sum += w;
    }
    kernel.iter().map(|w| (w / sum) as f32).collect()
}

fn convolve_axis(volume: &Array3<f32>, kernel: &[f32], axis: usize) -> SegResult<Array3<f32>> {
    let dim = volume.dim();
    let dims = [dim.0, dim.1, dim.2];
    let n = dims[axis];
    let radius = (kernel.len() / 2) as isize;
    let (nz, ny, nx) = dim;

    let data: Vec<f32> = (0..nz * ny * nx)
        .into_par_iter()
        .map(|flat| {
            let mut idx = [flat / (ny * nx), (flat / nx) % ny, flat % nx];
            let center = idx[axis] as isize;
            let mut acc = 0.0_f32;
            for (k, &w) in kernel.iter().enumerate() {
                idx[axis] = reflect_index(center + k as isize - radius, n);
                acc += w * volume[[idx[0], idx[1], idx[2]]];
            }
            acc
        })
        .collect();

    Ok(Array3::from_shape_vec(dim, data)?)
}

/// Applies gaussian smoothing with the given sigma to every axis.
///
/// The effective sigma is clamped per axis to `(dim - 1) / 3`.
pub fn gaussian_smoothing(volume: &Array3<f32>, sigma: f64) -> SegResult<Array3<f32>> {
    if volume.is_empty() {
        return Err(SegError::invalid_input("cannot smooth an empty volume"));
    }
    if !sigma.is_finite() || sigma < 0.0 {
        return Err(SegError::invalid_input(format!(
            "sigma must be non-negative, got {sigma}"
        )));
    }
    if sigma == 0.0 {
        return Ok(volume.clone());
    }

    let dim = volume.dim();
    let dims = [dim.0, dim.1, dim.2];
    let mut smoothed = volume.clone();
    for (axis, &n) in dims.iter().enumerate() {
        let max_sigma = (n.saturating_sub(1)) as f64 / 3.0;
        let axis_sigma = sigma.min(max_sigma);
        if axis_sigma <= 0.0 {
            continue;
        }
        let kernel = gaussian_kernel(axis_sigma);
        smoothed = convolve_axis(&smoothed, &kernel, axis)?;
    }
    Ok(smoothed)
}

/// Offsets of a circular (2D) or spherical (3D) footprint of the given
/// radius, origin included.
fn footprint_offsets(radius: usize, three_d: bool) -> Vec<(isize, isize, isize)> {
    let r = radius as isize;
    let r2 = r * r;
    let z_range = if three_d { -r..=r } else { 0..=0 };

    let mut offsets = Vec::new();
    for dz in z_range {
        for dy in -r..=r {
            for dx in -r..=r {
                if dz * dz + dy * dy + dx * dx <= r2 {
                    offsets.push((dz, dy, dx));
                }
            }
        }
    }
    offsets
}

/// Applies a median filter with a disk (single-slice volumes) or ball
/// footprint of the given radius. Borders clamp to the nearest voxel.
pub fn median_filter(volume: &Array3<f32>, radius: usize) -> SegResult<Array3<f32>> {
    if volume.is_empty() {
        return Err(SegError::invalid_input("cannot filter an empty volume"));
    }
    if radius == 0 {
        return Err(SegError::invalid_input("median radius must be >= 1"));
    }

    let (nz, ny, nx) = volume.dim();
    let offsets = footprint_offsets(radius, nz > 1);

    let data: Vec<f32> = (0..nz * ny * nx)
        .into_par_iter()
        .map(|flat| {
            let (z, y, x) = (flat / (ny * nx), (flat / nx) % ny, flat % nx);
            let mut values: Vec<f32> = offsets
                .iter()
                .map(|&(dz, dy, dx)| {
                    let sz = (z as isize + dz).clamp(0, nz as isize - 1) as usize;
                    let sy = (y as isize + dy).clamp(0, ny as isize - 1) as usize;
                    let sx = (x as isize + dx).clamp(0, nx as isize - 1) as usize;
                    volume[[sz, sy, sx]]
                })
                .collect();
            values.sort_by(|a, b| a.total_cmp(b));
            values[values.len() / 2]
        })
        .collect();

    Ok(Array3::from_shape_vec((nz, ny, nx), data)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reflect_index() {
        assert_eq!(reflect_index(-1, 5), 1);
        assert_eq!(reflect_index(-2, 5), 2);
        assert_eq!(reflect_index(5, 5), 3);
        assert_eq!(reflect_index(2, 5), 2);
        assert_eq!(reflect_index(-3, 1), 0);
    }

    #[test]
    fn test_gaussian_kernel_normalized() {
        let kernel = gaussian_kernel(1.5);
        let sum: f32 = kernel.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
        assert_eq!(kernel.len(), 11);
    }

    #[test]
    fn test_gaussian_preserves_constant_volume() {
        let volume = Array3::from_elem((4, 4, 4), 3.0_f32);
        let smoothed = gaussian_smoothing(&volume, 1.0).unwrap();
        for &v in smoothed.iter() {
            assert!((v - 3.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_gaussian_spreads_an_impulse() {
        let mut volume = Array3::<f32>::zeros((7, 7, 7));
        volume[[3, 3, 3]] = 1.0;
        let smoothed = gaussian_smoothing(&volume, 1.0).unwrap();

        assert!(smoothed[[3, 3, 3]] < 1.0);
        assert!(smoothed[[3, 3, 4]] > 0.0);
        // mass is preserved
        let total: f32 = smoothed.iter().sum();
        assert!((total - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_gaussian_sigma_clamped_on_thin_volumes() {
        // z axis of length 1 is skipped entirely
        let volume = Array3::from_elem((1, 16, 16), 1.0_f32);
        let smoothed = gaussian_smoothing(&volume, 5.0).unwrap();
        assert_eq!(smoothed.dim(), (1, 16, 16));
    }

    #[test]
    fn test_gaussian_zero_sigma_is_a_no_op() {
        let volume = Array3::from_shape_fn((3, 3, 3), |(z, y, x)| (z + y * x) as f32);
        let smoothed = gaussian_smoothing(&volume, 0.0).unwrap();
        assert_eq!(smoothed, volume);
    }

    #[test]
    fn test_gaussian_rejects_bad_sigma() {
        let volume = Array3::<f32>::zeros((3, 3, 3));
        assert!(gaussian_smoothing(&volume, -1.0).is_err());
        assert!(gaussian_smoothing(&volume, f64::NAN).is_err());
    }

    #[test]
    fn test_median_removes_salt_noise() {
        let mut volume = Array3::<f32>::zeros((5, 5, 5));
        volume[[2, 2, 2]] = 100.0;
        let filtered = median_filter(&volume, 1).unwrap();
        assert_eq!(filtered[[2, 2, 2]], 0.0);
    }

    #[test]
    fn test_median_uses_disk_for_single_slice() {
        let mut volume = Array3::<f32>::zeros((1, 5, 5));
        volume[[0, 2, 2]] = 100.0;
        let filtered = median_filter(&volume, 1).unwrap();
        assert_eq!(filtered.dim(), (1, 5, 5));
        assert_eq!(filtered[[0, 2, 2]], 0.0);
    }

    #[test]
    fn test_median_rejects_zero_radius() {
        let volume = Array3::<f32>::zeros((2, 2, 2));
        assert!(median_filter(&volume, 0).is_err());
    }

    #[test]
    fn test_footprint_shapes() {
        // disk of radius 1: origin + 4 neighbors
        assert_eq!(footprint_offsets(1, false).len(), 5);
        // ball of radius 1: origin + 6 face neighbors
        assert_eq!(footprint_offsets(1, true).len(), 7);
    }
}
