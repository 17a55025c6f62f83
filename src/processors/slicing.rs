//! Patch slicing for tiled prediction.
//!
//! Large volumes do not fit on the device in one piece, so prediction runs
//! over overlapping patch windows described by the `patch`, `stride`, and
//! `patch_halo` triples of the prediction stage. [`SliceBuilder`] produces
//! those windows; [`mirror_pad`] applies the reflective padding configured
//! by `mirror_padding` before slicing.

use super::smoothing::reflect_index;
use crate::core::errors::{SegError, SegResult};
use ndarray::Array3;
use std::ops::Range;
use tracing::debug;

/// One patch window over a (z, y, x) volume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchWindow {
    /// The window actually read from the volume: the patch expanded by the
    /// halo, clamped to the volume bounds.
    pub outer: [Range<usize>; 3],
    /// The halo-free region whose prediction is kept.
    pub inner: [Range<usize>; 3],
}

/// Builds the patch windows used for tiled prediction.
#[derive(Debug, Clone)]
pub struct SliceBuilder {
    patch: [usize; 3],
    stride: [usize; 3],
    halo: [usize; 3],
}

impl SliceBuilder {
    /// Creates a slice builder.
    ///
    /// # Errors
    ///
    /// Returns `SegError::InvalidInput` when a patch or stride axis is zero
    /// or the stride exceeds the patch (which would leave gaps).
    pub fn new(patch: [usize; 3], stride: [usize; 3], halo: [usize; 3]) -> SegResult<Self> {
        for axis in 0..3 {
            if patch[axis] == 0 || stride[axis] == 0 {
                return Err(SegError::invalid_input(format!(
                    "patch and stride must be positive, got patch {} / stride {} on axis {}",
                    patch[axis], stride[axis], axis
                )));
            }
            if stride[axis] > patch[axis] {
                return Err(SegError::invalid_input(format!(
                    "stride {} exceeds patch {} on axis {}; windows would leave gaps",
                    stride[axis], patch[axis], axis
                )));
            }
        }
        Ok(Self {
            patch,
            stride,
            halo,
        })
    }

    fn axis_starts(dim: usize, patch: usize, stride: usize) -> Vec<usize> {
        let mut starts = Vec::new();
        let mut start = 0;
        loop {
            if start + patch >= dim {
                let last = dim.saturating_sub(patch);
                if starts.last() != Some(&last) {
                    starts.push(last);
                }
                break;
            }
            starts.push(start);
            start += stride;
        }
        starts
    }

    /// Builds the windows covering a volume of the given shape.
    ///
    /// Windows step by `stride`; the final window on each axis is clamped
    /// back so it ends exactly at the bound. Every voxel is covered by at
    /// least one inner window.
    pub fn build(&self, shape: (usize, usize, usize)) -> SegResult<Vec<PatchWindow>> {
        let dims = [shape.0, shape.1, shape.2];
        if dims.contains(&0) {
            return Err(SegError::invalid_input("cannot slice an empty volume"));
        }

        let starts: Vec<Vec<usize>> = (0..3)
            .map(|axis| Self::axis_starts(dims[axis], self.patch[axis], self.stride[axis]))
            .collect();

        let mut windows =
            Vec::with_capacity(starts[0].len() * starts[1].len() * starts[2].len());
        for &z in &starts[0] {
            for &y in &starts[1] {
                for &x in &starts[2] {
                    let origin = [z, y, x];
                    let mut inner = [0..0, 0..0, 0..0];
                    let mut outer = [0..0, 0..0, 0..0];
                    for axis in 0..3 {
                        let stop = (origin[axis] + self.patch[axis]).min(dims[axis]);
                        inner[axis] = origin[axis]..stop;
                        outer[axis] = origin[axis].saturating_sub(self.halo[axis])
                            ..(stop + self.halo[axis]).min(dims[axis]);
                    }
                    windows.push(PatchWindow { outer, inner });
                }
            }
        }

        debug!(
            windows = windows.len(),
            ?shape,
            "built patch windows for tiled prediction"
        );
        Ok(windows)
    }
}

/// Pads a volume reflectively by `pad` voxels on both ends of each axis.
///
/// The reflection does not repeat the edge voxel, so each pad amount must be
/// smaller than the axis it pads.
pub fn mirror_pad(volume: &Array3<f32>, pad: [usize; 3]) -> SegResult<Array3<f32>> {
    let (nz, ny, nx) = volume.dim();
    let dims = [nz, ny, nx];
    if dims.contains(&0) {
        return Err(SegError::invalid_input("cannot pad an empty volume"));
    }
    for axis in 0..3 {
        if pad[axis] >= dims[axis] {
            return Err(SegError::invalid_input(format!(
                "mirror padding {} does not fit axis {} of size {}",
                pad[axis], axis, dims[axis]
            )));
        }
    }

    let padded_shape = (nz + 2 * pad[0], ny + 2 * pad[1], nx + 2 * pad[2]);
    let padded = Array3::from_shape_fn(padded_shape, |(z, y, x)| {
        let sz = reflect_index(z as isize - pad[0] as isize, nz);
        let sy = reflect_index(y as isize - pad[1] as isize, ny);
        let sx = reflect_index(x as isize - pad[2] as isize, nx);
        volume[[sz, sy, sx]]
    });
    Ok(padded)
}
