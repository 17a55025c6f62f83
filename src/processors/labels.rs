//! Label post-processing for segmentation volumes.

use ndarray::Array3;
use std::collections::HashMap;

const FACE_NEIGHBORS: [(isize, isize, isize); 6] = [
    (-1, 0, 0),
    (1, 0, 0),
    (0, -1, 0),
    (0, 1, 0),
    (0, 0, -1),
    (0, 0, 1),
];

/// Relabels a segmentation contiguously.
///
/// Two voxels belong to the same output component when they carry the same
/// input id and are face-adjacent (6-connectivity). Non-touching instances
/// with the same input id therefore end up with different output ids.
/// Background voxels (id 0) stay 0; components are numbered 1..=N in scan
/// order.
pub fn relabel_segmentation(segmentation: &Array3<u32>) -> Array3<u32> {
    let (nz, ny, nx) = segmentation.dim();
    let mut relabeled = Array3::<u32>::zeros((nz, ny, nx));
    let mut next_label = 0_u32;
    let mut stack: Vec<(usize, usize, usize)> = Vec::new();

    for z in 0..nz {
        for y in 0..ny {
            for x in 0..nx {
                let id = segmentation[[z, y, x]];
                if id == 0 || relabeled[[z, y, x]] != 0 {
                    continue;
                }

                next_label += 1;
                relabeled[[z, y, x]] = next_label;
                stack.push((z, y, x));

                // flood fill the component of equal-id, face-adjacent voxels
                while let Some((cz, cy, cx)) = stack.pop() {
                    for (dz, dy, dx) in FACE_NEIGHBORS {
                        let sz = cz as isize + dz;
                        let sy = cy as isize + dy;
                        let sx = cx as isize + dx;
                        if sz < 0
                            || sy < 0
                            || sx < 0
                            || sz >= nz as isize
                            || sy >= ny as isize
                            || sx >= nx as isize
                        {
                            continue;
                        }
                        let (sz, sy, sx) = (sz as usize, sy as usize, sx as usize);
                        if segmentation[[sz, sy, sx]] == id && relabeled[[sz, sy, sx]] == 0 {
                            relabeled[[sz, sy, sx]] = next_label;
                            stack.push((sz, sy, sx));
                        }
                    }
                }
            }
        }
    }

    relabeled
}

/// Sets the background of a segmentation to a fixed value.
///
/// Every id is first shifted by +1 so that an existing 0 label becomes a
/// regular instance; the most frequent id after the shift is taken to be
/// the background and replaced with `value`.
pub fn set_background_to_value(segmentation: &Array3<u32>, value: u32) -> Array3<u32> {
    let shifted = segmentation.mapv(|id| id + 1);

    let mut counts: HashMap<u32, usize> = HashMap::new();
    for &id in shifted.iter() {
        *counts.entry(id).or_insert(0) += 1;
    }

    // smallest id wins ties so the result is deterministic
    let background = counts
        .iter()
        .max_by_key(|(id, count)| (**count, std::cmp::Reverse(**id)))
        .map(|(id, _)| *id)
        .unwrap_or(0);

    shifted.mapv(|id| if id == background { value } else { id })
}
