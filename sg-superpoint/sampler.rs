use crate::error::{SuperPointError, SuperPointResult};
use ndarray::{s, Array1};
use rayon::prelude::*;
use sg_core::{Descriptor, DescriptorGrid, ImageSize, Keypoint};

/// Norms below this cannot be normalized
const MIN_DESCRIPTOR_NORM: f32 = 1e-12;

/// Map a pixel coordinate onto the `[-1, 1]` grid-sample range.
#[inline]
pub fn normalize_coordinate(pixel: f32, dimension: usize) -> f32 {
    2.0 * pixel / dimension as f32 - 1.0
}

/// Map a `[-1, 1]` coordinate to a fractional index into an axis of `size` cells.
///
/// With `align_corners` the extremes address the centres of the first and
/// last cells; without it they address the outer edges of those cells.
#[inline]
pub fn unnormalize_coordinate(coord: f32, size: usize, align_corners: bool) -> f32 {
    if align_corners {
        (coord + 1.0) / 2.0 * (size as f32 - 1.0)
    } else {
        ((coord + 1.0) * size as f32 - 1.0) / 2.0
    }
}

/// Bilinearly interpolate every channel of `grid` at a working-resolution pixel
/// position. Taps falling outside the grid contribute zero.
pub fn sample_raw(
    grid: &DescriptorGrid,
    x: f32,
    y: f32,
    image_size: ImageSize,
    align_corners: bool,
) -> Array1<f32> {
    let (channels, grid_h, grid_w) = grid.dim();
    let ix = unnormalize_coordinate(normalize_coordinate(x, image_size.width), grid_w, align_corners);
    let iy = unnormalize_coordinate(normalize_coordinate(y, image_size.height), grid_h, align_corners);

    let x0 = ix.floor();
    let y0 = iy.floor();
    let wx = ix - x0;
    let wy = iy - y0;

    let taps = [
        (x0, y0, (1.0 - wx) * (1.0 - wy)),
        (x0 + 1.0, y0, wx * (1.0 - wy)),
        (x0, y0 + 1.0, (1.0 - wx) * wy),
        (x0 + 1.0, y0 + 1.0, wx * wy),
    ];

    let mut out = Array1::<f32>::zeros(channels);
    for (tx, ty, weight) in taps {
        if weight == 0.0 || tx < 0.0 || ty < 0.0 {
            continue;
        }
        let (tx, ty) = (tx as usize, ty as usize);
        if tx >= grid_w || ty >= grid_h {
            continue;
        }
        out.scaled_add(weight, &grid.slice(s![.., ty, tx]));
    }
    out
}

/// Scale `v` to unit L2 norm, `false` if its norm is (numerically) zero.
pub fn l2_normalize(v: &mut [f32]) -> bool {
    let norm = v.iter().map(|a| a * a).sum::<f32>().sqrt();
    if !(norm > MIN_DESCRIPTOR_NORM) {
        return false;
    }
    v.iter_mut().for_each(|a| *a /= norm);
    true
}

/// Sample and L2-normalize one descriptor per keypoint.
///
/// Keypoints are independent, so sampling runs on the current Rayon pool. A
/// keypoint whose interpolated vector has zero norm fails the whole call with
/// [`SuperPointError::DegenerateDescriptor`].
pub fn sample_descriptors(
    grid: &DescriptorGrid,
    keypoints: &[Keypoint],
    image_size: ImageSize,
    align_corners: bool,
) -> SuperPointResult<Vec<Descriptor>> {
    keypoints
        .par_iter()
        .enumerate()
        .map(|(index, kp)| {
            let mut desc = sample_raw(grid, kp.x, kp.y, image_size, align_corners).to_vec();
            if l2_normalize(&mut desc) {
                Ok(desc)
            } else {
                Err(SuperPointError::DegenerateDescriptor { index })
            }
        })
        .collect()
}
