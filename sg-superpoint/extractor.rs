use crate::error::{SuperPointError, SuperPointResult};
use ndarray::Array2;
use sg_core::{Keypoint, Mask, ScoreGrid};

/// Whether cell `(y, x)` keeps at least `border` cells to every edge.
#[inline]
fn inside_border(y: usize, x: usize, height: usize, width: usize, border: usize) -> bool {
    y >= border && x >= border && y + border < height && x + border < width
}

/// Combine an optional explicit mask with the border-exclusion mask.
pub fn effective_mask(
    mask: Option<&Mask>,
    height: usize,
    width: usize,
    border: usize,
) -> SuperPointResult<Mask> {
    if let Some(mask) = mask {
        check_mask(mask, height, width)?;
    }
    Ok(Array2::from_shape_fn((height, width), |(y, x)| {
        inside_border(y, x, height, width, border) && mask.map_or(true, |m| m[[y, x]])
    }))
}

/// Threshold the score grid into candidate keypoints.
///
/// Candidates come out in row-major order with their cell coordinates as
/// position; that order is the index used to break confidence ties later.
pub fn extract_candidates(
    scores: &ScoreGrid,
    mask: Option<&Mask>,
    threshold: f32,
    border: usize,
) -> SuperPointResult<Vec<Keypoint>> {
    let (height, width) = scores.dim();
    if height == 0 || width == 0 {
        return Err(SuperPointError::EmptyScoreGrid { width, height });
    }
    if let Some(mask) = mask {
        check_mask(mask, height, width)?;
    }

    let candidates = scores
        .indexed_iter()
        .filter(|&((y, x), &score)| {
            score >= threshold
                && inside_border(y, x, height, width, border)
                && mask.map_or(true, |m| m[[y, x]])
        })
        .map(|((y, x), &score)| Keypoint::new(x as f32, y as f32, score))
        .collect();

    Ok(candidates)
}

fn check_mask(mask: &Mask, height: usize, width: usize) -> SuperPointResult<()> {
    let (mask_height, mask_width) = mask.dim();
    if (mask_height, mask_width) != (height, width) {
        return Err(SuperPointError::MaskSizeMismatch {
            expected_width: width,
            expected_height: height,
            width: mask_width,
            height: mask_height,
        });
    }
    Ok(())
}
