use crate::error::{SuperGlueError, SuperGlueResult};
use ndarray::{Array1, Array2, Array3};
use sg_core::{FeatureSet, ImageSize, TensorMap};

pub const IMAGE0_SHAPE: &str = "image0_shape";
pub const IMAGE1_SHAPE: &str = "image1_shape";
pub const DESCRIPTORS0: &str = "descriptors0";
pub const DESCRIPTORS1: &str = "descriptors1";
pub const KEYPOINTS0: &str = "keypoints0";
pub const KEYPOINTS1: &str = "keypoints1";
pub const SCORES0: &str = "scores0";
pub const SCORES1: &str = "scores1";
pub const MATCH_THRESHOLD: &str = "match_threshold";

/// Pack a query/train pair into the matcher's input bundle.
///
/// Returns `Ok(None)` when either side has no keypoints: there is nothing to
/// match and the engine should not be invoked.
pub fn assemble(
    query: &FeatureSet,
    query_size: ImageSize,
    train: &FeatureSet,
    train_size: ImageSize,
    match_threshold: Option<f32>,
) -> SuperGlueResult<Option<TensorMap>> {
    if query.is_empty() || train.is_empty() {
        return Ok(None);
    }
    check_size("query", query_size)?;
    check_size("train", train_size)?;

    let query_dim = descriptor_dim("query", query)?;
    let train_dim = descriptor_dim("train", train)?;
    if query_dim != train_dim {
        return Err(SuperGlueError::DescriptorDimMismatch {
            query: query_dim,
            train: train_dim,
        });
    }

    let mut inputs = TensorMap::new()
        .with(IMAGE0_SHAPE, shape_vector(query_size))
        .with(IMAGE1_SHAPE, shape_vector(train_size))
        .with(DESCRIPTORS0, channels_first(query, query_dim))
        .with(DESCRIPTORS1, channels_first(train, train_dim))
        .with(KEYPOINTS0, row_col_positions(query))
        .with(KEYPOINTS1, row_col_positions(train))
        .with(SCORES0, confidences(query))
        .with(SCORES1, confidences(train));
    if let Some(t) = match_threshold {
        inputs.insert(MATCH_THRESHOLD, Array1::from_elem(1, t));
    }
    Ok(Some(inputs))
}

/// `[1, 1, height, width]`
fn shape_vector(size: ImageSize) -> Array1<f32> {
    Array1::from(vec![1.0, 1.0, size.height as f32, size.width as f32])
}

/// `[1, C, N]`, column `i` holding descriptor `i`
fn channels_first(features: &FeatureSet, dim: usize) -> Array3<f32> {
    let descs = features.descriptors();
    Array3::from_shape_fn((1, dim, descs.len()), |(_, c, i)| descs[i][c])
}

/// `[1, N, 2]` with `[y, x]` per keypoint
fn row_col_positions(features: &FeatureSet) -> Array3<f32> {
    let kps = features.keypoints();
    Array3::from_shape_fn((1, kps.len(), 2), |(_, i, axis)| {
        if axis == 0 {
            kps[i].y
        } else {
            kps[i].x
        }
    })
}

/// `[1, N]`
fn confidences(features: &FeatureSet) -> Array2<f32> {
    let kps = features.keypoints();
    Array2::from_shape_fn((1, kps.len()), |(_, i)| kps[i].confidence)
}

fn check_size(side: &'static str, size: ImageSize) -> SuperGlueResult<()> {
    if size.is_empty() {
        return Err(SuperGlueError::InvalidImageSize {
            side,
            width: size.width,
            height: size.height,
        });
    }
    Ok(())
}

/// Common descriptor length of a non-empty set
fn descriptor_dim(side: &'static str, features: &FeatureSet) -> SuperGlueResult<usize> {
    let expected = features.descriptor_dim().unwrap_or(0);
    for (index, desc) in features.descriptors().iter().enumerate() {
        if desc.len() != expected {
            return Err(SuperGlueError::DescriptorLengthMismatch {
                side,
                index,
                expected,
                actual: desc.len(),
            });
        }
    }
    Ok(expected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sg_core::Keypoint;

    fn features(points: &[(f32, f32, f32)], dim: usize) -> FeatureSet {
        let kps = points
            .iter()
            .map(|&(x, y, c)| Keypoint::new(x, y, c))
            .collect::<Vec<_>>();
        let descs = (0..kps.len())
            .map(|i| (0..dim).map(|c| (i * 10 + c) as f32).collect())
            .collect();
        FeatureSet::new(kps, descs).unwrap()
    }

    fn assembled() -> TensorMap {
        let query = features(&[(3.0, 7.0, 0.9), (11.0, 13.0, 0.4)], 4);
        let train = features(&[(1.0, 2.0, 0.5)], 4);
        assemble(
            &query,
            ImageSize::new(640, 480),
            &train,
            ImageSize::new(320, 240),
            None,
        )
        .unwrap()
        .unwrap()
    }

    #[test]
    fn test_tensor_names() {
        let inputs = assembled();
        assert_eq!(
            inputs.names().collect::<Vec<_>>(),
            vec![
                DESCRIPTORS0, DESCRIPTORS1, IMAGE0_SHAPE, IMAGE1_SHAPE, KEYPOINTS0, KEYPOINTS1,
                SCORES0, SCORES1
            ]
        );
    }

    #[test]
    fn test_image_shapes_are_height_first() {
        let inputs = assembled();
        let shape0 = inputs.get_f32(IMAGE0_SHAPE).unwrap();
        assert_eq!(shape0.as_slice().unwrap(), &[1.0, 1.0, 480.0, 640.0]);
        let shape1 = inputs.get_f32(IMAGE1_SHAPE).unwrap();
        assert_eq!(shape1.as_slice().unwrap(), &[1.0, 1.0, 240.0, 320.0]);
    }

    #[test]
    fn test_keypoints_are_row_column() {
        let inputs = assembled();
        let kps0 = inputs.get_f32(KEYPOINTS0).unwrap();
        assert_eq!(kps0.shape(), &[1, 2, 2]);
        assert_eq!(kps0[[0, 0, 0]], 7.0);
        assert_eq!(kps0[[0, 0, 1]], 3.0);
        assert_eq!(kps0[[0, 1, 0]], 13.0);
        assert_eq!(kps0[[0, 1, 1]], 11.0);
    }

    #[test]
    fn test_descriptors_are_channels_first() {
        let inputs = assembled();
        let d0 = inputs.get_f32(DESCRIPTORS0).unwrap();
        assert_eq!(d0.shape(), &[1, 4, 2]);
        assert_eq!(d0[[0, 2, 0]], 2.0);
        assert_eq!(d0[[0, 2, 1]], 12.0);
        assert_eq!(inputs.get_f32(DESCRIPTORS1).unwrap().shape(), &[1, 4, 1]);
    }

    #[test]
    fn test_scores() {
        let inputs = assembled();
        let s0 = inputs.get_f32(SCORES0).unwrap();
        assert_eq!(s0.shape(), &[1, 2]);
        assert_eq!(s0.iter().copied().collect::<Vec<_>>(), vec![0.9, 0.4]);
        assert!(!inputs.contains(MATCH_THRESHOLD));
    }

    #[test]
    fn test_match_threshold_is_optional_scalar() {
        let query = features(&[(3.0, 7.0, 0.9)], 4);
        let inputs = assemble(&query, ImageSize::new(8, 8), &query, ImageSize::new(8, 8), Some(0.3))
            .unwrap()
            .unwrap();
        let t = inputs.get_f32(MATCH_THRESHOLD).unwrap();
        assert_eq!(t.shape(), &[1]);
        assert_eq!(t[[0]], 0.3);
    }

    #[test]
    fn test_empty_side_yields_none() {
        let query = features(&[(3.0, 7.0, 0.9)], 4);
        let empty = FeatureSet::empty();
        let size = ImageSize::new(8, 8);
        assert!(assemble(&query, size, &empty, size, None).unwrap().is_none());
        assert!(assemble(&empty, size, &query, size, None).unwrap().is_none());
    }

    #[test]
    fn test_descriptor_dims_must_agree() {
        let query = features(&[(3.0, 7.0, 0.9)], 4);
        let train = features(&[(3.0, 7.0, 0.9)], 8);
        let size = ImageSize::new(8, 8);
        assert!(matches!(
            assemble(&query, size, &train, size, None),
            Err(SuperGlueError::DescriptorDimMismatch { query: 4, train: 8 })
        ));
    }

    #[test]
    fn test_ragged_descriptors_are_rejected() {
        let kps = vec![Keypoint::new(0.0, 0.0, 0.5), Keypoint::new(1.0, 1.0, 0.5)];
        let ragged = FeatureSet::new(kps, vec![vec![1.0; 4], vec![1.0; 3]]).unwrap();
        let size = ImageSize::new(8, 8);
        assert!(matches!(
            assemble(&ragged, size, &ragged, size, None),
            Err(SuperGlueError::DescriptorLengthMismatch { side: "query", index: 1, .. })
        ));
    }

    #[test]
    fn test_empty_image_size_is_rejected() {
        let query = features(&[(3.0, 7.0, 0.9)], 4);
        assert!(matches!(
            assemble(&query, ImageSize::new(8, 8), &query, ImageSize::new(0, 8), None),
            Err(SuperGlueError::InvalidImageSize { side: "train", .. })
        ));
    }
}
