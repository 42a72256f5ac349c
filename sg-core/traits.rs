use crate::types::{Correspondence, FeatureSet, ImageSize};
use image::{DynamicImage, GrayImage};

/// Anything that turns an image into keypoints with descriptors.
pub trait FeatureDetector {
    type Error: std::error::Error;

    /// Detect features in `image`, restricted to the non-zero pixels of `mask`
    /// when one is given. Keypoints are returned in `image` pixel coordinates.
    fn detect(&self, image: &DynamicImage, mask: Option<&GrayImage>)
        -> Result<FeatureSet, Self::Error>;
}

/// Anything that pairs the features of a query image with those of a train image.
pub trait FeatureMatcher {
    type Error: std::error::Error;

    fn match_features(
        &self,
        query: &FeatureSet,
        query_size: ImageSize,
        train: &FeatureSet,
        train_size: ImageSize,
    ) -> Result<Vec<Correspondence>, Self::Error>;
}
