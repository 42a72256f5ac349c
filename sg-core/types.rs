use crate::error::{CoreError, CoreResult};
use ndarray::{Array2, Array3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Length of a SuperPoint descriptor
pub const DESCRIPTOR_DIM: usize = 256;

/// Detected location with its detector confidence.
///
/// Coordinates are in working-resolution pixels while the detector pipeline
/// runs and in original-image pixels once a [`FeatureSet`] is handed out.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Keypoint {
    pub x: f32,
    pub y: f32,
    pub confidence: f32,
}

impl Keypoint {
    pub fn new(x: f32, y: f32, confidence: f32) -> Self {
        Self { x, y, confidence }
    }
}

/// Dense float descriptor, unit L2 norm once sampled
pub type Descriptor = Vec<f32>;

/// Detection-confidence grid at working resolution (height × width)
pub type ScoreGrid = Array2<f32>;

/// Coarse descriptor grid (channels × height/8 × width/8)
pub type DescriptorGrid = Array3<f32>;

/// Eligibility mask at working resolution, `true` = eligible
pub type Mask = Array2<bool>;

/// Width and height of an image in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ImageSize {
    pub width: usize,
    pub height: usize,
}

impl ImageSize {
    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl std::fmt::Display for ImageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Index-aligned keypoints and descriptors of one image.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureSet {
    keypoints: Vec<Keypoint>,
    descriptors: Vec<Descriptor>,
}

impl FeatureSet {
    pub fn new(keypoints: Vec<Keypoint>, descriptors: Vec<Descriptor>) -> CoreResult<Self> {
        if keypoints.len() != descriptors.len() {
            return Err(CoreError::LengthMismatch {
                keypoints: keypoints.len(),
                descriptors: descriptors.len(),
            });
        }
        Ok(Self {
            keypoints,
            descriptors,
        })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.keypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keypoints.is_empty()
    }

    pub fn keypoints(&self) -> &[Keypoint] {
        &self.keypoints
    }

    pub fn descriptors(&self) -> &[Descriptor] {
        &self.descriptors
    }

    /// Descriptor length, `None` for an empty set
    pub fn descriptor_dim(&self) -> Option<usize> {
        self.descriptors.first().map(Vec::len)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Keypoint, &Descriptor)> {
        self.keypoints.iter().zip(self.descriptors.iter())
    }

    pub fn into_parts(self) -> (Vec<Keypoint>, Vec<Descriptor>) {
        (self.keypoints, self.descriptors)
    }
}

/// Match between a query keypoint and a train keypoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Correspondence {
    pub query_idx: usize,
    pub train_idx: usize,
}

impl Correspondence {
    pub fn new(query_idx: usize, train_idx: usize) -> Self {
        Self {
            query_idx,
            train_idx,
        }
    }
}

impl From<(usize, usize)> for Correspondence {
    fn from((query_idx, train_idx): (usize, usize)) -> Self {
        Self::new(query_idx, train_idx)
    }
}
