//! SuperPoint keypoint detection on top of an opaque inference engine.
//!
//! The network itself is not part of this crate. [`SuperPoint`] feeds a
//! grayscale tensor to an [`sg_core::InferenceEngine`] and turns the dense
//! score and descriptor grids it returns into a [`sg_core::FeatureSet`]:
//! thresholding and masking, greedy grid NMS, bilinear descriptor sampling
//! and rescaling back to the caller's image size.

pub mod builder;
pub mod config;
pub mod detector;
pub mod error;
pub mod extractor;
pub mod nms;
pub mod preprocess;
pub mod rescale;
pub mod sampler;

pub use builder::SuperPointBuilder;
pub use config::{SuperPointConfig, CELL_SIZE, DEFAULT_WORKING_SIZE};
pub use detector::{SuperPoint, DESCRIPTORS_OUTPUT, IMAGE_INPUT, SCORES_OUTPUT};
pub use error::{SuperPointError, SuperPointResult};
pub use extractor::{effective_mask, extract_candidates};
pub use nms::non_maximum_suppression;
pub use rescale::{rescale_keypoints, rescale_point};
pub use sampler::{sample_descriptors, sample_raw};
