//! Shared vocabulary for the SuperPoint detector and the SuperGlue matcher:
//! keypoints, descriptors, feature sets, correspondences, the dense grids the
//! networks produce, named tensors and the inference-engine boundary.

pub mod engine;
pub mod error;
pub mod tensor;
pub mod traits;
pub mod types;

pub use engine::{load_engine, validate_weights_path, Device, InferenceEngine};
pub use error::{CoreError, CoreResult, EngineError};
pub use tensor::{Tensor, TensorMap};
pub use traits::{FeatureDetector, FeatureMatcher};
pub use types::{
    Correspondence, Descriptor, DescriptorGrid, FeatureSet, ImageSize, Keypoint, Mask, ScoreGrid,
    DESCRIPTOR_DIM,
};

/// Build a dedicated Rayon thread pool with the specified number of threads.
///
/// `0` falls back to the number of logical CPUs.
pub fn build_thread_pool(n_threads: usize) -> CoreResult<rayon::ThreadPool> {
    let n_threads = if n_threads == 0 {
        default_thread_count()
    } else {
        n_threads
    };
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(n_threads)
        .build()?;
    Ok(pool)
}

/// Number of worker threads used when a configuration does not pin one.
pub fn default_thread_count() -> usize {
    num_cpus::get().max(1)
}
