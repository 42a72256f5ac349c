use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the shared value types and tensor accessors.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("feature set length mismatch: {keypoints} keypoints, {descriptors} descriptors")]
    LengthMismatch { keypoints: usize, descriptors: usize },

    #[error("missing tensor `{0}`")]
    MissingTensor(String),

    #[error("tensor `{name}` has dtype {actual}, expected {expected}")]
    TensorType {
        name: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("invalid device `{0}` (expected `cpu`, `cuda` or `cuda:<index>`)")]
    InvalidDevice(String),

    #[error("thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type CoreResult<T> = Result<T, CoreError>;

/// Errors crossing the inference-engine boundary.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("empty path to weights")]
    EmptyWeightsPath,

    #[error("weights file {} does not exist", path.display())]
    WeightsNotFound { path: PathBuf },

    #[error("weights path {} is not a readable file", path.display())]
    WeightsNotReadable { path: PathBuf },

    #[error("failed to load weights from {}: {reason}", path.display())]
    Load { path: PathBuf, reason: String },

    #[error("inference failed: {0}")]
    Inference(String),
}
