use sg_core::{CoreError, EngineError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SuperGlueError {
    #[error("invalid match threshold: {0} (must lie in [0, 1])")]
    InvalidMatchThreshold(f32),

    #[error("invalid {side} image dimensions: {width}x{height} (must be > 0)")]
    InvalidImageSize {
        side: &'static str,
        width: usize,
        height: usize,
    },

    #[error("{side} descriptor {index} has length {actual}, expected {expected}")]
    DescriptorLengthMismatch {
        side: &'static str,
        index: usize,
        expected: usize,
        actual: usize,
    },

    #[error("query descriptors have {query} channels, train descriptors {train}")]
    DescriptorDimMismatch { query: usize, train: usize },

    #[error("assignment vector has shape {actual:?}, expected {expected} entries")]
    AssignmentShape { expected: usize, actual: Vec<usize> },

    #[error("query keypoint {query_idx} is assigned to {train_idx}, but only {n_train} train keypoints exist")]
    AssignmentOutOfRange {
        query_idx: usize,
        train_idx: i64,
        n_train: usize,
    },

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[cfg(feature = "serde")]
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "serde")]
    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),

    #[cfg(feature = "serde")]
    #[error(transparent)]
    TomlSer(#[from] toml::ser::Error),
}

pub type SuperGlueResult<T> = Result<T, SuperGlueError>;
