use sg_core::{CoreError, EngineError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SuperPointError {
    #[error("invalid working resolution {width}x{height} (must be > 0 and a multiple of 8)")]
    InvalidWorkingSize { width: usize, height: usize },

    #[error("invalid confidence threshold: {0} (must be finite and >= 0)")]
    InvalidThreshold(f32),

    #[error("border margin {border} leaves no eligible cell in a {width}x{height} grid")]
    InvalidBorder {
        border: usize,
        width: usize,
        height: usize,
    },

    #[error("invalid image dimensions: {width}x{height} (must be > 0)")]
    InvalidImageSize { width: usize, height: usize },

    #[error("unsupported image type {0} (expected 8-bit depth)")]
    UnsupportedImage(String),

    #[error("score grid is empty ({width}x{height})")]
    EmptyScoreGrid { width: usize, height: usize },

    #[error("mask is {width}x{height}, expected {expected_width}x{expected_height}")]
    MaskSizeMismatch {
        expected_width: usize,
        expected_height: usize,
        width: usize,
        height: usize,
    },

    #[error("tensor `{name}` has shape {actual:?}, expected {expected:?}")]
    GridShapeMismatch {
        name: &'static str,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    #[error("keypoint ({x}, {y}) lies outside the {width}x{height} grid")]
    KeypointOutOfBounds {
        x: f32,
        y: f32,
        width: usize,
        height: usize,
    },

    #[error("descriptor of keypoint {index} has zero norm")]
    DegenerateDescriptor { index: usize },

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

pub type SuperPointResult<T> = Result<T, SuperPointError>;
