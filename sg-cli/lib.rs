use image::{DynamicImage, GrayImage};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use sg_core::{
    validate_weights_path, Correspondence, Device, EngineError, FeatureDetector, FeatureMatcher,
    FeatureSet, ImageSize, InferenceEngine,
};
use sg_superglue::{SuperGlue, SuperGlueConfig, SuperGlueError};
use sg_superpoint::{SuperPoint, SuperPointConfig, SuperPointError};
use std::path::Path;
use thiserror::Error;

pub use sg_core;
pub use sg_superglue;
pub use sg_superpoint;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("SuperPoint error: {0}")]
    SuperPoint(#[from] SuperPointError),

    #[error("SuperGlue error: {0}")]
    SuperGlue(#[from] SuperGlueError),

    #[error("engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),

    #[error(transparent)]
    TomlSer(#[from] toml::ser::Error),
}

pub type PipelineResult<T> = Result<T, PipelineError>;

/// Configuration of a detector/matcher pair, stored as TOML or JSON
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub superpoint: SuperPointConfig,
    pub superglue: SuperGlueConfig,
}

impl PipelineConfig {
    pub fn new(superpoint: SuperPointConfig, superglue: SuperGlueConfig) -> Self {
        Self {
            superpoint,
            superglue,
        }
    }

    /// Same compute device for both networks
    pub fn with_device(mut self, device: Device) -> Self {
        self.superpoint.device = device;
        self.superglue.device = device;
        self
    }

    pub fn validate(&self) -> PipelineResult<()> {
        self.superpoint.validate()?;
        self.superglue.validate()?;
        Ok(())
    }

    /// Check that both weights files exist and can be opened
    pub fn check_weights(&self) -> PipelineResult<()> {
        validate_weights_path(&self.superpoint.weights_path)?;
        validate_weights_path(&self.superglue.weights_path)?;
        Ok(())
    }

    pub fn summary(&self) -> String {
        format!("{}\n{}", self.superpoint.summary(), self.superglue.summary())
    }

    pub fn to_json(&self) -> PipelineResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> PipelineResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> PipelineResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn from_toml(toml_str: &str) -> PipelineResult<Self> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Write as JSON when the extension is `.json`, TOML otherwise
    pub fn save<P: AsRef<Path>>(&self, path: P) -> PipelineResult<()> {
        let path = path.as_ref();
        let text = if is_json(path) {
            self.to_json()?
        } else {
            self.to_toml()?
        };
        std::fs::write(path, text)?;
        Ok(())
    }

    /// Read JSON when the extension is `.json`, TOML otherwise
    pub fn load<P: AsRef<Path>>(path: P) -> PipelineResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        if is_json(path) {
            Self::from_json(&text)
        } else {
            Self::from_toml(&text)
        }
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .map_or(false, |ext| ext.eq_ignore_ascii_case("json"))
}

/// Features of both images plus the correspondences between them
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    pub query: FeatureSet,
    pub train: FeatureSet,
    pub correspondences: Vec<Correspondence>,
}

/// High-level pipeline combining a feature detector with a feature matcher
pub struct FeaturePipeline<D, M> {
    detector: D,
    matcher: M,
}

impl<D, M> FeaturePipeline<D, M>
where
    D: FeatureDetector,
    M: FeatureMatcher,
    PipelineError: From<D::Error> + From<M::Error>,
{
    pub fn new(detector: D, matcher: M) -> Self {
        Self { detector, matcher }
    }

    pub fn detect(&self, image: &DynamicImage, mask: Option<&GrayImage>) -> PipelineResult<FeatureSet> {
        Ok(self.detector.detect(image, mask)?)
    }

    /// Detect in both images and match query against train
    pub fn match_images(&self, query: &DynamicImage, train: &DynamicImage) -> PipelineResult<MatchResult> {
        let query_features = self.detect(query, None)?;
        let train_features = self.detect(train, None)?;
        let correspondences = self.matcher.match_features(
            &query_features,
            image_size(query),
            &train_features,
            image_size(train),
        )?;
        debug!(
            "{} query / {} train keypoints, {} correspondences",
            query_features.len(),
            train_features.len(),
            correspondences.len()
        );
        Ok(MatchResult {
            query: query_features,
            train: train_features,
            correspondences,
        })
    }

    /// Open and match two image files
    pub fn match_files<P: AsRef<Path>, Q: AsRef<Path>>(&self, query: P, train: Q) -> PipelineResult<MatchResult> {
        let query = image::open(query)?;
        let train = image::open(train)?;
        self.match_images(&query, &train)
    }

    pub fn detector(&self) -> &D {
        &self.detector
    }

    pub fn matcher(&self) -> &M {
        &self.matcher
    }
}

impl<E1: InferenceEngine, E2: InferenceEngine> FeaturePipeline<SuperPoint<E1>, SuperGlue<E2>> {
    /// Load both networks described by `config` through the given loaders
    pub fn load<F1, F2>(config: PipelineConfig, superpoint_loader: F1, superglue_loader: F2) -> PipelineResult<Self>
    where
        F1: FnOnce(&Path, Device) -> Result<E1, EngineError>,
        F2: FnOnce(&Path, Device) -> Result<E2, EngineError>,
    {
        config.validate()?;
        info!("building pipeline\n{}", config.summary());
        let detector = SuperPoint::load(config.superpoint, superpoint_loader)?;
        let matcher = SuperGlue::load(config.superglue, superglue_loader)?;
        Ok(Self::new(detector, matcher))
    }
}

fn image_size(image: &DynamicImage) -> ImageSize {
    ImageSize::new(image.width() as usize, image.height() as usize)
}
