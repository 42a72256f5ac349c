use crate::builder::SuperPointBuilder;
use crate::error::{SuperPointError, SuperPointResult};
use sg_core::{Device, ImageSize};
use std::path::PathBuf;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Working resolution the network runs at unless configured otherwise
pub const DEFAULT_WORKING_SIZE: ImageSize = ImageSize::new(640, 480);

/// Spatial downsampling between the score grid and the descriptor grid
pub const CELL_SIZE: usize = 8;

/// Complete SuperPoint configuration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SuperPointConfig {
    /// Serialized network handed to the engine loader
    pub weights_path: PathBuf,
    /// Resolution the image is resized to before inference
    pub working_size: ImageSize,
    /// Minimum score for a grid cell to become a keypoint
    pub confidence_threshold: f32,
    /// Cells closer than this to any edge are never keypoints
    pub border_margin: usize,
    /// NMS radius in working-resolution pixels, `<= 0` disables NMS
    pub nms_radius: i32,
    /// Grid-sample convention used by the descriptor sampler
    pub align_corners: bool,
    pub device: Device,
    /// Threads used for descriptor sampling, `0` = one per CPU
    pub n_threads: usize,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub name: Option<String>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub description: Option<String>,
}

impl Default for SuperPointConfig {
    fn default() -> Self {
        Self {
            weights_path: PathBuf::new(),
            working_size: DEFAULT_WORKING_SIZE,
            confidence_threshold: 0.015,
            border_margin: 4,
            nms_radius: 2,
            align_corners: true,
            device: Device::Cpu,
            n_threads: 0,
            name: None,
            description: None,
        }
    }
}

impl SuperPointConfig {
    /// Default settings reading weights from `weights_path`
    pub fn new(weights_path: impl Into<PathBuf>) -> Self {
        Self {
            weights_path: weights_path.into(),
            ..Self::default()
        }
    }

    /// Fewer, stronger keypoints spread further apart
    pub fn sparse_preset(weights_path: impl Into<PathBuf>) -> Self {
        Self {
            confidence_threshold: 0.05,
            nms_radius: 4,
            name: Some("Sparse".to_string()),
            description: Some("High threshold, wide suppression".to_string()),
            ..Self::new(weights_path)
        }
    }

    /// Many keypoints, suitable for dense tracking
    pub fn dense_preset(weights_path: impl Into<PathBuf>) -> Self {
        Self {
            confidence_threshold: 0.005,
            nms_radius: 1,
            name: Some("Dense".to_string()),
            description: Some("Low threshold, narrow suppression".to_string()),
            ..Self::new(weights_path)
        }
    }

    pub fn with_metadata(mut self, name: &str, description: &str) -> Self {
        self.name = Some(name.to_string());
        self.description = Some(description.to_string());
        self
    }

    pub fn to_builder(self) -> SuperPointBuilder {
        SuperPointBuilder::from_config(self)
    }

    /// Size of the descriptor grid the network produces for this configuration
    pub fn descriptor_grid_size(&self) -> ImageSize {
        ImageSize::new(
            self.working_size.width / CELL_SIZE,
            self.working_size.height / CELL_SIZE,
        )
    }

    /// Human-readable one-line summary
    pub fn summary(&self) -> String {
        format!(
            "SuperPointConfig: {}, threshold={}, border={}, nms_radius={}, align_corners={}, device={}, weights={}",
            self.working_size,
            self.confidence_threshold,
            self.border_margin,
            self.nms_radius,
            self.align_corners,
            self.device,
            self.weights_path.display()
        )
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> SuperPointResult<()> {
        let ImageSize { width, height } = self.working_size;
        if width == 0 || height == 0 || width % CELL_SIZE != 0 || height % CELL_SIZE != 0 {
            return Err(SuperPointError::InvalidWorkingSize { width, height });
        }
        if !self.confidence_threshold.is_finite() || self.confidence_threshold < 0.0 {
            return Err(SuperPointError::InvalidThreshold(self.confidence_threshold));
        }
        if 2 * self.border_margin >= width.min(height) {
            return Err(SuperPointError::InvalidBorder {
                border: self.border_margin,
                width,
                height,
            });
        }
        Ok(())
    }

    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> SuperPointResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> SuperPointResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    #[cfg(feature = "serde")]
    pub fn to_toml(&self) -> SuperPointResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    #[cfg(feature = "serde")]
    pub fn from_toml(toml_str: &str) -> SuperPointResult<Self> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    #[cfg(feature = "serde")]
    pub fn save_json<P: AsRef<std::path::Path>>(&self, path: P) -> SuperPointResult<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    #[cfg(feature = "serde")]
    pub fn load_json<P: AsRef<std::path::Path>>(path: P) -> SuperPointResult<Self> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    #[cfg(feature = "serde")]
    pub fn save_toml<P: AsRef<std::path::Path>>(&self, path: P) -> SuperPointResult<()> {
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    #[cfg(feature = "serde")]
    pub fn load_toml<P: AsRef<std::path::Path>>(path: P) -> SuperPointResult<Self> {
        Self::from_toml(&std::fs::read_to_string(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_network() {
        let cfg = SuperPointConfig::default();
        assert_eq!(cfg.working_size, ImageSize::new(640, 480));
        assert_eq!(cfg.confidence_threshold, 0.015);
        assert_eq!(cfg.border_margin, 4);
        assert_eq!(cfg.nms_radius, 2);
        assert!(cfg.align_corners);
        assert_eq!(cfg.device, Device::Cpu);
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.descriptor_grid_size(), ImageSize::new(80, 60));
    }

    #[test]
    fn test_invalid_working_size() {
        let mut cfg = SuperPointConfig::default();
        cfg.working_size = ImageSize::new(0, 480);
        assert!(matches!(cfg.validate(), Err(SuperPointError::InvalidWorkingSize { .. })));

        cfg.working_size = ImageSize::new(642, 480);
        assert!(matches!(cfg.validate(), Err(SuperPointError::InvalidWorkingSize { .. })));
    }

    #[test]
    fn test_invalid_threshold() {
        let mut cfg = SuperPointConfig::default();
        cfg.confidence_threshold = -0.1;
        assert!(matches!(cfg.validate(), Err(SuperPointError::InvalidThreshold(_))));

        cfg.confidence_threshold = f32::NAN;
        assert!(matches!(cfg.validate(), Err(SuperPointError::InvalidThreshold(_))));
    }

    #[test]
    fn test_border_too_large() {
        let mut cfg = SuperPointConfig::default();
        cfg.working_size = ImageSize::new(16, 16);
        cfg.border_margin = 8;
        assert!(matches!(cfg.validate(), Err(SuperPointError::InvalidBorder { border: 8, .. })));
    }

    #[test]
    fn test_presets_are_valid() {
        for cfg in [
            SuperPointConfig::sparse_preset("w.pt"),
            SuperPointConfig::dense_preset("w.pt"),
        ] {
            assert!(cfg.validate().is_ok(), "{}", cfg.summary());
        }
        assert!(
            SuperPointConfig::sparse_preset("w.pt").confidence_threshold
                > SuperPointConfig::dense_preset("w.pt").confidence_threshold
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_toml_round_trip() {
        let cfg = SuperPointConfig::sparse_preset("models/superpoint.pt")
            .with_metadata("Odometry", "Front camera");
        let text = cfg.to_toml().unwrap();
        assert!(text.contains("device = \"cpu\""));
        assert_eq!(SuperPointConfig::from_toml(&text).unwrap(), cfg);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_partial_json_uses_defaults() {
        let cfg = SuperPointConfig::from_json(r#"{ "nms_radius": 0, "device": "cuda:1" }"#).unwrap();
        assert_eq!(cfg.nms_radius, 0);
        assert_eq!(cfg.device, Device::Cuda(1));
        assert_eq!(cfg.border_margin, 4);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_loading_validates() {
        let result = SuperPointConfig::from_json(r#"{ "confidence_threshold": -1.0 }"#);
        assert!(matches!(result, Err(SuperPointError::InvalidThreshold(_))));
    }
}
