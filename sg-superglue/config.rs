use crate::error::{SuperGlueError, SuperGlueResult};
use sg_core::Device;
use std::path::PathBuf;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Threshold the reference SuperGlue weights apply when none is sent
pub const DEFAULT_MATCH_THRESHOLD: f32 = 0.2;

/// SuperGlue matcher configuration
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SuperGlueConfig {
    pub weights_path: PathBuf,
    /// Sent as the `match_threshold` input when set; networks that do not
    /// take one fall back to their built-in value.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub match_threshold: Option<f32>,
    pub device: Device,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub name: Option<String>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub description: Option<String>,
}

impl SuperGlueConfig {
    pub fn new(weights_path: impl Into<PathBuf>) -> Self {
        Self {
            weights_path: weights_path.into(),
            ..Self::default()
        }
    }

    /// Matcher for exported networks that accept an explicit threshold input
    pub fn thresholded_preset(weights_path: impl Into<PathBuf>, threshold: f32) -> Self {
        Self {
            match_threshold: Some(threshold),
            name: Some("Thresholded".to_string()),
            description: Some(format!("Explicit match threshold {}", threshold)),
            ..Self::new(weights_path)
        }
    }

    pub fn with_match_threshold(mut self, threshold: f32) -> Self {
        self.match_threshold = Some(threshold);
        self
    }

    pub fn with_device(mut self, device: Device) -> Self {
        self.device = device;
        self
    }

    pub fn with_metadata(mut self, name: &str, description: &str) -> Self {
        self.name = Some(name.to_string());
        self.description = Some(description.to_string());
        self
    }

    /// Threshold the network ends up applying
    pub fn effective_match_threshold(&self) -> f32 {
        self.match_threshold.unwrap_or(DEFAULT_MATCH_THRESHOLD)
    }

    pub fn summary(&self) -> String {
        let threshold = match self.match_threshold {
            Some(t) => t.to_string(),
            None => format!("built-in ({})", DEFAULT_MATCH_THRESHOLD),
        };
        format!(
            "SuperGlueConfig: match_threshold={}, device={}, weights={}",
            threshold,
            self.device,
            self.weights_path.display()
        )
    }

    pub fn validate(&self) -> SuperGlueResult<()> {
        if let Some(t) = self.match_threshold {
            if !(0.0..=1.0).contains(&t) {
                return Err(SuperGlueError::InvalidMatchThreshold(t));
            }
        }
        Ok(())
    }

    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> SuperGlueResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> SuperGlueResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    #[cfg(feature = "serde")]
    pub fn to_toml(&self) -> SuperGlueResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    #[cfg(feature = "serde")]
    pub fn from_toml(toml_str: &str) -> SuperGlueResult<Self> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    #[cfg(feature = "serde")]
    pub fn save_json<P: AsRef<std::path::Path>>(&self, path: P) -> SuperGlueResult<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    #[cfg(feature = "serde")]
    pub fn load_json<P: AsRef<std::path::Path>>(path: P) -> SuperGlueResult<Self> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    #[cfg(feature = "serde")]
    pub fn save_toml<P: AsRef<std::path::Path>>(&self, path: P) -> SuperGlueResult<()> {
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    #[cfg(feature = "serde")]
    pub fn load_toml<P: AsRef<std::path::Path>>(path: P) -> SuperGlueResult<Self> {
        Self::from_toml(&std::fs::read_to_string(path)?)
    }
}
