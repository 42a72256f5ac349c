use crate::config::SuperPointConfig;
use crate::detector::SuperPoint;
use crate::error::SuperPointResult;
use sg_core::{Device, EngineError, ImageSize, InferenceEngine};
use std::path::{Path, PathBuf};

/// Fluent builder for a [`SuperPoint`] detector
#[derive(Debug, Clone, Default)]
pub struct SuperPointBuilder {
    config: SuperPointConfig,
}

impl SuperPointBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: SuperPointConfig) -> Self {
        Self { config }
    }

    pub fn weights(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.weights_path = path.into();
        self
    }

    /// Set the resolution the network runs at
    pub fn working_size(mut self, width: usize, height: usize) -> Self {
        self.config.working_size = ImageSize::new(width, height);
        self
    }

    pub fn confidence_threshold(mut self, threshold: f32) -> Self {
        self.config.confidence_threshold = threshold;
        self
    }

    pub fn border_margin(mut self, border: usize) -> Self {
        self.config.border_margin = border;
        self
    }

    /// Set the NMS radius, `<= 0` disables suppression
    pub fn nms_radius(mut self, radius: i32) -> Self {
        self.config.nms_radius = radius;
        self
    }

    pub fn align_corners(mut self, enable: bool) -> Self {
        self.config.align_corners = enable;
        self
    }

    pub fn device(mut self, device: Device) -> Self {
        self.config.device = device;
        self
    }

    pub fn threads(mut self, n_threads: usize) -> Self {
        self.config.n_threads = n_threads;
        self
    }

    /// Build around an already constructed engine
    pub fn build<E: InferenceEngine>(self, engine: E) -> SuperPointResult<SuperPoint<E>> {
        SuperPoint::new(self.config, engine)
    }

    /// Build by loading the configured weights through `loader`
    pub fn load<E, F>(self, loader: F) -> SuperPointResult<SuperPoint<E>>
    where
        E: InferenceEngine,
        F: FnOnce(&Path, Device) -> Result<E, EngineError>,
    {
        SuperPoint::load(self.config, loader)
    }

    pub fn summary(&self) -> String {
        self.config.summary()
    }

    pub fn to_config(self) -> SuperPointConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_sets_every_field() {
        let cfg = SuperPointBuilder::new()
            .weights("sp.pt")
            .working_size(320, 240)
            .confidence_threshold(0.02)
            .border_margin(2)
            .nms_radius(0)
            .align_corners(false)
            .device(Device::Cuda(0))
            .threads(3)
            .to_config();

        assert_eq!(cfg.weights_path, PathBuf::from("sp.pt"));
        assert_eq!(cfg.working_size, ImageSize::new(320, 240));
        assert_eq!(cfg.confidence_threshold, 0.02);
        assert_eq!(cfg.border_margin, 2);
        assert_eq!(cfg.nms_radius, 0);
        assert!(!cfg.align_corners);
        assert_eq!(cfg.device, Device::Cuda(0));
        assert_eq!(cfg.n_threads, 3);
    }

    #[test]
    fn test_config_round_trip_through_builder() {
        let cfg = SuperPointConfig::dense_preset("sp.pt");
        assert_eq!(cfg.clone().to_builder().to_config(), cfg);
    }
}
