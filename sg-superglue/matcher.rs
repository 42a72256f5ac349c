use crate::assembler::assemble;
use crate::config::SuperGlueConfig;
use crate::decoder::{decode_assignment, MATCHES0};
use crate::error::{SuperGlueError, SuperGlueResult};
use log::{debug, warn};
use sg_core::{
    load_engine, Correspondence, Device, EngineError, FeatureMatcher, FeatureSet, ImageSize,
    InferenceEngine,
};
use std::path::Path;

/// SuperGlue matcher. Immutable after construction, `match_features` takes `&self`.
pub struct SuperGlue<E> {
    cfg: SuperGlueConfig,
    engine: E,
}

impl<E: InferenceEngine> SuperGlue<E> {
    pub fn new(cfg: SuperGlueConfig, engine: E) -> SuperGlueResult<Self> {
        cfg.validate()?;

        let actual = engine.device();
        if actual != cfg.device {
            if cfg.device.is_cpu() {
                debug!("engine runs on {} although cpu was requested", actual);
            } else {
                warn!("{} is not available to the engine, falling back to {}", cfg.device, actual);
            }
        }
        debug!("superglue: {}", cfg.summary());
        Ok(Self { cfg, engine })
    }

    /// Validates the configured weights path and loads the engine through `loader`
    pub fn load<F>(cfg: SuperGlueConfig, loader: F) -> SuperGlueResult<Self>
    where
        F: FnOnce(&Path, Device) -> Result<E, EngineError>,
    {
        cfg.validate()?;
        let engine = load_engine(&cfg.weights_path, cfg.device, loader)?;
        Self::new(cfg, engine)
    }

    pub fn config(&self) -> &SuperGlueConfig {
        &self.cfg
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }
}

impl<E: InferenceEngine> FeatureMatcher for SuperGlue<E> {
    type Error = SuperGlueError;

    fn match_features(
        &self,
        query: &FeatureSet,
        query_size: ImageSize,
        train: &FeatureSet,
        train_size: ImageSize,
    ) -> SuperGlueResult<Vec<Correspondence>> {
        let inputs = match assemble(query, query_size, train, train_size, self.cfg.match_threshold)? {
            Some(inputs) => inputs,
            None => {
                debug!(
                    "skipping match: {} query / {} train keypoints",
                    query.len(),
                    train.len()
                );
                return Ok(Vec::new());
            }
        };

        let outputs = self.engine.run(&inputs)?;
        let matches0 = outputs.get_i64(MATCHES0)?;
        let correspondences = decode_assignment(matches0, query.len(), train.len())?;

        debug!(
            "{} correspondences between {} query and {} train keypoints",
            correspondences.len(),
            query.len(),
            train.len()
        );
        Ok(correspondences)
    }
}
