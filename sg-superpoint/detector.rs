use crate::config::SuperPointConfig;
use crate::error::{SuperPointError, SuperPointResult};
use crate::extractor::extract_candidates;
use crate::nms::non_maximum_suppression;
use crate::preprocess::{image_size, image_tensor, prepare_mask, to_luma};
use crate::rescale::rescale_keypoints;
use crate::sampler::sample_descriptors;
use image::{DynamicImage, GrayImage};
use log::{debug, warn};
use ndarray::{ArrayD, Axis, Ix2, Ix3};
use sg_core::{
    build_thread_pool, load_engine, Descriptor, DescriptorGrid, Device, EngineError,
    FeatureDetector, FeatureSet, ImageSize, InferenceEngine, Keypoint, Mask, ScoreGrid,
    TensorMap,
};
use std::path::Path;

/// Input tensor: `[1, 1, H, W]` grayscale in `[0, 1]`
pub const IMAGE_INPUT: &str = "image";
/// Output tensor: `[1, H, W]` detection confidences
pub const SCORES_OUTPUT: &str = "scores";
/// Output tensor: `[1, C, H/8, W/8]` coarse descriptors
pub const DESCRIPTORS_OUTPUT: &str = "descriptors";

/// SuperPoint keypoint detector and descriptor extractor.
///
/// Holds only immutable state after construction, so `detect` can be called
/// concurrently as long as the engine honours the [`InferenceEngine`]
/// thread-safety contract.
pub struct SuperPoint<E> {
    cfg: SuperPointConfig,
    engine: E,
    pool: rayon::ThreadPool,
}

impl<E: InferenceEngine> SuperPoint<E> {
    /// Creates a detector around an already loaded engine
    pub fn new(cfg: SuperPointConfig, engine: E) -> SuperPointResult<Self> {
        cfg.validate()?;

        let actual = engine.device();
        if actual != cfg.device {
            if cfg.device.is_cpu() {
                debug!("engine runs on {} although cpu was requested", actual);
            } else {
                warn!("{} is not available to the engine, falling back to {}", cfg.device, actual);
            }
        }
        debug!("superpoint: {}", cfg.summary());

        let pool = build_thread_pool(cfg.n_threads)?;
        Ok(Self { cfg, engine, pool })
    }

    /// Validates the configured weights path and loads the engine through `loader`
    pub fn load<F>(cfg: SuperPointConfig, loader: F) -> SuperPointResult<Self>
    where
        F: FnOnce(&Path, Device) -> Result<E, EngineError>,
    {
        cfg.validate()?;
        let engine = load_engine(&cfg.weights_path, cfg.device, loader)?;
        Self::new(cfg, engine)
    }

    /// Run the post-processing on raw network grids.
    ///
    /// Everything stays in working-resolution pixels: threshold and mask,
    /// NMS, then descriptor sampling for the survivors.
    pub fn process_grids(
        &self,
        scores: &ScoreGrid,
        descriptors: &DescriptorGrid,
        mask: Option<&Mask>,
    ) -> SuperPointResult<(Vec<Keypoint>, Vec<Descriptor>)> {
        let working = self.cfg.working_size;
        check_shape(SCORES_OUTPUT, scores.shape(), &[working.height, working.width])?;
        let grid = self.cfg.descriptor_grid_size();
        let (channels, _, _) = descriptors.dim();
        check_shape(
            DESCRIPTORS_OUTPUT,
            descriptors.shape(),
            &[channels, grid.height, grid.width],
        )?;

        let candidates = extract_candidates(
            scores,
            mask,
            self.cfg.confidence_threshold,
            self.cfg.border_margin,
        )?;
        let n_candidates = candidates.len();
        let keypoints = non_maximum_suppression(
            candidates,
            working.height,
            working.width,
            self.cfg.nms_radius,
        )?;
        let descs = self.pool.install(|| {
            sample_descriptors(descriptors, &keypoints, working, self.cfg.align_corners)
        })?;

        debug!(
            "{} candidates above {}, {} after nms",
            n_candidates,
            self.cfg.confidence_threshold,
            keypoints.len()
        );
        Ok((keypoints, descs))
    }

    /// Turn the engine's output bundle into a feature set in `original` pixel space.
    pub fn postprocess(
        &self,
        mut outputs: TensorMap,
        mask: Option<&Mask>,
        original: ImageSize,
    ) -> SuperPointResult<FeatureSet> {
        let scores = score_grid(outputs.take_f32(SCORES_OUTPUT)?)?;
        let descriptors = descriptor_grid(outputs.take_f32(DESCRIPTORS_OUTPUT)?)?;

        let (mut keypoints, descs) = self.process_grids(&scores, &descriptors, mask)?;
        rescale_keypoints(&mut keypoints, self.cfg.working_size, original);
        Ok(FeatureSet::new(keypoints, descs)?)
    }

    /// Get detector configuration
    pub fn config(&self) -> &SuperPointConfig {
        &self.cfg
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }
}

impl<E: InferenceEngine> FeatureDetector for SuperPoint<E> {
    type Error = SuperPointError;

    fn detect(&self, image: &DynamicImage, mask: Option<&GrayImage>) -> SuperPointResult<FeatureSet> {
        let gray = to_luma(image)?;
        let original = image_size(image);
        let working = self.cfg.working_size;
        let mask = mask
            .map(|m| prepare_mask(m, original, working))
            .transpose()?;

        let inputs = TensorMap::new().with(IMAGE_INPUT, image_tensor(&gray, working));
        let outputs = self.engine.run(&inputs)?;
        self.postprocess(outputs, mask.as_ref(), original)
    }
}

/// Accepts `[1, H, W]` or `[H, W]`.
fn score_grid(tensor: ArrayD<f32>) -> SuperPointResult<ScoreGrid> {
    let tensor = drop_batch_axis(tensor, 3);
    let shape = tensor.shape().to_vec();
    tensor
        .into_dimensionality::<Ix2>()
        .map_err(|_| SuperPointError::GridShapeMismatch {
            name: SCORES_OUTPUT,
            expected: vec![1, 0, 0],
            actual: shape,
        })
}

/// Accepts `[1, C, H/8, W/8]` or `[C, H/8, W/8]`.
fn descriptor_grid(tensor: ArrayD<f32>) -> SuperPointResult<DescriptorGrid> {
    let tensor = drop_batch_axis(tensor, 4);
    let shape = tensor.shape().to_vec();
    tensor
        .into_dimensionality::<Ix3>()
        .map_err(|_| SuperPointError::GridShapeMismatch {
            name: DESCRIPTORS_OUTPUT,
            expected: vec![1, 0, 0, 0],
            actual: shape,
        })
}

fn drop_batch_axis(tensor: ArrayD<f32>, batched_ndim: usize) -> ArrayD<f32> {
    if tensor.ndim() == batched_ndim && tensor.shape()[0] == 1 {
        tensor.index_axis_move(Axis(0), 0)
    } else {
        tensor
    }
}

fn check_shape(name: &'static str, actual: &[usize], expected: &[usize]) -> SuperPointResult<()> {
    if actual != expected {
        return Err(SuperPointError::GridShapeMismatch {
            name,
            expected: expected.to_vec(),
            actual: actual.to_vec(),
        });
    }
    Ok(())
}
