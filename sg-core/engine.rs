use crate::error::{CoreError, EngineError};
use crate::tensor::TensorMap;
use log::{debug, info};
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Compute device requested from the inference engine.
///
/// The post-processing never looks at it; it is forwarded to the engine
/// loader and logged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "String", into = "String")
)]
pub enum Device {
    #[default]
    Cpu,
    Cuda(usize),
}

impl Device {
    pub fn is_cpu(&self) -> bool {
        matches!(self, Device::Cpu)
    }
}

impl std::fmt::Display for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Device::Cpu => write!(f, "cpu"),
            Device::Cuda(idx) => write!(f, "cuda:{}", idx),
        }
    }
}

impl FromStr for Device {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        match lower.as_str() {
            "cpu" => Ok(Device::Cpu),
            "cuda" | "gpu" => Ok(Device::Cuda(0)),
            _ => lower
                .strip_prefix("cuda:")
                .and_then(|idx| idx.parse().ok())
                .map(Device::Cuda)
                .ok_or_else(|| CoreError::InvalidDevice(s.to_string())),
        }
    }
}

impl TryFrom<String> for Device {
    type Error = CoreError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Device> for String {
    fn from(device: Device) -> Self {
        device.to_string()
    }
}

/// Opaque neural-network executor: named tensors in, named tensors out.
///
/// Implementations must make `run` safe to call concurrently from several
/// threads through a shared reference; the detector and matcher rely on this
/// when they are shared. Each call blocks until the complete output bundle
/// is available.
pub trait InferenceEngine: Send + Sync {
    fn run(&self, inputs: &TensorMap) -> Result<TensorMap, EngineError>;

    /// Device the engine actually executes on
    fn device(&self) -> Device {
        Device::Cpu
    }
}

impl<E: InferenceEngine + ?Sized> InferenceEngine for Box<E> {
    fn run(&self, inputs: &TensorMap) -> Result<TensorMap, EngineError> {
        (**self).run(inputs)
    }

    fn device(&self) -> Device {
        (**self).device()
    }
}

impl<E: InferenceEngine + ?Sized> InferenceEngine for Arc<E> {
    fn run(&self, inputs: &TensorMap) -> Result<TensorMap, EngineError> {
        (**self).run(inputs)
    }

    fn device(&self) -> Device {
        (**self).device()
    }
}

/// Checks that `path` names an existing, readable regular file.
pub fn validate_weights_path(path: &Path) -> Result<(), EngineError> {
    if path.as_os_str().is_empty() {
        return Err(EngineError::EmptyWeightsPath);
    }
    let metadata = std::fs::metadata(path).map_err(|_| EngineError::WeightsNotFound {
        path: path.to_path_buf(),
    })?;
    if !metadata.is_file() {
        return Err(EngineError::WeightsNotReadable {
            path: path.to_path_buf(),
        });
    }
    std::fs::File::open(path).map_err(|_| EngineError::WeightsNotReadable {
        path: path.to_path_buf(),
    })?;
    Ok(())
}

/// Validates the weights path, then hands it to `loader` to build the engine.
pub fn load_engine<E, F>(weights: &Path, device: Device, loader: F) -> Result<E, EngineError>
where
    E: InferenceEngine,
    F: FnOnce(&Path, Device) -> Result<E, EngineError>,
{
    validate_weights_path(weights)?;
    info!("loading weights from {}", weights.display());
    let engine = loader(weights, device)?;
    debug!("engine ready on device {}", engine.device());
    Ok(engine)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NullEngine;

    impl InferenceEngine for NullEngine {
        fn run(&self, _inputs: &TensorMap) -> Result<TensorMap, EngineError> {
            Ok(TensorMap::new())
        }
    }

    #[test]
    fn test_device_parsing() {
        assert_eq!("cpu".parse::<Device>().unwrap(), Device::Cpu);
        assert_eq!("CUDA".parse::<Device>().unwrap(), Device::Cuda(0));
        assert_eq!("cuda:2".parse::<Device>().unwrap(), Device::Cuda(2));
        assert!(matches!("tpu".parse::<Device>(), Err(CoreError::InvalidDevice(_))));
        assert!("cuda:x".parse::<Device>().is_err());
    }

    #[test]
    fn test_device_display_round_trip() {
        for device in [Device::Cpu, Device::Cuda(1)] {
            assert_eq!(device.to_string().parse::<Device>().unwrap(), device);
        }
    }

    #[test]
    fn test_empty_weights_path() {
        let result = load_engine(Path::new(""), Device::Cpu, |_, _| Ok(NullEngine));
        assert!(matches!(result, Err(EngineError::EmptyWeightsPath)));
    }

    #[test]
    fn test_missing_weights_file() {
        let path = std::env::temp_dir().join("sg-core-no-such-weights.pt");
        let result = load_engine(&path, Device::Cpu, |_, _| Ok(NullEngine));
        assert!(matches!(result, Err(EngineError::WeightsNotFound { .. })));
    }

    #[test]
    fn test_directory_is_not_weights() {
        let result = validate_weights_path(&std::env::temp_dir());
        assert!(matches!(result, Err(EngineError::WeightsNotReadable { .. })));
    }

    #[test]
    fn test_loader_receives_path_and_device() {
        let path = std::env::temp_dir().join("sg-core-engine-weights.pt");
        std::fs::write(&path, b"weights").unwrap();

        let mut seen = None;
        let engine = load_engine(&path, Device::Cuda(1), |p, d| {
            seen = Some((p.to_path_buf(), d));
            Ok(NullEngine)
        });
        assert!(engine.is_ok());
        assert_eq!(seen, Some((path.clone(), Device::Cuda(1))));

        let failing: Result<NullEngine, _> = load_engine(&path, Device::Cpu, |p, _| {
            Err(EngineError::Load {
                path: p.to_path_buf(),
                reason: "corrupt archive".to_string(),
            })
        });
        assert!(matches!(failing, Err(EngineError::Load { .. })));

        std::fs::remove_file(&path).ok();
    }
}
