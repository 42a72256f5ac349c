use crate::error::{CoreError, CoreResult};
use ndarray::{Array, ArrayD, Dimension};
use std::collections::BTreeMap;

/// Dense tensor exchanged with an inference engine.
///
/// The networks only ever exchange 32-bit floats and 64-bit integer indices.
#[derive(Debug, Clone, PartialEq)]
pub enum Tensor {
    F32(ArrayD<f32>),
    I64(ArrayD<i64>),
}

impl Tensor {
    pub fn shape(&self) -> &[usize] {
        match self {
            Tensor::F32(a) => a.shape(),
            Tensor::I64(a) => a.shape(),
        }
    }

    pub fn dtype(&self) -> &'static str {
        match self {
            Tensor::F32(_) => "f32",
            Tensor::I64(_) => "i64",
        }
    }

    pub fn as_f32(&self) -> Option<&ArrayD<f32>> {
        match self {
            Tensor::F32(a) => Some(a),
            Tensor::I64(_) => None,
        }
    }

    pub fn as_i64(&self) -> Option<&ArrayD<i64>> {
        match self {
            Tensor::I64(a) => Some(a),
            Tensor::F32(_) => None,
        }
    }
}

impl<D: Dimension> From<Array<f32, D>> for Tensor {
    fn from(a: Array<f32, D>) -> Self {
        Tensor::F32(a.into_dyn())
    }
}

impl<D: Dimension> From<Array<i64, D>> for Tensor {
    fn from(a: Array<i64, D>) -> Self {
        Tensor::I64(a.into_dyn())
    }
}

/// Tensor bundle keyed by name, iterated in name order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TensorMap {
    tensors: BTreeMap<String, Tensor>,
}

impl TensorMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, tensor: impl Into<Tensor>) {
        self.tensors.insert(name.into(), tensor.into());
    }

    /// Builder-style insert
    pub fn with(mut self, name: impl Into<String>, tensor: impl Into<Tensor>) -> Self {
        self.insert(name, tensor);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Tensor> {
        self.tensors.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tensors.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tensors.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tensors.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Tensor)> {
        self.tensors.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn get_f32(&self, name: &str) -> CoreResult<&ArrayD<f32>> {
        let tensor = self.require(name)?;
        tensor.as_f32().ok_or_else(|| type_error(name, "f32", tensor))
    }

    pub fn get_i64(&self, name: &str) -> CoreResult<&ArrayD<i64>> {
        let tensor = self.require(name)?;
        tensor.as_i64().ok_or_else(|| type_error(name, "i64", tensor))
    }

    /// Remove and return a float tensor without copying it
    pub fn take_f32(&mut self, name: &str) -> CoreResult<ArrayD<f32>> {
        match self.tensors.remove(name) {
            Some(Tensor::F32(a)) => Ok(a),
            Some(other) => {
                let err = type_error(name, "f32", &other);
                self.tensors.insert(name.to_string(), other);
                Err(err)
            }
            None => Err(CoreError::MissingTensor(name.to_string())),
        }
    }

    fn require(&self, name: &str) -> CoreResult<&Tensor> {
        self.tensors
            .get(name)
            .ok_or_else(|| CoreError::MissingTensor(name.to_string()))
    }
}

fn type_error(name: &str, expected: &'static str, tensor: &Tensor) -> CoreError {
    CoreError::TensorType {
        name: name.to_string(),
        expected,
        actual: tensor.dtype(),
    }
}
