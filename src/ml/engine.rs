//! Boundary to the external tensor-inference runtime.
//!
//! The pipelines only see these traits. `TractEngine` (feature `onnx`) is the
//! production implementation; tests plug in stubs.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::ModelKind;
use crate::error::{Result, ZiaError};

pub const DEFAULT_INPUT_NAME: &str = "input";
pub const DEFAULT_OUTPUT_NAME: &str = "output";

/// Dense row-major `f32` tensor.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    shape: Vec<usize>,
    data: Vec<f32>,
}

impl Tensor {
    pub fn new(shape: Vec<usize>, data: Vec<f32>) -> Result<Self> {
        let expected: usize = shape.iter().product();
        if shape.is_empty() || expected != data.len() {
            return Err(ZiaError::Validation(format!(
                "tensor shape {:?} does not fit {} values",
                shape,
                data.len()
            )));
        }
        Ok(Self { shape, data })
    }

    /// Single-row batch `[1, N]` from standardized features.
    pub fn batch_row(features: &[f64]) -> Result<Self> {
        let data: Vec<f32> = features.iter().map(|v| *v as f32).collect();
        Self::new(vec![1, data.len()], data)
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn into_data(self) -> Vec<f32> {
        self.data
    }
}

/// Name-keyed tensors, used both for feeds and for outputs.
pub type TensorMap = HashMap<String, Tensor>;

/// Everything an engine needs to build a session for one model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSpec {
    pub kind: ModelKind,
    pub path: String,
    pub input_dim: usize,
    pub input_name: String,
    pub output_name: String,
}

impl ModelSpec {
    pub fn new(kind: ModelKind, path: impl Into<String>, input_dim: usize) -> Self {
        Self {
            kind,
            path: path.into(),
            input_dim,
            input_name: DEFAULT_INPUT_NAME.to_string(),
            output_name: DEFAULT_OUTPUT_NAME.to_string(),
        }
    }

    pub fn input_shape(&self) -> [usize; 2] {
        [1, self.input_dim]
    }
}

/// A loaded model, ready to run. Created once per model and shared.
#[async_trait]
pub trait InferenceSession: Send + Sync {
    async fn run(&self, feeds: TensorMap) -> Result<TensorMap>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InferenceEngine: Send + Sync {
    async fn create_session(&self, spec: &ModelSpec) -> Result<Arc<dyn InferenceSession>>;
}

/// Submit one `[1, N]` row under the spec's input name and return the flat
/// buffer stored under its output name.
pub async fn run_row(
    session: &dyn InferenceSession,
    spec: &ModelSpec,
    features: &[f64],
) -> Result<Vec<f32>> {
    if features.len() != spec.input_dim {
        return Err(ZiaError::FeatureCountMismatch {
            expected: spec.input_dim,
            got: features.len(),
        });
    }

    let mut feeds = TensorMap::new();
    feeds.insert(spec.input_name.clone(), Tensor::batch_row(features)?);

    let mut outputs = session.run(feeds).await?;
    let output = outputs.remove(&spec.output_name).ok_or_else(|| {
        ZiaError::InvalidOutput(format!(
            "{} model returned no tensor named '{}'",
            spec.kind, spec.output_name
        ))
    })?;
    Ok(output.into_data())
}
