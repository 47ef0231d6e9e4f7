//! ONNX inference wrapper (pure Rust via `tract-onnx`).
//!
//! Model load and execution are CPU-bound, so the async engine hands them to
//! the blocking pool.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{Result, ZiaError};
use crate::ml::engine::{InferenceEngine, InferenceSession, ModelSpec, Tensor, TensorMap};

use tract_onnx::prelude::*;

pub struct OnnxModel {
    plan: TypedRunnableModel<TypedModel>,
    input_shape: Vec<usize>,
    output_dim: usize,
}

impl std::fmt::Debug for OnnxModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxModel")
            .field("input_shape", &self.input_shape)
            .field("output_dim", &self.output_dim)
            .finish()
    }
}

fn engine_err<E: std::fmt::Display>(stage: &str) -> impl Fn(E) -> ZiaError + '_ {
    move |e| ZiaError::Engine(format!("onnx {stage} failed: {e}"))
}

impl OnnxModel {
    /// Load an ONNX model and specialize it to a fixed `[1, input_dim]` f32
    /// input, bound to the named graph input and output.
    pub fn load_for_vec_input(
        path: &str,
        input_dim: usize,
        input_name: &str,
        output_name: &str,
    ) -> Result<Self> {
        if input_dim == 0 {
            return Err(ZiaError::Validation("input_dim must be > 0".to_string()));
        }
        let input_shape = [1, input_dim];

        let model = tract_onnx::onnx()
            .model_for_path(path)
            .map_err(engine_err("load"))?
            .with_input_names([input_name])
            .map_err(engine_err("input binding"))?
            .with_output_names([output_name])
            .map_err(engine_err("output binding"))?
            .with_input_fact(
                0,
                InferenceFact::dt_shape(f32::datum_type(), tvec!(1, input_dim)),
            )
            .map_err(engine_err("input fact"))?;

        let plan = model
            .into_optimized()
            .map_err(engine_err("optimize"))?
            .into_runnable()
            .map_err(engine_err("runnable"))?;

        // Infer output_dim by running a dummy forward pass.
        let dummy = tract_ndarray::ArrayD::<f32>::zeros(tract_ndarray::IxDyn(&input_shape))
            .into_tvalue();
        let outputs = plan.run(tvec!(dummy)).map_err(engine_err("run"))?;
        let out0 = outputs
            .first()
            .ok_or_else(|| ZiaError::Engine("onnx produced no outputs".to_string()))?;
        let output_dim = out0
            .to_array_view::<f32>()
            .map_err(engine_err("output decode"))?
            .len();
        if output_dim == 0 {
            return Err(ZiaError::Engine("onnx output has zero elements".to_string()));
        }

        Ok(Self {
            plan,
            input_shape: input_shape.to_vec(),
            output_dim,
        })
    }

    pub fn input_dim(&self) -> usize {
        self.input_shape.last().copied().unwrap_or(0)
    }

    pub fn output_dim(&self) -> usize {
        self.output_dim
    }

    /// Run inference on a single feature row.
    pub fn predict(&self, input: &[f32]) -> Result<Vec<f32>> {
        let expected: usize = self.input_shape.iter().product();
        if input.len() != expected {
            return Err(ZiaError::FeatureCountMismatch {
                expected,
                got: input.len(),
            });
        }

        let tensor = tract_ndarray::ArrayD::<f32>::from_shape_vec(
            tract_ndarray::IxDyn(&self.input_shape),
            input.to_vec(),
        )
        .map_err(|e| ZiaError::Internal(format!("onnx input reshape failed: {e}")))?
        .into_tvalue();

        let outputs = self.plan.run(tvec!(tensor)).map_err(engine_err("run"))?;
        let out0 = outputs
            .first()
            .ok_or_else(|| ZiaError::Engine("onnx produced no outputs".to_string()))?;
        let arr = out0
            .to_array_view::<f32>()
            .map_err(engine_err("output decode"))?;

        Ok(arr.iter().copied().collect())
    }
}

/// [`InferenceEngine`] backed by `tract-onnx`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TractEngine;

impl TractEngine {
    pub fn new() -> Self {
        Self
    }
}

struct TractSession {
    model: Arc<OnnxModel>,
    spec: ModelSpec,
}

#[async_trait]
impl InferenceSession for TractSession {
    async fn run(&self, mut feeds: TensorMap) -> Result<TensorMap> {
        let input = feeds.remove(&self.spec.input_name).ok_or_else(|| {
            ZiaError::Engine(format!("missing input tensor '{}'", self.spec.input_name))
        })?;

        let model = Arc::clone(&self.model);
        let data = tokio::task::spawn_blocking(move || model.predict(input.data()))
            .await
            .map_err(|e| ZiaError::Internal(format!("inference task failed: {e}")))??;

        let output = Tensor::new(vec![1, data.len()], data)?;
        debug!(model = %self.spec.kind, output = ?output.data(), "onnx run complete");

        let mut outputs = TensorMap::new();
        outputs.insert(self.spec.output_name.clone(), output);
        Ok(outputs)
    }
}

#[async_trait]
impl InferenceEngine for TractEngine {
    async fn create_session(&self, spec: &ModelSpec) -> Result<Arc<dyn InferenceSession>> {
        let load_spec = spec.clone();
        let model = tokio::task::spawn_blocking(move || {
            OnnxModel::load_for_vec_input(
                &load_spec.path,
                load_spec.input_dim,
                &load_spec.input_name,
                &load_spec.output_name,
            )
        })
        .await
        .map_err(|e| ZiaError::Internal(format!("model load task failed: {e}")))??;

        info!(
            model = %spec.kind,
            model_path = %spec.path,
            input_dim = model.input_dim(),
            output_dim = model.output_dim(),
            "loaded ONNX model"
        );

        Ok(Arc::new(TractSession {
            model: Arc::new(model),
            spec: spec.clone(),
        }))
    }
}
