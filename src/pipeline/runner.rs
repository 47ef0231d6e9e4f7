use std::sync::Arc;
use tracing::{debug, error, instrument, warn};

use crate::config::AppConfig;
use crate::domain::{
    ClassificationDecision, FeatureVector, ModelKind, PipelineOutcome, RegressionPrediction,
    StandardizationParameters,
};
use crate::error::{Result, ZiaError};
use crate::ml::engine::{run_row, InferenceEngine, ModelSpec};
use crate::ml::registry::SessionRegistry;
use crate::pipeline::decoder::{decode_classification, decode_regression};
use crate::pipeline::parser::parse_features;
use crate::pipeline::presentation::{render_error, RegionReport};
use crate::pipeline::standardize::standardize_vector;

/// Static per-model wiring: tensor contract, standardization, labels.
#[derive(Debug, Clone)]
struct ModelPipeline {
    spec: ModelSpec,
    params: StandardizationParameters,
    labels: Vec<String>,
}

impl ModelPipeline {
    fn from_config(config: &AppConfig, kind: ModelKind) -> Result<Self> {
        let model = config.model(kind);
        Ok(Self {
            spec: model.to_spec(kind),
            params: model.standardization()?,
            labels: model.labels.clone(),
        })
    }
}

/// Runs both pipelines against one shared session registry.
///
/// Parser -> Standardizer -> Inference Adapter -> Result Decoder. Each call is
/// independent; only the cached sessions outlive it.
pub struct Predictor {
    registry: Arc<SessionRegistry>,
    regression: ModelPipeline,
    classification: ModelPipeline,
}

impl Predictor {
    pub fn new(config: &AppConfig, engine: Arc<dyn InferenceEngine>) -> Result<Self> {
        config.validate()?;
        let regression = ModelPipeline::from_config(config, ModelKind::Regression)?;
        let classification = ModelPipeline::from_config(config, ModelKind::Classification)?;
        let registry = Arc::new(SessionRegistry::new(
            engine,
            [regression.spec.clone(), classification.spec.clone()],
        ));

        Ok(Self {
            registry,
            regression,
            classification,
        })
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    fn pipeline(&self, kind: ModelKind) -> &ModelPipeline {
        match kind {
            ModelKind::Regression => &self.regression,
            ModelKind::Classification => &self.classification,
        }
    }

    /// Parse, check arity, standardize, run. Returns the raw output buffer.
    async fn infer(&self, kind: ModelKind, raw: &str) -> Result<Vec<f32>> {
        let pipeline = self.pipeline(kind);

        let features = FeatureVector::new(parse_features(raw)?);
        if features.len() != pipeline.spec.input_dim {
            return Err(ZiaError::FeatureCountMismatch {
                expected: pipeline.spec.input_dim,
                got: features.len(),
            });
        }

        let scaled = standardize_vector(&features, &pipeline.params)?;
        debug!(model = %kind, raw = ?features.as_slice(), scaled = ?scaled.as_slice(), "standardized features");

        let session = self.registry.get_or_create(kind).await?;
        let output = run_row(session.as_ref(), &pipeline.spec, scaled.as_slice()).await?;
        debug!(model = %kind, output = ?output, "inference complete");
        Ok(output)
    }

    pub async fn predict_regression(&self, raw: &str) -> Result<RegressionPrediction> {
        let output = self.infer(ModelKind::Regression, raw).await?;
        decode_regression(&output)
    }

    pub async fn classify(&self, raw: &str) -> Result<ClassificationDecision> {
        let output = self.infer(ModelKind::Classification, raw).await?;
        decode_classification(&output, &self.classification.labels)
    }

    pub async fn run(&self, kind: ModelKind, raw: &str) -> Result<PipelineOutcome> {
        match kind {
            ModelKind::Regression => self
                .predict_regression(raw)
                .await
                .map(PipelineOutcome::Regression),
            ModelKind::Classification => {
                self.classify(raw).await.map(PipelineOutcome::Classification)
            }
        }
    }

    /// Run one invocation and produce the text for its output region.
    ///
    /// Never fails: errors are logged and rendered as `"Error: <message>"`.
    #[instrument(skip(self, raw), fields(model = %kind))]
    pub async fn render(&self, kind: ModelKind, raw: &str) -> String {
        match self.run(kind, raw).await {
            Ok(outcome) => outcome.display(),
            Err(e) => {
                if e.is_input_error() {
                    warn!(model = %kind, error = %e, details = ?e, "rejected inference input");
                } else {
                    error!(model = %kind, error = %e, details = ?e, "inference request failed");
                }
                render_error(&e)
            }
        }
    }
}

/// One standalone invocation, predictor setup included.
///
/// Setup failures (no engine, invalid config) land in the region like any
/// pipeline error.
pub async fn report_once(
    config: &AppConfig,
    engine: Result<Arc<dyn InferenceEngine>>,
    kind: ModelKind,
    raw: &str,
) -> RegionReport {
    let result = match engine.and_then(|engine| Predictor::new(config, engine)) {
        Ok(predictor) => predictor.run(kind, raw).await,
        Err(e) => Err(e),
    };
    if let Err(e) = &result {
        if e.is_input_error() {
            warn!(model = %kind, error = %e, "rejected inference input");
        } else {
            error!(model = %kind, error = %e, details = ?e, "inference request failed");
        }
    }
    RegionReport::new(kind, result)
}

impl std::fmt::Debug for Predictor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Predictor")
            .field("registry", &self.registry)
            .field("regression", &self.regression.spec)
            .field("classification", &self.classification.spec)
            .finish()
    }
}
