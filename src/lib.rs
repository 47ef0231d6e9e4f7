pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod ml;
pub mod pipeline;

pub use config::AppConfig;
pub use domain::{
    ClassificationDecision, FeatureVector, ModelKind, PipelineOutcome, RegressionPrediction,
    StandardizationParameters,
};
pub use error::{Result, ZiaError};
pub use ml::{HandleState, InferenceEngine, InferenceSession, ModelSpec, SessionRegistry};
pub use pipeline::Predictor;
