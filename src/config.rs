use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::domain::{ModelKind, StandardizationParameters};
use crate::error::{Result, ZiaError};
use crate::ml::engine::{ModelSpec, DEFAULT_INPUT_NAME, DEFAULT_OUTPUT_NAME};
use crate::pipeline::decoder::IRIS_CLASS_NAMES;

pub const REG_ONNX_PATH: &str = "./zia_regression_winewhite.onnx";
pub const CLS_ONNX_PATH: &str = "./zia_classification_iris.onnx";

/// Logits produced by the classification model, one per label.
pub const N_CLASSES_CLS: usize = IRIS_CLASS_NAMES.len();

/// White wine quality features, training-set statistics.
pub const MEANS_REG: [f64; 11] = [
    6.865045941807049,
    0.2793376722817761,
    0.33273098519652555,
    6.450701888718721,
    0.04573404798366544,
    35.09456355283308,
    138.0011485451761,
    0.9940706457376164,
    3.189293006636035,
    0.4897805002552349,
    10.508840394759261,
];

pub const SCALES_REG: [f64; 11] = [
    0.8443753700979084,
    0.10159292331295482,
    0.1197423412775926,
    5.138654709456886,
    0.021794640388589484,
    16.674829911539792,
    42.06229805927688,
    0.0030213035674401863,
    0.15016406004141622,
    0.11357548286882742,
    1.2277299542941176,
];

/// Iris features, training-set statistics.
pub const MEANS_CLS: [f64; 4] = [
    5.841666666666668,
    3.0483333333333342,
    3.769999999999999,
    1.2049999999999987,
];

pub const SCALES_CLS: [f64; 4] = [
    0.837415003978845,
    0.44665111913239636,
    1.7611359970201048,
    0.7594789880788891,
];

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub models: ModelsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsConfig {
    pub regression: ModelConfig,
    pub classification: ModelConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Path to the ONNX artifact
    pub path: String,
    /// Per-feature training means
    pub means: Vec<f64>,
    /// Per-feature training scales (standard deviations)
    pub scales: Vec<f64>,
    /// Class labels in logit order (classification only)
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default = "default_input_name")]
    pub input_name: String,
    #[serde(default = "default_output_name")]
    pub output_name: String,
}

fn default_input_name() -> String {
    DEFAULT_INPUT_NAME.to_string()
}

fn default_output_name() -> String {
    DEFAULT_OUTPUT_NAME.to_string()
}

impl ModelConfig {
    pub fn standardization(&self) -> Result<StandardizationParameters> {
        StandardizationParameters::new(self.means.clone(), self.scales.clone())
    }

    pub fn to_spec(&self, kind: ModelKind) -> ModelSpec {
        ModelSpec {
            kind,
            path: self.path.clone(),
            input_dim: self.means.len(),
            input_name: self.input_name.clone(),
            output_name: self.output_name.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable JSON formatted logs
    #[serde(default)]
    pub json: bool,
    /// Directory for a daily rolling log file; console only when unset
    #[serde(default)]
    pub dir: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
            dir: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl AppConfig {
    /// Load configuration from files and environment
    pub fn load() -> Result<Self> {
        Self::load_from("config")
    }

    /// Load configuration from a specific directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_dir = config_dir.as_ref();
        let defaults = Config::try_from(&Self::default_config())?;

        let builder = Config::builder()
            // Start with the bundled wine/iris models
            .add_source(defaults)
            // Load default config file
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Load environment-specific config (e.g., config/production.toml)
            .add_source(
                File::from(config_dir.join(
                    std::env::var("ZIA_ENV").unwrap_or_else(|_| "development".to_string()),
                ))
                .required(false),
            )
            // Override with environment variables (ZIA_MODELS__REGRESSION__PATH, etc.)
            .add_source(
                Environment::with_prefix("ZIA")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Built-in configuration for the bundled models
    pub fn default_config() -> Self {
        Self {
            models: ModelsConfig {
                regression: ModelConfig {
                    path: REG_ONNX_PATH.to_string(),
                    means: MEANS_REG.to_vec(),
                    scales: SCALES_REG.to_vec(),
                    labels: Vec::new(),
                    input_name: default_input_name(),
                    output_name: default_output_name(),
                },
                classification: ModelConfig {
                    path: CLS_ONNX_PATH.to_string(),
                    means: MEANS_CLS.to_vec(),
                    scales: SCALES_CLS.to_vec(),
                    labels: IRIS_CLASS_NAMES.iter().map(|s| s.to_string()).collect(),
                    input_name: default_input_name(),
                    output_name: default_output_name(),
                },
            },
            logging: LoggingConfig::default(),
        }
    }

    pub fn model(&self, kind: ModelKind) -> &ModelConfig {
        match kind {
            ModelKind::Regression => &self.models.regression,
            ModelKind::Classification => &self.models.classification,
        }
    }

    pub fn model_specs(&self) -> Vec<ModelSpec> {
        ModelKind::ALL
            .iter()
            .map(|kind| self.model(*kind).to_spec(*kind))
            .collect()
    }

    /// Check arity and label invariants for both models.
    pub fn validate(&self) -> Result<()> {
        for kind in ModelKind::ALL {
            let model = self.model(kind);
            if model.path.trim().is_empty() {
                return Err(ZiaError::Validation(format!("{kind} model path is empty")));
            }
            let params = model.standardization()?;
            if params.arity() != kind.default_arity() {
                return Err(ZiaError::Validation(format!(
                    "{kind} model expects {} features, configured {}",
                    kind.default_arity(),
                    params.arity()
                )));
            }
            if model.input_name.is_empty() || model.output_name.is_empty() {
                return Err(ZiaError::Validation(format!(
                    "{kind} model tensor names must not be empty"
                )));
            }
        }
        let labels = &self.models.classification.labels;
        if labels.len() != N_CLASSES_CLS {
            return Err(ZiaError::Validation(format!(
                "classification model expects {N_CLASSES_CLS} labels, configured {}",
                labels.len()
            )));
        }
        Ok(())
    }
}
