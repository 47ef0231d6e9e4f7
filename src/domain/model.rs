use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{Result, ZiaError};

/// Which of the two bundled models a pipeline drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    Regression,
    Classification,
}

impl ModelKind {
    pub const ALL: [ModelKind; 2] = [ModelKind::Regression, ModelKind::Classification];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::Regression => "regression",
            ModelKind::Classification => "classification",
        }
    }

    /// Number of raw features the model expects per call.
    pub fn default_arity(&self) -> usize {
        match self {
            ModelKind::Regression => 11,
            ModelKind::Classification => 4,
        }
    }
}

impl std::fmt::Display for ModelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ModelKind {
    type Err = &'static str;

    fn from_str(raw: &str) -> std::result::Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "regression" | "reg" => Ok(Self::Regression),
            "classification" | "cls" => Ok(Self::Classification),
            _ => Err("invalid model; expected regression|classification"),
        }
    }
}

pub fn parse_model_kind(raw: &str) -> Result<ModelKind> {
    ModelKind::from_str(raw).map_err(|e| ZiaError::Validation(e.to_string()))
}
