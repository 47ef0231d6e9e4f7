use serde::{Deserialize, Serialize};

use crate::error::{Result, ZiaError};

/// Ordered raw feature values for a single call. Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    pub fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.0
    }
}

impl From<Vec<f64>> for FeatureVector {
    fn from(values: Vec<f64>) -> Self {
        Self(values)
    }
}

/// Per-feature mean and scale computed at training time.
///
/// Construction checks `len(means) == len(scales)`; the shared length is the
/// model's feature arity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawParameters")]
pub struct StandardizationParameters {
    means: Vec<f64>,
    scales: Vec<f64>,
}

#[derive(Deserialize)]
struct RawParameters {
    means: Vec<f64>,
    scales: Vec<f64>,
}

impl TryFrom<RawParameters> for StandardizationParameters {
    type Error = ZiaError;

    fn try_from(raw: RawParameters) -> Result<Self> {
        Self::new(raw.means, raw.scales)
    }
}

impl StandardizationParameters {
    pub fn new(means: Vec<f64>, scales: Vec<f64>) -> Result<Self> {
        if means.is_empty() {
            return Err(ZiaError::Validation("means must not be empty".to_string()));
        }
        if means.len() != scales.len() {
            return Err(ZiaError::Validation(format!(
                "means length {} != scales length {}",
                means.len(),
                scales.len()
            )));
        }
        if means.iter().chain(scales.iter()).any(|v| !v.is_finite()) {
            return Err(ZiaError::Validation(
                "means and scales must be finite".to_string(),
            ));
        }
        Ok(Self { means, scales })
    }

    pub fn arity(&self) -> usize {
        self.means.len()
    }

    pub fn means(&self) -> &[f64] {
        &self.means
    }

    pub fn scales(&self) -> &[f64] {
        &self.scales
    }
}
