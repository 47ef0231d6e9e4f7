use rust_decimal::prelude::*;
use serde::Serialize;

use super::ModelKind;

/// Fixed 3-decimal text, rounding midpoints away from zero.
///
/// Works on the exact binary value, so `1.0005` (stored slightly below the
/// midpoint) still rounds down.
pub fn fixed3(value: f64) -> String {
    match Decimal::from_f64_retain(value) {
        Some(d) => format!(
            "{:.3}",
            d.round_dp_with_strategy(3, RoundingStrategy::MidpointAwayFromZero)
        ),
        None => format!("{value:.3}"),
    }
}

/// Regression output. `value` keeps full precision; rounding is display-only.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RegressionPrediction {
    pub value: f64,
}

impl RegressionPrediction {
    /// Display form, rounded to 3 decimals.
    pub fn display(&self) -> String {
        fixed3(self.value)
    }
}

/// Winning class derived from one set of logits.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationDecision {
    pub class_index: usize,
    pub label: String,
    pub probability: f64,
    /// Full softmax distribution in class order
    pub probabilities: Vec<f64>,
}

impl ClassificationDecision {
    pub fn display(&self) -> String {
        format!(
            "{} (class {}, prob = {})",
            self.label,
            self.class_index,
            fixed3(self.probability)
        )
    }
}

/// Result of one pipeline invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum PipelineOutcome {
    Regression(RegressionPrediction),
    Classification(ClassificationDecision),
}

impl PipelineOutcome {
    pub fn kind(&self) -> ModelKind {
        match self {
            PipelineOutcome::Regression(_) => ModelKind::Regression,
            PipelineOutcome::Classification(_) => ModelKind::Classification,
        }
    }

    pub fn display(&self) -> String {
        match self {
            PipelineOutcome::Regression(p) => p.display(),
            PipelineOutcome::Classification(d) => d.display(),
        }
    }
}
