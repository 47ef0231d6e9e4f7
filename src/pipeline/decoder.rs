//! Raw model outputs to predictions.
//!
//! Regression passes the first scalar through unchanged. Classification runs
//! a numerically stable softmax over the logits and picks the arg-max class,
//! with the lowest index winning exact ties.

use crate::domain::{ClassificationDecision, RegressionPrediction};
use crate::error::{Result, ZiaError};

/// Floor for the softmax denominator.
pub const DENOMINATOR_EPSILON: f64 = 1e-8;

/// Default iris label table, in logit order.
pub const IRIS_CLASS_NAMES: [&str; 3] = ["setosa", "versicolor", "virginica"];

pub fn decode_regression(output: &[f32]) -> Result<RegressionPrediction> {
    let value = output.first().copied().ok_or_else(|| {
        ZiaError::InvalidOutput("regression model produced no values".to_string())
    })?;
    Ok(RegressionPrediction {
        value: f64::from(value),
    })
}

/// Decode classification logits against a label table.
///
/// The logit count must match the label count.
pub fn decode_classification<S: AsRef<str>>(
    logits: &[f32],
    labels: &[S],
) -> Result<ClassificationDecision> {
    if logits.len() != labels.len() {
        return Err(ZiaError::InvalidOutput(format!(
            "expected {} logits, got {}",
            labels.len(),
            logits.len()
        )));
    }

    let logits: Vec<f64> = logits.iter().map(|v| f64::from(*v)).collect();
    let probabilities = softmax(&logits);
    let class_index = argmax(&probabilities).ok_or_else(|| {
        ZiaError::InvalidOutput("classification model produced no logits".to_string())
    })?;

    Ok(ClassificationDecision {
        class_index,
        label: class_label(labels, class_index),
        probability: probabilities[class_index],
        probabilities,
    })
}

/// Softmax with the max logit subtracted before exponentiating.
///
/// Non-finite logits contribute zero mass. The denominator is floored at
/// [`DENOMINATOR_EPSILON`], so a vector with no finite logits maps to all
/// zeros.
pub fn softmax(logits: &[f64]) -> Vec<f64> {
    let max = logits
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(f64::NEG_INFINITY, f64::max);
    if !max.is_finite() {
        return vec![0.0; logits.len()];
    }

    let exps: Vec<f64> = logits
        .iter()
        .map(|&v| if v.is_finite() { (v - max).exp() } else { 0.0 })
        .collect();
    let sum: f64 = exps.iter().sum();
    let denom = if sum == 0.0 { DENOMINATOR_EPSILON } else { sum };

    exps.into_iter().map(|e| e / denom).collect()
}

/// Index of the first maximum, scanning with strict `>`.
pub fn argmax(values: &[f64]) -> Option<usize> {
    let (first, rest) = values.split_first()?;
    let mut best_idx = 0usize;
    let mut best_val = *first;
    for (i, &v) in rest.iter().enumerate() {
        if v > best_val {
            best_val = v;
            best_idx = i + 1;
        }
    }
    Some(best_idx)
}

/// Label for `index`, or `"Class <index>"` when the table is too short.
pub fn class_label<S: AsRef<str>>(labels: &[S], index: usize) -> String {
    labels
        .get(index)
        .map(|s| s.as_ref().to_string())
        .unwrap_or_else(|| format!("Class {index}"))
}
