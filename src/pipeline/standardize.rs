use crate::domain::{FeatureVector, StandardizationParameters};
use crate::error::{Result, ZiaError};

/// Stand-in divisor for a zero scale.
pub const SCALE_EPSILON: f64 = 1e-8;

/// Z-score each feature: `(x[i] - mean[i]) / scale[i]`.
///
/// A zero scale is replaced by [`SCALE_EPSILON`]. Fails with
/// [`ZiaError::FeatureCountMismatch`] when the vector length differs from
/// the parameter arity.
pub fn standardize(raw: &[f64], params: &StandardizationParameters) -> Result<Vec<f64>> {
    let means = params.means();
    let scales = params.scales();

    if raw.len() != means.len() {
        return Err(ZiaError::FeatureCountMismatch {
            expected: means.len(),
            got: raw.len(),
        });
    }

    Ok(raw
        .iter()
        .zip(means.iter().zip(scales.iter()))
        .map(|(x, (mean, scale))| (x - mean) / effective_scale(*scale))
        .collect())
}

/// Typed convenience over [`standardize`].
pub fn standardize_vector(
    raw: &FeatureVector,
    params: &StandardizationParameters,
) -> Result<FeatureVector> {
    standardize(raw.as_slice(), params).map(FeatureVector::new)
}

fn effective_scale(scale: f64) -> f64 {
    if scale == 0.0 {
        SCALE_EPSILON
    } else {
        scale
    }
}
