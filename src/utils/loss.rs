//! Loss functions and their derivatives

use crate::error::{NetworkError, Result};
use serde::Deserialize;
use std::fmt;

const LOG_CLAMP_MIN: f32 = 1e-9;

fn check_lengths(actual: &[f32], expected: &[f32]) -> Result<()> {
    if actual.len() != expected.len() {
        return Err(NetworkError::ShapeMismatch(format!(
            "vector dimensions mismatch: arg1 size = {}, arg2 size = {}",
            actual.len(),
            expected.len()
        )));
    }
    Ok(())
}

/// Elementwise squared difference `(actual - expected)²`.
///
/// The vector is not reduced; sum it to get a per-sample loss.
pub fn mse(actual: &[f32], expected: &[f32]) -> Result<Vec<f32>> {
    check_lengths(actual, expected)?;
    Ok(actual
        .iter()
        .zip(expected)
        .map(|(a, e)| (a - e) * (a - e))
        .collect())
}

/// Gradient of mean squared error: `2·(actual - expected)/n`.
pub fn mse_derivative(actual: &[f32], expected: &[f32]) -> Result<Vec<f32>> {
    check_lengths(actual, expected)?;
    let n = actual.len() as f32;
    Ok(actual
        .iter()
        .zip(expected)
        .map(|(a, e)| 2.0 * (a - e) / n)
        .collect())
}

/// Cross-entropy `-Σ actual_i · ln(clamp(predicted_i, 1e-9, 1))`.
pub fn cross_entropy(predicted: &[f32], actual: &[f32]) -> Result<f32> {
    check_lengths(predicted, actual)?;
    Ok(-predicted
        .iter()
        .zip(actual)
        .map(|(&p, &t)| t * p.clamp(LOG_CLAMP_MIN, 1.0).ln())
        .sum::<f32>())
}

/// Loss used to score a sample during training.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Loss {
    Mse,
    CrossEntropy,
}

impl Loss {
    /// Scalar loss of one sample.
    pub fn sample_loss(self, actual: &[f32], expected: &[f32]) -> Result<f32> {
        match self {
            Loss::Mse => Ok(mse(actual, expected)?.iter().sum()),
            Loss::CrossEntropy => cross_entropy(actual, expected),
        }
    }
}

impl fmt::Display for Loss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Loss::Mse => f.write_str("mse"),
            Loss::CrossEntropy => f.write_str("cross_entropy"),
        }
    }
}
