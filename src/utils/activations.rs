//! Activation functions for neural networks
//!
//! This module provides the activations used by the dense layers:
//! - Sigmoid (hidden layers, or the output layer for regression-style use)
//! - ReLU (hidden layers)
//! - Softmax (output layer for multi-class classification)
//!
//! Derivatives are expressed in terms of the activation *output*, which is what
//! the forward cache stores.

use serde::Deserialize;
use std::fmt;

/// Sigmoid activation function.
///
/// Returns the sigmoid of the input: 1 / (1 + exp(-x))
pub fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Sigmoid derivative assuming y = sigmoid(z).
///
/// Returns the derivative: y * (1 - y). Pass the activation value, not the logit.
pub fn sigmoid_derivative(y: f32) -> f32 {
    y * (1.0 - y)
}

/// ReLU activation function: max(0, x).
pub fn relu(x: f32) -> f32 {
    x.max(0.0)
}

/// ReLU derivative: 1 for positive inputs, 0 otherwise.
///
/// ReLU outputs are positive exactly where their inputs are, so this can be
/// evaluated on either side of the activation.
pub fn relu_derivative(x: f32) -> f32 {
    if x > 0.0 {
        1.0
    } else {
        0.0
    }
}

/// Sigmoid applied elementwise.
pub fn sigmoid_vector(values: &[f32]) -> Vec<f32> {
    values.iter().map(|&x| sigmoid(x)).collect()
}

/// ReLU applied elementwise.
pub fn relu_vector(values: &[f32]) -> Vec<f32> {
    values.iter().map(|&x| relu(x)).collect()
}

/// Softmax over the whole vector.
///
/// Uses the max-subtraction trick for numerical stability to avoid overflow
/// with large values. An empty input yields an empty output.
pub fn softmax(values: &[f32]) -> Vec<f32> {
    let max_value = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);

    let exps: Vec<f32> = values.iter().map(|&v| (v - max_value).exp()).collect();
    let inv_sum = 1.0f32 / exps.iter().sum::<f32>();
    exps.into_iter().map(|e| e * inv_sum).collect()
}

/// Activation applied after a layer's affine transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    Sigmoid,
    Relu,
    Softmax,
}

impl Activation {
    /// Applies the activation to a layer's pre-activation vector.
    pub fn apply(self, values: &[f32]) -> Vec<f32> {
        match self {
            Activation::Sigmoid => sigmoid_vector(values),
            Activation::Relu => relu_vector(values),
            Activation::Softmax => softmax(values),
        }
    }

    /// Derivative evaluated on an already-activated value.
    ///
    /// Softmax has no elementwise derivative; the output layer uses the
    /// closed-form `actual - expected` delta instead, so softmax only ever
    /// appears there and this returns 1.
    pub fn derivative_from_output(self, y: f32) -> f32 {
        match self {
            Activation::Sigmoid => sigmoid_derivative(y),
            Activation::Relu => relu_derivative(y),
            Activation::Softmax => 1.0,
        }
    }
}

impl fmt::Display for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Activation::Sigmoid => "sigmoid",
            Activation::Relu => "relu",
            Activation::Softmax => "softmax",
        };
        f.write_str(name)
    }
}
