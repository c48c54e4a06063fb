//! Backward engine: deltas, gradients and the gradient-descent update

use super::{ForwardCache, Network};
use crate::error::{NetworkError, Result};
use crate::layers::{DenseLayer, Layer};
use crate::optimizers::SGD;
use crate::utils::linalg::{outer_product, transpose_matrix_vector_multiply, Matrix};

/// Bound applied to every delta before it forms gradients.
pub const DELTA_CLIP: f32 = 5.0;

/// Weight and bias gradients for every layer, shaped like the parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Gradients {
    weights: Vec<Matrix>,
    biases: Vec<Vec<f32>>,
}

impl Gradients {
    /// All-zero gradients shaped like `layers`' parameters.
    pub(crate) fn zeros_for(layers: &[DenseLayer]) -> Self {
        Self {
            weights: layers
                .iter()
                .map(|layer| Matrix::zeros(layer.weights().rows(), layer.weights().cols()))
                .collect(),
            biases: layers.iter().map(|layer| vec![0.0; layer.biases().len()]).collect(),
        }
    }

    /// Weight gradients, first layer first.
    pub fn weights(&self) -> &[Matrix] {
        &self.weights
    }

    /// Bias gradients, first layer first.
    pub fn biases(&self) -> &[Vec<f32>] {
        &self.biases
    }

    /// Adds `other` elementwise; both must come from the same network.
    pub fn accumulate(&mut self, other: &Gradients) -> Result<()> {
        if self.weights.len() != other.weights.len() {
            return Err(NetworkError::ShapeMismatch(format!(
                "cannot accumulate gradients of {} layers into {}",
                other.weights.len(),
                self.weights.len()
            )));
        }

        for (sum, grad) in self.weights.iter_mut().zip(&other.weights) {
            if sum.rows() != grad.rows() || sum.cols() != grad.cols() {
                return Err(NetworkError::ShapeMismatch(format!(
                    "cannot accumulate {}x{} gradients into {}x{}",
                    grad.rows(),
                    grad.cols(),
                    sum.rows(),
                    sum.cols()
                )));
            }
            for (s, g) in sum.as_mut_slice().iter_mut().zip(grad.as_slice()) {
                *s += g;
            }
        }
        for (sum, grad) in self.biases.iter_mut().zip(&other.biases) {
            for (s, g) in sum.iter_mut().zip(grad) {
                *s += g;
            }
        }
        Ok(())
    }

    /// Multiplies every gradient by `factor`.
    pub fn scale(&mut self, factor: f32) {
        for matrix in &mut self.weights {
            matrix.as_mut_slice().iter_mut().for_each(|g| *g *= factor);
        }
        for bias in &mut self.biases {
            bias.iter_mut().for_each(|g| *g *= factor);
        }
    }
}

fn clip_deltas(deltas: &mut [f32]) {
    for delta in deltas.iter_mut() {
        *delta = delta.clamp(-DELTA_CLIP, DELTA_CLIP);
    }
}

impl Network {
    /// Gradients of one sample from its forward cache and target.
    ///
    /// Reads the weights without modifying them, so every layer's error is
    /// propagated through the pre-update parameters.
    pub fn compute_gradients(&self, cache: &ForwardCache, expected: &[f32]) -> Result<Gradients> {
        self.gradients_from(cache, cache.output(), expected)
    }

    fn gradients_from(
        &self,
        cache: &ForwardCache,
        actual: &[f32],
        expected: &[f32],
    ) -> Result<Gradients> {
        self.ensure_layers()?;
        if actual.len() != expected.len() {
            return Err(NetworkError::InvalidArgument(format!(
                "actual size {} does not match expected size {}",
                actual.len(),
                expected.len()
            )));
        }
        if actual.len() != self.last_layer_size {
            return Err(NetworkError::InvalidArgument(format!(
                "network has {} outputs, got a target of {}",
                self.last_layer_size,
                actual.len()
            )));
        }
        if cache.outputs().len() != self.layers.len() {
            return Err(NetworkError::InvalidState(format!(
                "forward cache holds {} layers, network has {}",
                cache.outputs().len(),
                self.layers.len()
            )));
        }

        let layer_count = self.layers.len();
        let mut weight_gradients = Vec::with_capacity(layer_count);
        let mut bias_gradients = Vec::with_capacity(layer_count);

        // Output layer: closed-form delta for sigmoid+MSE and softmax+cross-entropy.
        let mut delta: Vec<f32> = actual.iter().zip(expected).map(|(a, e)| a - e).collect();

        for index in (0..layer_count).rev() {
            if index + 1 < layer_count {
                let downstream = self.layers[index + 1].weights();
                let error = transpose_matrix_vector_multiply(downstream, &delta)?;
                let activation = self.activation_for(index);
                delta = error
                    .iter()
                    .zip(&cache.outputs()[index])
                    .map(|(e, &y)| e * activation.derivative_from_output(y))
                    .collect();
            }
            clip_deltas(&mut delta);

            weight_gradients.push(outer_product(&delta, cache.layer_input(index)));
            bias_gradients.push(delta.clone());
        }

        weight_gradients.reverse();
        bias_gradients.reverse();
        Ok(Gradients {
            weights: weight_gradients,
            biases: bias_gradients,
        })
    }

    /// Applies `W -= learning_rate · grad_W` and `b -= learning_rate · grad_b` to every layer.
    pub fn apply_gradients(&mut self, gradients: &Gradients, learning_rate: f32) -> Result<()> {
        if gradients.weights.len() != self.layers.len() {
            return Err(NetworkError::ShapeMismatch(format!(
                "gradients cover {} layers, network has {}",
                gradients.weights.len(),
                self.layers.len()
            )));
        }

        let mut optimizer = SGD::new(learning_rate);
        for ((layer, weights), biases) in self
            .layers
            .iter_mut()
            .zip(&gradients.weights)
            .zip(&gradients.biases)
        {
            layer.update_parameters(weights, biases, &mut optimizer)?;
        }
        Ok(())
    }

    /// Back-propagates the error of the last forward pass and updates every layer.
    ///
    /// `actual_output` is the output of the most recent `forward` call and
    /// `expected_output` its target. All gradients are computed before any
    /// weight changes.
    pub fn backpropagate(
        &mut self,
        actual_output: &[f32],
        expected_output: &[f32],
        learning_rate: f32,
    ) -> Result<()> {
        if actual_output.len() != expected_output.len() {
            return Err(NetworkError::InvalidArgument(format!(
                "actual size {} does not match expected size {}",
                actual_output.len(),
                expected_output.len()
            )));
        }
        self.ensure_layers()?;
        let cache = self.cache.as_ref().ok_or_else(|| {
            NetworkError::InvalidState("backpropagate called before forward".to_string())
        })?;

        let gradients = self.gradients_from(cache, actual_output, expected_output)?;
        self.apply_gradients(&gradients, learning_rate)
    }
}
