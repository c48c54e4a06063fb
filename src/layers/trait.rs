//! Layer trait definition for neural network layers
//!
//! This module defines the core Layer trait that the network's parameter store
//! is built from. The trait covers the affine forward step and the parameter
//! update; activations are applied by the network, which knows whether a layer
//! is hidden or final.

use crate::error::Result;
use crate::optimizers::Optimizer;
use crate::utils::Matrix;

/// Core trait for neural network layers.
///
/// # Example
///
/// ```ignore
/// // Pre-activation output of a layer for one sample
/// let pre = layer.forward(&input)?;
///
/// // Gradient step once all layer gradients of the sample are known
/// layer.update_parameters(&grad_weights, &grad_biases, &mut optimizer)?;
/// ```
pub trait Layer {
    /// Forward propagation through the layer.
    ///
    /// Computes `W · input + b` for a single sample. Fails with `ShapeMismatch`
    /// if `input` does not have `input_size()` elements.
    fn forward(&self, input: &[f32]) -> Result<Vec<f32>>;

    /// Update layer parameters using the given gradients.
    ///
    /// `weight_gradients` must have the weight matrix's shape and
    /// `bias_gradients` the bias vector's length.
    fn update_parameters(
        &mut self,
        weight_gradients: &Matrix,
        bias_gradients: &[f32],
        optimizer: &mut dyn Optimizer,
    ) -> Result<()>;

    /// Get the input size of the layer.
    fn input_size(&self) -> usize;

    /// Get the output size of the layer.
    fn output_size(&self) -> usize;

    /// Get the number of trainable parameters in the layer.
    ///
    /// A dense layer has input_size × output_size weights plus output_size biases.
    fn parameter_count(&self) -> usize;
}
