//! Dense (fully connected) layer implementation
//!
//! This module provides a DenseLayer that performs the transformation:
//! output = weights · input + biases

use crate::error::{NetworkError, Result};
use crate::layers::Layer;
use crate::optimizers::Optimizer;
use crate::utils::linalg::{matrix_vector_multiply, vector_add, Matrix};
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};

/// Dense (fully connected) layer with weights and biases.
///
/// Performs the affine transformation: y = Wx + b
/// where x is the input (input_size),
/// W is the weight matrix (output_size × input_size),
/// and b is the bias vector (output_size).
///
/// # Example
///
/// ```
/// use dense_mlp::layers::{DenseLayer, Layer};
/// use dense_mlp::utils::rng::seeded_rng;
///
/// let mut rng = seeded_rng(Some(42));
/// let layer = DenseLayer::new(784, 128, &mut rng).unwrap();
/// assert_eq!(layer.input_size(), 784);
/// assert_eq!(layer.output_size(), 128);
/// ```
#[derive(Debug, Clone)]
pub struct DenseLayer {
    weights: Matrix,
    biases: Vec<f32>,
}

impl DenseLayer {
    /// Create a new DenseLayer with normal initialization.
    ///
    /// Each weight is drawn independently from N(0, sqrt(1 / input_size)), so the
    /// variance of a neuron's weighted sum does not grow with fan-in.
    /// Biases are initialized to zero.
    pub fn new(input_size: usize, output_size: usize, rng: &mut StdRng) -> Result<Self> {
        if input_size == 0 || output_size == 0 {
            return Err(NetworkError::InvalidArgument(format!(
                "layer dimensions must be positive, got {}x{}",
                output_size, input_size
            )));
        }

        let std_dev = (1.0f32 / input_size as f32).sqrt();
        let normal = Normal::new(0.0, std_dev)
            .map_err(|e| NetworkError::InvalidArgument(e.to_string()))?;

        let mut weights = Matrix::zeros(output_size, input_size);
        weights
            .as_mut_slice()
            .iter_mut()
            .for_each(|w| *w = normal.sample(rng));

        Ok(Self {
            weights,
            biases: vec![0.0; output_size],
        })
    }

    /// Create a layer from explicit parameters.
    ///
    /// `biases` must have one entry per weight row.
    pub fn from_parameters(weights: Matrix, biases: Vec<f32>) -> Result<Self> {
        if weights.is_empty() {
            return Err(NetworkError::InvalidArgument(
                "weight matrix must not be empty".to_string(),
            ));
        }
        if weights.rows() != biases.len() {
            return Err(NetworkError::ShapeMismatch(format!(
                "{} weight rows but {} biases",
                weights.rows(),
                biases.len()
            )));
        }
        Ok(Self { weights, biases })
    }

    pub fn weights(&self) -> &Matrix {
        &self.weights
    }

    pub fn biases(&self) -> &[f32] {
        &self.biases
    }
}

impl Layer for DenseLayer {
    fn forward(&self, input: &[f32]) -> Result<Vec<f32>> {
        let weighted = matrix_vector_multiply(&self.weights, input)?;
        vector_add(&weighted, &self.biases)
    }

    fn update_parameters(
        &mut self,
        weight_gradients: &Matrix,
        bias_gradients: &[f32],
        optimizer: &mut dyn Optimizer,
    ) -> Result<()> {
        if weight_gradients.rows() != self.weights.rows()
            || weight_gradients.cols() != self.weights.cols()
            || bias_gradients.len() != self.biases.len()
        {
            return Err(NetworkError::ShapeMismatch(format!(
                "gradients {}x{} / {} do not match layer {}x{} / {}",
                weight_gradients.rows(),
                weight_gradients.cols(),
                bias_gradients.len(),
                self.weights.rows(),
                self.weights.cols(),
                self.biases.len()
            )));
        }

        optimizer.step(self.weights.as_mut_slice(), weight_gradients.as_slice())?;
        optimizer.step(&mut self.biases, bias_gradients)
    }

    fn input_size(&self) -> usize {
        self.weights.cols()
    }

    fn output_size(&self) -> usize {
        self.weights.rows()
    }

    fn parameter_count(&self) -> usize {
        self.weights.as_slice().len() + self.biases.len()
    }
}
