//! Shared numeric utilities
//!
//! Matrix/vector kernels, activation and loss functions, and the seeded random
//! number generator used for weight initialization.

pub mod activations;
pub mod linalg;
pub mod loss;
pub mod rng;

pub use activations::{
    relu, relu_derivative, sigmoid, sigmoid_derivative, softmax, Activation,
};
pub use linalg::{matrix_vector_multiply, vector_add, Matrix};
pub use loss::{cross_entropy, mse, mse_derivative, Loss};
