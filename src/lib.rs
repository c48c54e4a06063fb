//! Dense feedforward neural network library
//!
//! A fully-connected multilayer perceptron built from scratch: layer
//! construction, forward inference, backpropagation with gradient clipping and
//! a gradient-descent training loop, plus the CSV loading and export helpers
//! used to train it on MNIST-style image data.
//!
//! # Modules
//!
//! - `network`: Network construction, forward/backward passes and training
//! - `layers`: Layer trait and the dense layer implementation
//! - `optimizers`: Optimizer trait and SGD
//! - `utils`: Matrix/vector kernels, activations, losses and RNG
//! - `config`: Activation/loss pairing and JSON run configuration
//! - `data`: CSV image loading and one-hot encoding
//! - `export`: PGM image and prediction CSV writers
//! - `error`: Crate error type

#[cfg(feature = "blas")]
extern crate blas_src;

pub mod config;
pub mod data;
pub mod error;
pub mod export;
pub mod layers;
pub mod network;
pub mod optimizers;
pub mod utils;

pub use error::{NetworkError, Result};
pub use network::{Network, Sample, TrainingOptions, TrainingReport};
