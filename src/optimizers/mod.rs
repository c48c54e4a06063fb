//! Parameter update rules
//!
//! The network applies an optimizer only after every layer's gradients for a
//! step are known.
//!
//! # Example
//!
//! ```
//! use dense_mlp::optimizers::{Optimizer, SGD};
//!
//! let mut optimizer = SGD::new(0.1);
//! let mut weights = vec![1.0, 2.0];
//! optimizer.step(&mut weights, &[1.0, -1.0]).unwrap();
//! assert!((weights[0] - 0.9).abs() < 1e-6);
//! ```

use crate::error::Result;

pub mod sgd;

pub use sgd::SGD;

/// Update rule applied to a flat parameter buffer.
pub trait Optimizer {
    /// Updates `parameters` in place from same-length `gradients`.
    fn step(&mut self, parameters: &mut [f32], gradients: &[f32]) -> Result<()>;
}
