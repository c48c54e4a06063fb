//! Plain gradient descent

use crate::error::{NetworkError, Result};
use crate::optimizers::Optimizer;

/// Gradient descent with a fixed step size: `w -= learning_rate * g`.
///
/// # Examples
///
/// ```
/// use dense_mlp::optimizers::{Optimizer, SGD};
///
/// let mut optimizer = SGD::new(0.01);
/// let mut bias = vec![0.5];
/// optimizer.step(&mut bias, &[10.0]).unwrap();
/// assert!((bias[0] - 0.4).abs() < 1e-6);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SGD {
    learning_rate: f32,
}

impl SGD {
    pub fn new(learning_rate: f32) -> Self {
        Self { learning_rate }
    }
}

impl Optimizer for SGD {
    fn step(&mut self, parameters: &mut [f32], gradients: &[f32]) -> Result<()> {
        if parameters.len() != gradients.len() {
            return Err(NetworkError::ShapeMismatch(format!(
                "{} parameters but {} gradients",
                parameters.len(),
                gradients.len()
            )));
        }

        let rate = self.learning_rate;
        parameters
            .iter_mut()
            .zip(gradients)
            .for_each(|(w, g)| *w -= rate * g);
        Ok(())
    }
}
