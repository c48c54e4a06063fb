//! Feedforward network: parameter store, lifecycle and structure report
//!
//! A network is built by declaring an input size, appending dense layers by
//! output size and optionally setting a learning rate. The first forward or
//! training call freezes the topology; from then on the weights only change
//! through the gradient-descent update path.
//!
//! The numeric pipeline is split by direction:
//! - `forward`: layer-by-layer activations and the forward cache
//! - `backward`: per-layer deltas, gradients and the parameter update
//! - `training`: epoch loop, loss aggregation and minibatch accumulation

mod backward;
mod forward;
mod training;

pub use backward::{Gradients, DELTA_CLIP};
pub use forward::{argmax, ForwardCache};
pub use training::{Sample, TrainingOptions, TrainingReport};

use crate::config::NetworkConfig;
use crate::error::{NetworkError, Result};
use crate::layers::{DenseLayer, Layer};
use crate::utils::linalg::Matrix;
use crate::utils::rng::seeded_rng;
use crate::utils::Activation;
use log::debug;
use rand::rngs::StdRng;
use std::fmt;

/// Learning rate used until `set_learning_rate` is called.
pub const DEFAULT_LEARNING_RATE: f32 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    /// Layers may still be appended or overwritten.
    Building,
    /// Topology is frozen.
    Built,
}

/// Fully-connected feedforward network.
///
/// # Example
///
/// ```
/// use dense_mlp::config::NetworkConfig;
/// use dense_mlp::network::Network;
///
/// let mut network = Network::with_options(4, NetworkConfig::classification(), Some(7)).unwrap();
/// network.add_layer(8).unwrap();
/// network.add_layer(3).unwrap();
///
/// let probabilities = network.forward(&[0.1, 0.2, 0.3, 0.4]).unwrap();
/// assert_eq!(probabilities.len(), 3);
/// assert!(network.add_layer(2).is_err());
/// ```
pub struct Network {
    input_size: usize,
    last_layer_size: usize,
    layers: Vec<DenseLayer>,
    learning_rate: f32,
    config: NetworkConfig,
    rng: StdRng,
    cache: Option<ForwardCache>,
    lifecycle: Lifecycle,
}

impl Network {
    /// Classification network (sigmoid hidden, softmax output) seeded from OS entropy.
    pub fn new(input_size: usize) -> Result<Self> {
        Self::with_options(input_size, NetworkConfig::default(), None)
    }

    /// Network with an explicit activation/loss pairing and optional fixed seed.
    ///
    /// Fails with `InvalidArgument` if `input_size` is zero or the pairing is
    /// rejected by [`NetworkConfig::validate`].
    pub fn with_options(input_size: usize, config: NetworkConfig, seed: Option<u64>) -> Result<Self> {
        if input_size == 0 {
            return Err(NetworkError::InvalidArgument(
                "input size must be positive".to_string(),
            ));
        }
        config.validate()?;

        Ok(Self {
            input_size,
            last_layer_size: input_size,
            layers: Vec::new(),
            learning_rate: DEFAULT_LEARNING_RATE,
            config,
            rng: seeded_rng(seed),
            cache: None,
            lifecycle: Lifecycle::Building,
        })
    }

    /// Appends a layer of `size` neurons fed by the previous layer's output.
    pub fn add_layer(&mut self, size: usize) -> Result<()> {
        self.ensure_building("add a layer")?;
        if size == 0 {
            return Err(NetworkError::InvalidArgument(
                "layer size must be bigger than 0".to_string(),
            ));
        }

        let layer = DenseLayer::new(self.last_layer_size, size, &mut self.rng)?;
        debug!(
            "added layer #{}: {}x{}",
            self.layers.len() + 1,
            size,
            self.last_layer_size
        );
        self.layers.push(layer);
        self.last_layer_size = size;
        Ok(())
    }

    /// Replaces the parameters of layer `index` while the network is still being built.
    ///
    /// The new weights must keep the layer's shape.
    pub fn set_layer_parameters(
        &mut self,
        index: usize,
        weights: Matrix,
        biases: Vec<f32>,
    ) -> Result<()> {
        self.ensure_building("overwrite layer parameters")?;
        let layer_count = self.layers.len();
        let current = self.layers.get_mut(index).ok_or_else(|| {
            NetworkError::InvalidArgument(format!(
                "layer index {} out of range for {} layers",
                index, layer_count
            ))
        })?;

        if weights.rows() != current.output_size() || weights.cols() != current.input_size() {
            return Err(NetworkError::ShapeMismatch(format!(
                "layer {} expects {}x{} weights, got {}x{}",
                index,
                current.output_size(),
                current.input_size(),
                weights.rows(),
                weights.cols()
            )));
        }

        *current = DenseLayer::from_parameters(weights, biases)?;
        Ok(())
    }

    /// Sets the step size used by `train`.
    ///
    /// Non-positive and non-finite rates are rejected rather than replaced.
    pub fn set_learning_rate(&mut self, learning_rate: f32) -> Result<()> {
        if !(learning_rate > 0.0 && learning_rate.is_finite()) {
            return Err(NetworkError::InvalidArgument(format!(
                "learning rate must be positive, got {}",
                learning_rate
            )));
        }
        self.learning_rate = learning_rate;
        Ok(())
    }

    pub fn learning_rate(&self) -> f32 {
        self.learning_rate
    }

    pub fn input_size(&self) -> usize {
        self.input_size
    }

    /// Width of the last appended layer (the input size while no layer exists).
    pub fn output_size(&self) -> usize {
        self.last_layer_size
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    pub fn layers(&self) -> &[DenseLayer] {
        &self.layers
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn parameter_count(&self) -> usize {
        self.layers.iter().map(Layer::parameter_count).sum()
    }

    /// Whether the topology has been frozen by a forward or training call.
    pub fn is_built(&self) -> bool {
        self.lifecycle == Lifecycle::Built
    }

    /// Activation applied after layer `index`.
    pub fn activation_for(&self, index: usize) -> Activation {
        if index + 1 == self.layers.len() {
            self.config.output_activation
        } else {
            self.config.hidden_activation
        }
    }

    fn ensure_building(&self, action: &str) -> Result<()> {
        match self.lifecycle {
            Lifecycle::Building => Ok(()),
            Lifecycle::Built => Err(NetworkError::InvalidState(format!(
                "cannot {} after the network has been used",
                action
            ))),
        }
    }

    fn ensure_layers(&self) -> Result<()> {
        if self.layers.is_empty() {
            return Err(NetworkError::InvalidState("empty network".to_string()));
        }
        Ok(())
    }

    fn mark_built(&mut self) {
        if self.lifecycle == Lifecycle::Building {
            debug!("network built:\n{}", self);
            self.lifecycle = Lifecycle::Built;
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.layers.is_empty() {
            return write!(f, "Empty network (input {})", self.input_size);
        }

        writeln!(f, "Input: {}", self.input_size)?;
        for (index, layer) in self.layers.iter().enumerate() {
            writeln!(
                f,
                "Layer #{}: {} -> {} ({}, {} parameters)",
                index + 1,
                layer.input_size(),
                layer.output_size(),
                self.activation_for(index),
                layer.parameter_count()
            )?;
        }
        write!(
            f,
            "Loss: {}, learning rate: {}, parameters: {}",
            self.config.loss,
            self.learning_rate,
            self.parameter_count()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn regression_network(input: usize) -> Network {
        Network::with_options(input, NetworkConfig::regression(), Some(42)).unwrap()
    }

    #[test]
    fn test_zero_input_rejected() {
        assert!(matches!(
            Network::new(0),
            Err(NetworkError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_add_layer_chains_sizes() {
        let mut network = regression_network(5);
        network.add_layer(4).unwrap();
        network.add_layer(2).unwrap();

        assert_eq!(network.layers()[0].input_size(), 5);
        assert_eq!(network.layers()[1].input_size(), 4);
        assert_eq!(network.output_size(), 2);
        assert_eq!(network.parameter_count(), 5 * 4 + 4 + 4 * 2 + 2);
    }

    #[test]
    fn test_add_zero_layer_rejected() {
        let mut network = regression_network(3);
        assert!(matches!(
            network.add_layer(0),
            Err(NetworkError::InvalidArgument(_))
        ));
        assert_eq!(network.layer_count(), 0);
    }

    #[test]
    fn test_learning_rate_validation() {
        let mut network = regression_network(3);
        assert_eq!(network.learning_rate(), DEFAULT_LEARNING_RATE);
        assert!(network.set_learning_rate(0.0).is_err());
        assert!(network.set_learning_rate(-1.0).is_err());
        assert!(network.set_learning_rate(f32::NAN).is_err());
        network.set_learning_rate(0.5).unwrap();
        assert_eq!(network.learning_rate(), 0.5);
    }

    #[test]
    fn test_set_layer_parameters_shape_checked() {
        let mut network = regression_network(2);
        network.add_layer(1).unwrap();

        let wrong = Matrix::from_rows(vec![vec![1.0, 2.0, 3.0]]).unwrap();
        assert!(network.set_layer_parameters(0, wrong, vec![0.0]).is_err());
        assert!(network
            .set_layer_parameters(3, Matrix::zeros(1, 2), vec![0.0])
            .is_err());

        let right = Matrix::from_rows(vec![vec![0.5, 0.5]]).unwrap();
        network.set_layer_parameters(0, right, vec![0.25]).unwrap();
        assert_eq!(network.layers()[0].biases(), &[0.25]);
    }

    #[test]
    fn test_activation_for_positions() {
        let mut network = Network::with_options(3, NetworkConfig::classification(), Some(1)).unwrap();
        network.add_layer(4).unwrap();
        network.add_layer(2).unwrap();
        assert_eq!(network.activation_for(0), Activation::Sigmoid);
        assert_eq!(network.activation_for(1), Activation::Softmax);
    }

    #[test]
    fn test_display_lists_layers() {
        let mut network = regression_network(3);
        assert!(network.to_string().starts_with("Empty network"));
        network.add_layer(2).unwrap();
        let text = network.to_string();
        assert!(text.contains("Layer #1: 3 -> 2 (sigmoid, 8 parameters)"), "{}", text);
    }
}
