//! Forward engine and the per-prediction activation cache

use super::Network;
use crate::error::{NetworkError, Result};
use crate::layers::Layer;

/// Input and post-activation output of every layer for one forward pass.
///
/// Recomputed (never merged) on each pass; the backward pass reads each
/// layer's input and output from it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForwardCache {
    input: Vec<f32>,
    outputs: Vec<Vec<f32>>,
}

impl ForwardCache {
    pub fn input(&self) -> &[f32] {
        &self.input
    }

    /// Post-activation outputs, one per layer.
    pub fn outputs(&self) -> &[Vec<f32>] {
        &self.outputs
    }

    /// Final layer activation (the input when there are no layers).
    pub fn output(&self) -> &[f32] {
        self.outputs.last().unwrap_or(&self.input)
    }

    /// Vector fed into layer `index`: the original input for the first layer,
    /// the previous layer's output otherwise.
    pub fn layer_input(&self, index: usize) -> &[f32] {
        if index == 0 {
            &self.input
        } else {
            &self.outputs[index - 1]
        }
    }
}

/// Index of the largest element; the first one wins ties.
pub fn argmax(values: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (index, &value) in values.iter().enumerate() {
        match best {
            Some((_, best_value)) if value <= best_value => {}
            _ => best = Some((index, value)),
        }
    }
    best.map(|(index, _)| index)
}

impl Network {
    /// Runs a forward pass without touching the network's cache or lifecycle.
    ///
    /// Each layer computes `W · prev + b` followed by the hidden activation, or
    /// the output activation for the last layer.
    pub fn forward_pass(&self, input: &[f32]) -> Result<ForwardCache> {
        self.ensure_layers()?;
        if input.len() != self.input_size {
            return Err(NetworkError::ShapeMismatch(format!(
                "network expects {} inputs, got {}",
                self.input_size,
                input.len()
            )));
        }

        let mut outputs: Vec<Vec<f32>> = Vec::with_capacity(self.layers.len());
        for (index, layer) in self.layers.iter().enumerate() {
            let prev: &[f32] = if index == 0 { input } else { &outputs[index - 1] };
            let pre_activation = layer.forward(prev)?;
            outputs.push(self.activation_for(index).apply(&pre_activation));
        }

        Ok(ForwardCache {
            input: input.to_vec(),
            outputs,
        })
    }

    /// Computes the network output for `input` and caches every layer's activation.
    ///
    /// The first successful call freezes the topology; a rejected input leaves
    /// the network buildable.
    pub fn forward(&mut self, input: &[f32]) -> Result<Vec<f32>> {
        let cache = self.forward_pass(input)?;
        self.mark_built();

        let output = cache.output().to_vec();
        self.cache = Some(cache);
        Ok(output)
    }

    /// Same as [`Network::forward`].
    pub fn predict(&mut self, input: &[f32]) -> Result<Vec<f32>> {
        self.forward(input)
    }

    /// Predicted class: index of the largest output.
    pub fn classify(&mut self, input: &[f32]) -> Result<usize> {
        let output = self.forward(input)?;
        argmax(&output).ok_or_else(|| NetworkError::InvalidState("empty output".to_string()))
    }

    /// Cache of the most recent `forward` call.
    pub fn last_forward(&self) -> Option<&ForwardCache> {
        self.cache.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NetworkConfig;
    use crate::utils::linalg::Matrix;

    #[test]
    fn test_argmax() {
        assert_eq!(argmax(&[0.1, 0.7, 0.2]), Some(1));
        assert_eq!(argmax(&[0.5, 0.5]), Some(0));
        assert_eq!(argmax(&[]), None);
    }

    #[test]
    fn test_forward_pass_is_side_effect_free() {
        let mut network = Network::with_options(2, NetworkConfig::regression(), Some(3)).unwrap();
        network.add_layer(2).unwrap();

        let cache = network.forward_pass(&[1.0, 0.0]).unwrap();
        assert_eq!(cache.outputs().len(), 1);
        assert!(network.last_forward().is_none());
        assert!(!network.is_built());
    }

    #[test]
    fn test_cache_overwritten() {
        let mut network = Network::with_options(2, NetworkConfig::regression(), Some(3)).unwrap();
        network.add_layer(1).unwrap();
        network
            .set_layer_parameters(0, Matrix::from_rows(vec![vec![1.0, 1.0]]).unwrap(), vec![0.0])
            .unwrap();

        network.forward(&[1.0, 1.0]).unwrap();
        network.forward(&[0.0, 0.0]).unwrap();

        let cache = network.last_forward().unwrap();
        assert_eq!(cache.input(), &[0.0, 0.0]);
        assert!((cache.output()[0] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_layer_input_indexing() {
        let cache = ForwardCache {
            input: vec![1.0],
            outputs: vec![vec![2.0], vec![3.0]],
        };
        assert_eq!(cache.layer_input(0), &[1.0]);
        assert_eq!(cache.layer_input(1), &[2.0]);
        assert_eq!(cache.output(), &[3.0]);
    }
}
