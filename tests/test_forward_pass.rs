// Tests for forward propagation: output values, cache contents and lifecycle.

use approx::assert_relative_eq;
use dense_mlp::config::NetworkConfig;
use dense_mlp::network::Network;
use dense_mlp::utils::activations::{sigmoid, Activation};
use dense_mlp::utils::linalg::Matrix;
use dense_mlp::NetworkError;

fn fixed_single_layer() -> Network {
    let mut network = Network::with_options(2, NetworkConfig::regression(), Some(1)).unwrap();
    network.add_layer(1).unwrap();
    network
        .set_layer_parameters(0, Matrix::from_rows(vec![vec![0.5, 0.5]]).unwrap(), vec![0.0])
        .unwrap();
    network
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_layer_known_output() {
        let mut network = fixed_single_layer();
        let output = network.forward(&[2.0, 2.0]).unwrap();

        assert_eq!(output.len(), 1);
        assert_relative_eq!(output[0], sigmoid(2.0), epsilon = 1e-6);
        assert_relative_eq!(output[0], 0.8808, epsilon = 1e-4);
    }

    #[test]
    fn test_two_layer_hand_computed() {
        let mut network = Network::with_options(2, NetworkConfig::regression(), Some(1)).unwrap();
        network.add_layer(2).unwrap();
        network.add_layer(1).unwrap();
        network
            .set_layer_parameters(
                0,
                Matrix::from_rows(vec![vec![1.0, -1.0], vec![0.5, 0.25]]).unwrap(),
                vec![0.0, 0.5],
            )
            .unwrap();
        network
            .set_layer_parameters(1, Matrix::from_rows(vec![vec![2.0, -1.0]]).unwrap(), vec![0.1])
            .unwrap();

        let output = network.forward(&[1.0, 2.0]).unwrap();

        let h0 = sigmoid(1.0 - 2.0);
        let h1 = sigmoid(0.5 + 0.5 + 0.5);
        let expected = sigmoid(2.0 * h0 - h1 + 0.1);
        assert_relative_eq!(output[0], expected, epsilon = 1e-6);

        let cache = network.last_forward().unwrap();
        assert_eq!(cache.input(), &[1.0, 2.0]);
        assert_eq!(cache.outputs().len(), 2);
        assert_relative_eq!(cache.outputs()[0][0], h0, epsilon = 1e-6);
        assert_relative_eq!(cache.outputs()[0][1], h1, epsilon = 1e-6);
    }

    #[test]
    fn test_softmax_output_is_distribution() {
        let mut network =
            Network::with_options(6, NetworkConfig::classification(), Some(99)).unwrap();
        network.add_layer(5).unwrap();
        network.add_layer(4).unwrap();

        let probs = network.forward(&[0.1, 0.9, 0.3, 0.0, 1.0, 0.5]).unwrap();
        let sum: f32 = probs.iter().sum();
        assert_eq!(probs.len(), 4);
        assert_relative_eq!(sum, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_relu_hidden_layer() {
        let config = NetworkConfig {
            hidden_activation: Activation::Relu,
            ..NetworkConfig::regression()
        };
        let mut network = Network::with_options(1, config, Some(1)).unwrap();
        network.add_layer(2).unwrap();
        network.add_layer(1).unwrap();
        network
            .set_layer_parameters(0, Matrix::from_rows(vec![vec![1.0], vec![-1.0]]).unwrap(), vec![0.0, 0.0])
            .unwrap();

        network.forward(&[3.0]).unwrap();
        let hidden = &network.last_forward().unwrap().outputs()[0];
        assert_eq!(hidden, &vec![3.0, 0.0]);
    }

    #[test]
    fn test_input_length_checked() {
        let mut network = fixed_single_layer();
        assert!(matches!(
            network.forward(&[1.0, 2.0, 3.0]),
            Err(NetworkError::ShapeMismatch(_))
        ));
    }

    #[test]
    fn test_empty_network_is_invalid_state() {
        let mut network = Network::new(3).unwrap();
        assert!(matches!(
            network.forward(&[1.0, 2.0, 3.0]),
            Err(NetworkError::InvalidState(_))
        ));
        // Still buildable after the failed call.
        network.add_layer(2).unwrap();
    }

    #[test]
    fn test_rejected_input_keeps_network_buildable() {
        let mut network = fixed_single_layer();
        assert!(network.forward(&[1.0]).is_err());

        assert!(!network.is_built());
        assert!(network.last_forward().is_none());
        network.add_layer(2).unwrap();
        assert_eq!(network.forward(&[1.0, 1.0]).unwrap().len(), 2);
    }

    #[test]
    fn test_add_layer_after_forward_is_invalid_state() {
        let mut network = fixed_single_layer();
        network.forward(&[0.0, 1.0]).unwrap();

        assert!(network.is_built());
        assert!(matches!(
            network.add_layer(3),
            Err(NetworkError::InvalidState(_))
        ));
        assert!(matches!(
            network.set_layer_parameters(0, Matrix::zeros(1, 2), vec![0.0]),
            Err(NetworkError::InvalidState(_))
        ));
        assert_eq!(network.layer_count(), 1);
    }

    #[test]
    fn test_forward_does_not_mutate_weights() {
        let mut network = fixed_single_layer();
        let before = network.layers()[0].weights().clone();
        network.forward(&[5.0, -5.0]).unwrap();
        assert_eq!(network.layers()[0].weights(), &before);
    }

    #[test]
    fn test_classify_returns_argmax() {
        let mut network = Network::with_options(2, NetworkConfig::classification(), Some(3)).unwrap();
        network.add_layer(3).unwrap();
        network
            .set_layer_parameters(
                0,
                Matrix::from_rows(vec![vec![0.0, 0.0], vec![1.0, 1.0], vec![-1.0, 0.0]]).unwrap(),
                vec![0.0, 0.0, 0.0],
            )
            .unwrap();
        assert_eq!(network.classify(&[1.0, 1.0]).unwrap(), 1);
    }

    #[test]
    fn test_same_seed_same_predictions() {
        let build = || {
            let mut network = Network::with_options(4, NetworkConfig::classification(), Some(2024)).unwrap();
            network.add_layer(6).unwrap();
            network.add_layer(3).unwrap();
            network
        };
        let mut a = build();
        let mut b = build();
        let input = [0.2, 0.4, 0.6, 0.8];
        assert_eq!(a.forward(&input).unwrap(), b.forward(&input).unwrap());
    }
}
