//! Configuration structures for building and training a network
//!
//! `NetworkConfig` makes the activation/loss pairing explicit and is validated
//! when a network is constructed. `TrainingConfig` is the JSON run
//! configuration consumed by the `mnist_csv` binary.

use crate::error::{NetworkError, Result};
use crate::network::TrainingOptions;
use crate::utils::{Activation, Loss};
use serde::Deserialize;
use std::fs;

/// Activation/loss pairing of a network.
///
/// The output delta is always the closed form `actual - expected`, which is the
/// gradient used for sigmoid+MSE and softmax+cross-entropy. The two mixed
/// pairings (softmax with MSE, sigmoid with cross-entropy) are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Activation of every layer but the last: "sigmoid" or "relu"
    pub hidden_activation: Activation,

    /// Activation of the last layer: "sigmoid" or "softmax"
    pub output_activation: Activation,

    /// Loss reported during training: "mse" or "cross_entropy"
    pub loss: Loss,
}

impl NetworkConfig {
    /// Sigmoid hidden layers, softmax output, cross-entropy loss.
    pub fn classification() -> Self {
        Self {
            hidden_activation: Activation::Sigmoid,
            output_activation: Activation::Softmax,
            loss: Loss::CrossEntropy,
        }
    }

    /// Sigmoid everywhere with mean squared error.
    pub fn regression() -> Self {
        Self {
            hidden_activation: Activation::Sigmoid,
            output_activation: Activation::Sigmoid,
            loss: Loss::Mse,
        }
    }

    /// Rejects pairings the backward pass cannot handle.
    pub fn validate(&self) -> Result<()> {
        if self.hidden_activation == Activation::Softmax {
            return Err(NetworkError::InvalidArgument(
                "softmax is only supported as the output activation".to_string(),
            ));
        }
        if self.output_activation == Activation::Relu {
            return Err(NetworkError::InvalidArgument(
                "output activation must be sigmoid or softmax".to_string(),
            ));
        }
        if self.output_activation == Activation::Softmax && self.loss == Loss::Mse {
            return Err(NetworkError::InvalidArgument(
                "softmax output cannot be paired with mse loss".to_string(),
            ));
        }
        if self.output_activation == Activation::Sigmoid && self.loss == Loss::CrossEntropy {
            return Err(NetworkError::InvalidArgument(
                "cross_entropy loss requires a softmax output".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self::classification()
    }
}

fn default_learning_rate() -> f32 {
    0.01
}

fn default_batch_size() -> usize {
    1
}

fn default_pixel_scale() -> f32 {
    255.0
}

fn default_image_side() -> usize {
    28
}

/// Run configuration for training on CSV image data.
///
/// # Example
///
/// ```json
/// {
///   "train_path": "data/train.csv",
///   "test_path": "data/test.csv",
///   "num_classes": 10,
///   "hidden_layers": [128, 64, 32],
///   "learning_rate": 0.1,
///   "epochs": 10,
///   "output_activation": "softmax",
///   "loss": "cross_entropy"
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct TrainingConfig {
    /// Labeled training CSV (label first, then pixels)
    pub train_path: String,

    /// Optional CSV to predict after training
    pub test_path: Option<String>,

    /// Whether `test_path` rows carry a leading label column
    #[serde(default)]
    pub test_labeled: bool,

    /// Number of output classes
    pub num_classes: usize,

    /// Hidden layer sizes, in order; the output layer is `num_classes` wide
    #[serde(default)]
    pub hidden_layers: Vec<usize>,

    #[serde(default = "default_learning_rate")]
    pub learning_rate: f32,

    pub epochs: usize,

    /// 1 trains online, one update per sample
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    #[serde(default)]
    pub shuffle: bool,

    /// Fixed initialization seed; OS entropy when absent
    pub seed: Option<u64>,

    /// Pixels are divided by this before training
    #[serde(default = "default_pixel_scale")]
    pub pixel_scale: f32,

    #[serde(flatten)]
    pub network: NetworkConfig,

    /// Where to write the `ImageId,Label` predictions CSV
    pub predictions_path: Option<String>,

    /// Where to write a PGM preview of the first test image
    pub preview_path: Option<String>,

    #[serde(default = "default_image_side")]
    pub image_width: usize,

    #[serde(default = "default_image_side")]
    pub image_height: usize,
}

impl TrainingConfig {
    pub fn training_options(&self) -> TrainingOptions {
        TrainingOptions {
            epochs: self.epochs,
            batch_size: self.batch_size,
            shuffle: self.shuffle,
        }
    }
}

/// Loads a training configuration from a JSON file.
///
/// Reads the file at `path`, deserializes its JSON contents into a
/// `TrainingConfig` and validates it.
///
/// # Examples
///
/// ```no_run
/// use dense_mlp::config::load_config;
///
/// let cfg = load_config("config/mnist_csv.json").unwrap();
/// assert_eq!(cfg.num_classes, 10);
/// ```
pub fn load_config(path: &str) -> Result<TrainingConfig> {
    let contents = fs::read_to_string(path).map_err(|e| NetworkError::file(path, e))?;
    let config: TrainingConfig = serde_json::from_str(&contents)?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &TrainingConfig) -> Result<()> {
    if config.num_classes == 0 {
        return Err(NetworkError::Config("num_classes must be positive".to_string()));
    }

    if let Some(&size) = config.hidden_layers.iter().find(|&&size| size == 0) {
        return Err(NetworkError::Config(format!(
            "hidden layer sizes must be positive, got {}",
            size
        )));
    }

    if !(config.learning_rate > 0.0 && config.learning_rate.is_finite()) {
        return Err(NetworkError::Config(
            "learning_rate must be positive".to_string(),
        ));
    }

    if config.epochs == 0 {
        return Err(NetworkError::Config("epochs must be positive".to_string()));
    }

    if config.batch_size == 0 {
        return Err(NetworkError::Config("batch_size must be positive".to_string()));
    }

    if config.pixel_scale <= 0.0 {
        return Err(NetworkError::Config(
            "pixel_scale must be positive".to_string(),
        ));
    }

    config
        .network
        .validate()
        .map_err(|e| NetworkError::Config(e.to_string()))
}
