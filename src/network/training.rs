//! Training loop: online SGD and minibatch gradient accumulation

use super::forward::argmax;
use super::{Gradients, Network};
use crate::error::{NetworkError, Result};
use crate::utils::rng::shuffle_indices;
use log::info;
use rayon::prelude::*;
use std::time::Instant;

/// One training example: input vector and target (one-hot for classification).
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub input: Vec<f32>,
    pub target: Vec<f32>,
}

impl Sample {
    pub fn new(input: Vec<f32>, target: Vec<f32>) -> Self {
        Self { input, target }
    }
}

/// How `train_with` iterates over the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrainingOptions {
    pub epochs: usize,
    /// 1 updates after every sample; larger values average a minibatch first
    pub batch_size: usize,
    /// Reshuffle sample order every epoch with the network's RNG
    pub shuffle: bool,
}

impl TrainingOptions {
    /// One update per sample, samples visited in order.
    pub fn online(epochs: usize) -> Self {
        Self {
            epochs,
            batch_size: 1,
            shuffle: false,
        }
    }
}

/// Loss summary of a training run.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingReport {
    /// Sum of per-sample losses of each epoch, measured before each sample's update
    pub epoch_losses: Vec<f32>,
    /// Summed loss over the whole dataset with the trained weights
    pub final_loss: f32,
}

impl Network {
    /// Online gradient descent: forward, backpropagate and update for every
    /// sample in order, `epochs` times.
    pub fn train(&mut self, samples: &[Sample], epochs: usize) -> Result<TrainingReport> {
        self.train_with(samples, TrainingOptions::online(epochs))
    }

    /// Minibatch gradient descent.
    ///
    /// Gradients of a minibatch are computed in parallel against the same
    /// weights, summed in sample order, averaged and applied once.
    pub fn train_batched(
        &mut self,
        samples: &[Sample],
        epochs: usize,
        batch_size: usize,
    ) -> Result<TrainingReport> {
        self.train_with(
            samples,
            TrainingOptions {
                epochs,
                batch_size,
                shuffle: false,
            },
        )
    }

    pub fn train_with(&mut self, samples: &[Sample], options: TrainingOptions) -> Result<TrainingReport> {
        if options.epochs == 0 {
            return Err(NetworkError::InvalidArgument(
                "epochs must be positive".to_string(),
            ));
        }
        if options.batch_size == 0 {
            return Err(NetworkError::InvalidArgument(
                "batch size must be positive".to_string(),
            ));
        }
        if samples.is_empty() {
            return Err(NetworkError::InvalidArgument(
                "training set is empty".to_string(),
            ));
        }
        self.ensure_layers()?;
        self.mark_built();

        let mut order: Vec<usize> = (0..samples.len()).collect();
        let mut epoch_losses = Vec::with_capacity(options.epochs);

        for epoch in 0..options.epochs {
            let start_time = Instant::now();
            if options.shuffle {
                shuffle_indices(&mut order, &mut self.rng);
            }

            let epoch_loss = if options.batch_size == 1 {
                self.online_epoch(samples, &order)?
            } else {
                self.batched_epoch(samples, &order, options.batch_size)?
            };

            info!(
                "Epoch {}, Loss: {:.6} Time: {:.6}",
                epoch + 1,
                epoch_loss,
                start_time.elapsed().as_secs_f32()
            );
            epoch_losses.push(epoch_loss);
        }

        let final_loss = self.dataset_loss(samples)?;
        info!("Final total loss: {:.6}", final_loss);

        Ok(TrainingReport {
            epoch_losses,
            final_loss,
        })
    }

    fn online_epoch(&mut self, samples: &[Sample], order: &[usize]) -> Result<f32> {
        let mut total_loss = 0.0f32;
        for &index in order {
            let sample = &samples[index];
            let output = self.forward(&sample.input)?;
            self.backpropagate(&output, &sample.target, self.learning_rate)?;
            total_loss += self.config.loss.sample_loss(&output, &sample.target)?;
        }
        Ok(total_loss)
    }

    fn batched_epoch(&mut self, samples: &[Sample], order: &[usize], batch_size: usize) -> Result<f32> {
        let mut total_loss = 0.0f32;
        for batch in order.chunks(batch_size) {
            let network: &Network = self;
            let results = batch
                .par_iter()
                .map(|&index| network.sample_gradients(&samples[index]))
                .collect::<Result<Vec<_>>>()?;

            let mut batch_gradients = Gradients::zeros_for(&self.layers);
            for (gradients, loss) in results {
                batch_gradients.accumulate(&gradients)?;
                total_loss += loss;
            }

            batch_gradients.scale(1.0 / batch.len() as f32);
            self.apply_gradients(&batch_gradients, self.learning_rate)?;
        }
        Ok(total_loss)
    }

    fn sample_gradients(&self, sample: &Sample) -> Result<(Gradients, f32)> {
        let cache = self.forward_pass(&sample.input)?;
        let gradients = self.compute_gradients(&cache, &sample.target)?;
        let loss = self.config.loss.sample_loss(cache.output(), &sample.target)?;
        Ok((gradients, loss))
    }

    /// Summed loss of `samples` under the current weights.
    pub fn dataset_loss(&self, samples: &[Sample]) -> Result<f32> {
        let losses = samples
            .par_iter()
            .map(|sample| -> Result<f32> {
                let cache = self.forward_pass(&sample.input)?;
                self.config.loss.sample_loss(cache.output(), &sample.target)
            })
            .collect::<Result<Vec<f32>>>()?;
        Ok(losses.iter().sum())
    }

    /// Fraction of samples whose largest output matches the target's hot index.
    pub fn evaluate(&mut self, samples: &[Sample]) -> Result<f32> {
        if samples.is_empty() {
            return Err(NetworkError::InvalidArgument(
                "evaluation set is empty".to_string(),
            ));
        }
        self.ensure_layers()?;
        self.mark_built();

        let network: &Network = self;
        let hits = samples
            .par_iter()
            .map(|sample| -> Result<bool> {
                let cache = network.forward_pass(&sample.input)?;
                Ok(argmax(cache.output()) == argmax(&sample.target))
            })
            .collect::<Result<Vec<bool>>>()?;

        let correct = hits.iter().filter(|&&hit| hit).count();
        Ok(correct as f32 / samples.len() as f32)
    }
}
