use dense_mlp::config::{load_config, TrainingConfig};
use dense_mlp::data::{load_csv, normalize, to_samples, ImageRecord};
use dense_mlp::export::{write_pgm, write_predictions};
use dense_mlp::network::Network;
use dense_mlp::Result;
use log::{error, info, warn};
use std::env;
use std::process;
use std::time::Instant;

// MLP trained on CSV-encoded MNIST images (label column + 784 pixels).
const DEFAULT_CONFIG_PATH: &str = "config/mnist_csv.json";

/// Picks the config path from the first CLI argument, falling back to the default.
fn config_path_from_args(args: &[String]) -> &str {
    args.get(1).map_or(DEFAULT_CONFIG_PATH, String::as_str)
}

/// Builds `input -> hidden_layers... -> num_classes` from the run configuration.
fn build_network(config: &TrainingConfig, input_size: usize) -> Result<Network> {
    let mut network = Network::with_options(input_size, config.network, config.seed)?;
    for &size in &config.hidden_layers {
        network.add_layer(size)?;
    }
    network.add_layer(config.num_classes)?;
    network.set_learning_rate(config.learning_rate)?;
    Ok(network)
}

fn load_records(path: &str, labeled: bool, config: &TrainingConfig) -> Result<Vec<ImageRecord>> {
    let mut records = load_csv(path, labeled, config.num_classes)?;
    normalize(&mut records, config.pixel_scale);
    Ok(records)
}

/// Share of predictions matching the record labels; `None` for unlabeled records.
fn labeled_accuracy(records: &[ImageRecord], predictions: &[usize]) -> Option<f32> {
    if records.is_empty() || records.iter().any(|record| record.label.is_none()) {
        return None;
    }
    let correct = records
        .iter()
        .zip(predictions)
        .filter(|(record, &predicted)| record.label == Some(predicted))
        .count();
    Some(correct as f32 / records.len() as f32)
}

fn predict_test_set(network: &mut Network, config: &TrainingConfig, path: &str) -> Result<()> {
    let records = load_records(path, config.test_labeled, config)?;

    let mut predictions = Vec::with_capacity(records.len());
    for record in &records {
        predictions.push(network.classify(&record.pixels)?);
    }

    if let Some(accuracy) = labeled_accuracy(&records, &predictions) {
        info!("Test Accuracy: {:.2}%", accuracy * 100.0);
    }

    if let Some(output) = &config.predictions_path {
        write_predictions(output, &predictions)?;
    }

    if let Some(preview) = &config.preview_path {
        if let Some(first) = records.first() {
            // Undo normalization so the preview uses 0..255 intensities.
            let pixels: Vec<f32> = first
                .pixels
                .iter()
                .map(|p| p * config.pixel_scale)
                .collect();
            write_pgm(preview, &pixels, config.image_width, config.image_height)?;
            info!("Preview of test image #1 written to {}", preview);
        }
    }
    Ok(())
}

fn run(config_path: &str) -> Result<()> {
    let program_start = Instant::now();
    let config = load_config(config_path)?;

    info!("Loading training data...");
    let load_start = Instant::now();
    let train_records = load_records(&config.train_path, true, &config)?;
    let input_size = train_records[0].pixels.len();
    let train_samples = to_samples(train_records, config.num_classes)?;
    info!(
        "Data loading time: {:.2} seconds",
        load_start.elapsed().as_secs_f64()
    );

    let mut network = build_network(&config, input_size)?;
    info!("Network:\n{}", network);

    info!("Training neural network...");
    let train_start = Instant::now();
    let report = network.train_with(&train_samples, config.training_options())?;
    info!(
        "Total training time: {:.2} seconds, final loss {:.6}",
        train_start.elapsed().as_secs_f64(),
        report.final_loss
    );

    match &config.test_path {
        Some(path) => predict_test_set(&mut network, &config, path)?,
        None => warn!("No test_path configured; skipping prediction"),
    }

    info!(
        "Total program time: {:.2} seconds",
        program_start.elapsed().as_secs_f64()
    );
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    let config_path = config_path_from_args(&args);

    if let Err(e) = run(config_path) {
        error!("{}", e);
        process::exit(1);
    }
}
