//! iris-mlp CLI
//!
//! Train the Iris classifier on JSON data and classify measurements.

use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::{Value, json};

use iris_mlp::{
    IrisData, ModelConfig, Pipeline, PipelineRequest, PredictionResult, TrainedModel,
    TrainingMetrics, TrainingOptions, predict_one,
};

#[derive(Parser)]
#[command(name = "iris-mlp")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Train and query a small Iris flower classifier", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a classifier and classify the test set plus one custom input
    Train {
        /// Combined {"trainingData": [...], "testingData": [...]} document
        #[arg(short, long, conflicts_with_all = ["train", "test"])]
        data: Option<PathBuf>,

        /// Training rows (JSON array)
        #[arg(long, requires = "test")]
        train: Option<PathBuf>,

        /// Testing rows (JSON array)
        #[arg(long, requires = "train")]
        test: Option<PathBuf>,

        /// Model config (JSON, camelCase keys); flags override it
        #[arg(short, long)]
        config: Option<PathBuf>,

        #[arg(long)]
        epochs: Option<usize>,

        #[arg(long)]
        learning_rate: Option<f32>,

        #[arg(long)]
        first_layer_units: Option<usize>,

        #[arg(long)]
        second_layer_units: Option<usize>,

        /// Seed for weight init and shuffling
        #[arg(long, default_value = "0")]
        seed: u64,

        #[arg(long, default_value = "32")]
        batch_size: usize,

        /// Measurements to classify: sepal_length,sepal_width,petal_length,petal_width
        #[arg(short, long, value_delimiter = ',', default_values_t = [5.1_f32, 3.5, 1.4, 0.2])]
        input: Vec<f32>,

        /// Write the trained model here
        #[arg(long)]
        save_model: Option<PathBuf>,
    },

    /// Classify one input with a saved model
    Predict {
        /// Model file written by `train --save-model`
        #[arg(short, long)]
        model: PathBuf,

        /// sepal_length,sepal_width,petal_length,petal_width
        #[arg(short, long, value_delimiter = ',', required = true)]
        input: Vec<f32>,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TrainReport<'a> {
    params: &'a ModelConfig,
    metrics: &'a TrainingMetrics,
    test_predictions: Vec<Value>,
    custom_prediction: &'a PredictionResult,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Train {
            data,
            train,
            test,
            config,
            epochs,
            learning_rate,
            first_layer_units,
            second_layer_units,
            seed,
            batch_size,
            input,
            save_model,
        } => {
            let iris = match (data, train, test) {
                (Some(path), None, None) => IrisData::from_json_file(&path)
                    .with_context(|| format!("failed to read {}", path.display()))?,
                (None, Some(train), Some(test)) => IrisData::from_split_files(&train, &test)
                    .with_context(|| {
                        format!("failed to read {} / {}", train.display(), test.display())
                    })?,
                _ => bail!("pass either --data or both --train and --test"),
            };

            let mut cfg = match config {
                Some(path) => ModelConfig::from_json_file(&path)
                    .with_context(|| format!("failed to load config {}", path.display()))?,
                None => ModelConfig::default(),
            };
            if let Some(v) = epochs {
                cfg.epochs = v;
            }
            if let Some(v) = learning_rate {
                cfg.learning_rate = v;
            }
            if let Some(v) = first_layer_units {
                cfg.first_layer_units = v;
            }
            if let Some(v) = second_layer_units {
                cfg.second_layer_units = v;
            }
            cfg.validate()?;

            let options = TrainingOptions {
                seed,
                batch_size,
                ..TrainingOptions::default()
            };
            let request = PipelineRequest::new(iris.training_data, iris.testing_data, cfg, input)
                .with_options(options);

            let outcome = Pipeline::new().run(&request).context("pipeline failed")?;

            if let Some(path) = save_model {
                outcome
                    .model
                    .save_json(&path)
                    .with_context(|| format!("failed to save model to {}", path.display()))?;
            }

            let test_predictions = outcome
                .test_predictions
                .iter()
                .map(|p| match p {
                    Ok(r) => serde_json::to_value(r),
                    Err(e) => Ok(json!({ "error": e.to_string() })),
                })
                .collect::<Result<Vec<_>, _>>()?;

            let report = TrainReport {
                params: &cfg,
                metrics: &outcome.metrics,
                test_predictions,
                custom_prediction: &outcome.custom_prediction,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }

        Commands::Predict { model, input } => {
            let trained = TrainedModel::load_json(&model)
                .with_context(|| format!("failed to load model {}", model.display()))?;
            let prediction = predict_one(&trained, &input)?;
            println!("{}", serde_json::to_string_pretty(&prediction)?);
        }
    }

    Ok(())
}
