//! End-to-end classification request.
//!
//! A [`Pipeline`] walks one request through
//! `Idle -> Encoding -> Building -> Training -> PredictingTest -> PredictingCustom -> Complete`.
//! Any error moves it to `Failed` and is returned to the caller unchanged.
//! Stages run strictly in sequence; a new [`Pipeline::run`] starts again from `Idle`.

use std::fmt;
use std::time::Instant;

use crate::predict::{PredictionResult, predict, predict_one};
use crate::train::{EpochReport, train};
use crate::{
    ModelConfig, RawRecord, Result, TrainedModel, TrainingMetrics, TrainingOptions,
    build_classifier, encode_raw,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PipelineState {
    #[default]
    Idle,
    Encoding,
    Building,
    Training,
    PredictingTest,
    PredictingCustom,
    Complete,
    Failed,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PipelineState::Idle => "idle",
            PipelineState::Encoding => "encoding",
            PipelineState::Building => "building",
            PipelineState::Training => "training",
            PipelineState::PredictingTest => "predicting-test",
            PipelineState::PredictingCustom => "predicting-custom",
            PipelineState::Complete => "complete",
            PipelineState::Failed => "failed",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone)]
pub struct PipelineRequest {
    pub training: Vec<RawRecord>,
    pub testing: Vec<RawRecord>,
    pub config: ModelConfig,
    pub options: TrainingOptions,
    /// Measurements to classify once training is done.
    pub custom_input: Vec<f32>,
}

impl PipelineRequest {
    pub fn new(
        training: Vec<RawRecord>,
        testing: Vec<RawRecord>,
        config: ModelConfig,
        custom_input: Vec<f32>,
    ) -> Self {
        Self {
            training,
            testing,
            config,
            options: TrainingOptions::default(),
            custom_input,
        }
    }

    pub fn with_options(mut self, options: TrainingOptions) -> Self {
        self.options = options;
        self
    }
}

#[derive(Debug)]
pub struct PipelineOutcome {
    pub metrics: TrainingMetrics,
    pub history: Vec<EpochReport>,
    pub model: TrainedModel,
    /// One entry per testing record, in input order.
    pub test_predictions: Vec<Result<PredictionResult>>,
    pub custom_prediction: PredictionResult,
}

#[derive(Debug, Default)]
pub struct Pipeline {
    state: PipelineState,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn state(&self) -> PipelineState {
        self.state
    }

    fn enter(&mut self, next: PipelineState) {
        log::info!("pipeline: {} -> {}", self.state, next);
        self.state = next;
    }

    pub fn run(&mut self, request: &PipelineRequest) -> Result<PipelineOutcome> {
        self.state = PipelineState::Idle;
        match self.run_stages(request) {
            Ok(outcome) => {
                self.enter(PipelineState::Complete);
                Ok(outcome)
            }
            Err(err) => {
                log::error!("pipeline failed while {}: {err}", self.state);
                self.enter(PipelineState::Failed);
                Err(err)
            }
        }
    }

    fn run_stages(&mut self, request: &PipelineRequest) -> Result<PipelineOutcome> {
        request.config.validate()?;
        request.options.validate()?;

        self.enter(PipelineState::Encoding);
        let started = Instant::now();
        let train_set = encode_raw(&request.training)?;
        let test_set = encode_raw(&request.testing)?;
        let dataset = train_set.to_dataset()?;
        log::debug!(
            "encoded {} training and {} testing records",
            train_set.len(),
            test_set.len()
        );

        self.enter(PipelineState::Building);
        let untrained = build_classifier(&request.config, request.options.seed)?;

        self.enter(PipelineState::Training);
        let (model, report) = train(untrained, &dataset, &request.config, &request.options)?;
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        let metrics = TrainingMetrics::new(
            &request.config,
            report.final_loss(),
            report.final_accuracy(),
            elapsed_ms,
        );

        self.enter(PipelineState::PredictingTest);
        let test_predictions = predict(&model, &test_set.features);

        self.enter(PipelineState::PredictingCustom);
        let custom_prediction = predict_one(&model, &request.custom_input)?;
        log::info!(
            "custom input {:?} classified as {}",
            request.custom_input,
            custom_prediction.predicted_species
        );

        Ok(PipelineOutcome {
            metrics,
            history: report.epochs,
            model,
            test_predictions,
            custom_prediction,
        })
    }
}
