//! Training loop.
//!
//! [`train`] runs exactly `epochs` passes of mini-batch Adam over the training
//! set, minimizing categorical cross-entropy and tracking categorical accuracy.
//! There is no early stopping. The per-pass loss/accuracy are sample-weighted
//! means measured while the pass runs; the reported final values are the ones of
//! the last pass.
//!
//! All buffers are allocated once in [`Trainer::new`]; the per-step hot path
//! does not allocate.

use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::metrics::categorical_match;
use crate::optim::{Adam, AdamState};
use crate::{
    Dataset, Error, Gradients, Mlp, ModelConfig, Result, Scratch, TrainedModel, TrainingOptions,
    loss,
};

/// Loss and accuracy of one pass over the training set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpochReport {
    /// 1-based pass number.
    pub epoch: usize,
    pub loss: f32,
    pub accuracy: f32,
}

#[derive(Debug, Clone)]
pub struct FitReport {
    pub epochs: Vec<EpochReport>,
    pub elapsed: Duration,
}

impl FitReport {
    /// Values of the last pass.
    pub fn last(&self) -> Option<&EpochReport> {
        self.epochs.last()
    }

    pub fn final_loss(&self) -> f32 {
        self.last().map_or(f32::NAN, |e| e.loss)
    }

    pub fn final_accuracy(&self) -> f32 {
        self.last().map_or(f32::NAN, |e| e.accuracy)
    }
}

/// Reusable training state for one model: forward/backward buffers, the
/// mini-batch gradient accumulator, Adam moments and the shuffled sample order.
#[derive(Debug, Clone)]
pub struct Trainer {
    scratch: Scratch,
    grads: Gradients,
    batch_grads: Gradients,
    optimizer: AdamState,
    order: Vec<usize>,
    rng: StdRng,
    lr: f32,
    batch_size: usize,
    shuffle: bool,
}

impl Trainer {
    pub fn new(
        model: &Mlp,
        train_len: usize,
        config: &ModelConfig,
        options: &TrainingOptions,
    ) -> Result<Self> {
        config.validate()?;
        options.validate()?;

        Ok(Self {
            scratch: model.scratch(),
            grads: model.gradients(),
            batch_grads: model.gradients(),
            optimizer: Adam::default().state(model)?,
            order: (0..train_len).collect(),
            rng: StdRng::seed_from_u64(options.seed),
            lr: config.learning_rate,
            batch_size: options.batch_size,
            shuffle: options.shuffle,
        })
    }

    /// One full pass over `data`. Returns `(mean loss, accuracy)`.
    pub fn run_epoch(&mut self, model: &mut Mlp, data: &Dataset) -> (f32, f32) {
        debug_assert_eq!(self.order.len(), data.len());

        if self.shuffle {
            self.order.shuffle(&mut self.rng);
        }

        let mut loss_sum = 0.0_f32;
        let mut correct = 0_usize;

        for batch in self.order.chunks(self.batch_size) {
            self.batch_grads.zero();
            let scale = 1.0 / batch.len() as f32;

            for &idx in batch {
                let input = data.input(idx);
                let target = data.target(idx);

                let pred = model.forward(input, &mut self.scratch);
                if categorical_match(pred, target) {
                    correct += 1;
                }
                loss_sum +=
                    loss::categorical_cross_entropy_backward(pred, target, self.grads.d_output_mut());

                model.backward(input, &self.scratch, &mut self.grads);
                self.batch_grads.accumulate(&self.grads, scale);
            }

            self.optimizer.step(model, &mut self.batch_grads, self.lr);
        }

        let n = data.len() as f32;
        (loss_sum / n, correct as f32 / n)
    }
}

fn check_shapes(model: &Mlp, data: &Dataset) -> Result<()> {
    if data.is_empty() {
        return Err(Error::InvalidData(
            "train dataset must not be empty".to_owned(),
        ));
    }
    if data.input_dim() != model.input_dim() {
        return Err(Error::InvalidData(format!(
            "train input_dim {} does not match model input_dim {}",
            data.input_dim(),
            model.input_dim()
        )));
    }
    if data.target_dim() != model.output_dim() {
        return Err(Error::InvalidData(format!(
            "train target_dim {} does not match model output_dim {}",
            data.target_dim(),
            model.output_dim()
        )));
    }
    Ok(())
}

/// Train an untrained classifier for exactly `config.epochs` passes.
///
/// Consumes the model: on success it comes back as a [`TrainedModel`]; on
/// divergence (non-finite loss in any pass) it is dropped and
/// `TrainingDiverged` is returned.
pub fn train(
    mut model: Mlp,
    data: &Dataset,
    config: &ModelConfig,
    options: &TrainingOptions,
) -> Result<(TrainedModel, FitReport)> {
    check_shapes(&model, data)?;

    let started = Instant::now();
    let mut trainer = Trainer::new(&model, data.len(), config, options)?;
    let mut epochs = Vec::with_capacity(config.epochs);

    for epoch in 1..=config.epochs {
        let (loss, accuracy) = trainer.run_epoch(&mut model, data);
        if !loss.is_finite() {
            log::warn!("training diverged at epoch {epoch}: loss={loss}");
            return Err(Error::TrainingDiverged { epoch, loss });
        }
        log::debug!(
            "epoch {epoch}/{}: loss={loss:.4} accuracy={accuracy:.4}",
            config.epochs
        );
        epochs.push(EpochReport {
            epoch,
            loss,
            accuracy,
        });
    }

    let report = FitReport {
        epochs,
        elapsed: started.elapsed(),
    };
    log::info!(
        "trained {} epochs in {:?}: loss={:.4} accuracy={:.4}",
        config.epochs,
        report.elapsed,
        report.final_loss(),
        report.final_accuracy()
    );

    Ok((TrainedModel::from_mlp(model)?, report))
}
