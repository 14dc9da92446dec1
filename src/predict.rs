//! Prediction.
//!
//! Applies a [`TrainedModel`] to feature vectors. Each input gets its own
//! `Result`: a malformed or non-finite vector fails alone and the rest of the batch is still
//! evaluated. Valid inputs run through one batched forward pass.

use serde::{Deserialize, Serialize};

use crate::metrics::argmax;
use crate::record::NUM_FEATURES;
use crate::species::NUM_CLASSES;
use crate::{Error, LabelVector, Result, Species, TrainedModel};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResult {
    /// Softmax output in class-index order.
    pub probabilities: LabelVector,
    pub predicted_species: Species,
}

impl PredictionResult {
    /// Decode a probability vector; ties go to the lowest class index.
    pub fn from_probabilities(probabilities: LabelVector) -> Self {
        let idx = argmax(&probabilities).unwrap_or(0);
        let predicted_species = Species::from_index(idx).unwrap_or(Species::Setosa);
        Self {
            probabilities,
            predicted_species,
        }
    }
}

fn check_input(input: &[f32]) -> Result<()> {
    if input.len() != NUM_FEATURES {
        return Err(Error::ShapeMismatch {
            expected: NUM_FEATURES,
            actual: input.len(),
        });
    }
    if let Some(i) = input.iter().position(|v| !v.is_finite()) {
        return Err(Error::InvalidData(format!(
            "input component {i} is not finite: {}",
            input[i]
        )));
    }
    Ok(())
}

/// Predict a single feature vector.
pub fn predict_one(model: &TrainedModel, input: &[f32]) -> Result<PredictionResult> {
    check_input(input)?;
    predict(model, &[input]).pop().ok_or_else(|| {
        Error::InvalidData("batched forward produced no result".to_owned())
    })?
}

/// Predict every input, preserving order.
pub fn predict<I: AsRef<[f32]>>(model: &TrainedModel, inputs: &[I]) -> Vec<Result<PredictionResult>> {
    let valid: Vec<&[f32]> = inputs
        .iter()
        .map(|x| x.as_ref())
        .filter(|x| check_input(x).is_ok())
        .collect();

    let mut probs = Vec::new();
    if !valid.is_empty() {
        let mlp = model.mlp();
        let mut flat = Vec::with_capacity(valid.len() * NUM_FEATURES);
        for x in &valid {
            flat.extend_from_slice(x);
        }
        let mut scratch = mlp.batch_scratch(valid.len());
        probs = mlp.forward_batch(&flat, &mut scratch).to_vec();
    }

    let mut rows = probs.chunks_exact(NUM_CLASSES);
    inputs
        .iter()
        .map(|x| {
            check_input(x.as_ref())?;
            let row = rows.next().ok_or_else(|| {
                Error::InvalidData("batched forward produced too few rows".to_owned())
            })?;
            if row.iter().any(|p| !p.is_finite()) {
                return Err(Error::InvalidData(
                    "model produced non-finite probabilities".to_owned(),
                ));
            }
            let mut p = [0.0_f32; NUM_CLASSES];
            p.copy_from_slice(row);
            Ok(PredictionResult::from_probabilities(p))
        })
        .collect()
}
