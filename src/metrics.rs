//! Metrics.
//!
//! Evaluation helpers (they do not participate in backprop) and the metrics
//! snapshot reported after a training run.

use serde::{Deserialize, Serialize};

use crate::ModelConfig;

/// Index of the largest value; ties resolve to the lowest index.
///
/// Returns `None` for an empty slice.
#[inline]
pub fn argmax(xs: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &x) in xs.iter().enumerate() {
        match best {
            Some((_, b)) if x <= b => {}
            _ => best = Some((i, x)),
        }
    }
    best.map(|(i, _)| i)
}

/// True when the predicted and target arg-max agree.
#[inline]
pub fn categorical_match(pred: &[f32], target: &[f32]) -> bool {
    argmax(pred) == argmax(target)
}

/// Snapshot taken after the last optimization pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingMetrics {
    pub final_loss: f32,
    pub final_accuracy: f32,
    pub elapsed_time_ms: u64,
    pub epochs: usize,
    pub learning_rate: f32,
    pub first_layer_units: usize,
    pub second_layer_units: usize,
}

impl TrainingMetrics {
    pub fn new(config: &ModelConfig, final_loss: f32, final_accuracy: f32, elapsed_time_ms: u64) -> Self {
        Self {
            final_loss,
            final_accuracy,
            elapsed_time_ms,
            epochs: config.epochs,
            learning_rate: config.learning_rate,
            first_layer_units: config.first_layer_units,
            second_layer_units: config.second_layer_units,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argmax_prefers_the_first_maximum() {
        assert_eq!(argmax(&[0.5, 0.5, 0.0]), Some(0));
        assert_eq!(argmax(&[0.1, 0.45, 0.45]), Some(1));
        assert_eq!(argmax(&[0.2, 0.3, 0.5]), Some(2));
        assert_eq!(argmax(&[]), None);
    }

    #[test]
    fn categorical_match_compares_arg_max() {
        assert!(categorical_match(&[0.1, 0.8, 0.1], &[0.0, 1.0, 0.0]));
        assert!(!categorical_match(&[0.8, 0.1, 0.1], &[0.0, 1.0, 0.0]));
    }

    #[test]
    fn metrics_serialize_with_camel_case_keys() {
        let m = TrainingMetrics::new(&ModelConfig::default(), 0.25, 0.9, 1200);
        let v = serde_json::to_value(m).unwrap();
        assert_eq!(v["finalAccuracy"], serde_json::json!(0.9_f32));
        assert_eq!(v["elapsedTimeMs"], 1200);
        assert_eq!(v["firstLayerUnits"], 8);
    }
}
