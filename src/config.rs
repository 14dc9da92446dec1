//! Hyperparameters.
//!
//! [`ModelConfig`] is the caller-facing request: topology, epochs and learning
//! rate. [`TrainingOptions`] holds the knobs the caller rarely touches (seed,
//! batch size, shuffling). Both are plain values validated before any stage runs.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

pub const MAX_EPOCHS: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelConfig {
    pub first_layer_units: usize,
    pub second_layer_units: usize,
    pub epochs: usize,
    pub learning_rate: f32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            first_layer_units: 8,
            second_layer_units: 10,
            epochs: 100,
            learning_rate: 0.06,
        }
    }
}

impl ModelConfig {
    /// Construct and validate.
    pub fn new(
        first_layer_units: usize,
        second_layer_units: usize,
        epochs: usize,
        learning_rate: f32,
    ) -> Result<Self> {
        let cfg = Self {
            first_layer_units,
            second_layer_units,
            epochs,
            learning_rate,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.first_layer_units == 0 {
            return Err(Error::InvalidConfig(
                "firstLayerUnits must be >= 1".to_owned(),
            ));
        }
        if self.second_layer_units == 0 {
            return Err(Error::InvalidConfig(
                "secondLayerUnits must be >= 1".to_owned(),
            ));
        }
        if !(1..=MAX_EPOCHS).contains(&self.epochs) {
            return Err(Error::InvalidConfig(format!(
                "epochs must be in [1, {MAX_EPOCHS}], got {}",
                self.epochs
            )));
        }
        if !(self.learning_rate.is_finite()
            && self.learning_rate > 0.0
            && self.learning_rate <= 1.0)
        {
            return Err(Error::InvalidConfig(format!(
                "learningRate must be in (0, 1], got {}",
                self.learning_rate
            )));
        }
        Ok(())
    }

    /// Read and validate a JSON config file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let s = std::fs::read_to_string(path)?;
        let cfg: Self = serde_json::from_str(&s)?;
        cfg.validate()?;
        Ok(cfg)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrainingOptions {
    /// Seeds weight initialization and shuffling.
    pub seed: u64,
    pub batch_size: usize,
    /// Reshuffle the training order before every epoch.
    pub shuffle: bool,
}

impl Default for TrainingOptions {
    fn default() -> Self {
        Self {
            seed: 0,
            batch_size: 32,
            shuffle: true,
        }
    }
}

impl TrainingOptions {
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(Error::InvalidConfig("batch_size must be > 0".to_owned()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(ModelConfig::default().validate().is_ok());
        assert!(TrainingOptions::default().validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert!(ModelConfig::new(0, 10, 100, 0.06).is_err());
        assert!(ModelConfig::new(8, 0, 100, 0.06).is_err());
        assert!(ModelConfig::new(8, 10, 0, 0.06).is_err());
        assert!(ModelConfig::new(8, 10, 1001, 0.06).is_err());
        assert!(ModelConfig::new(8, 10, 100, 0.0).is_err());
        assert!(ModelConfig::new(8, 10, 100, 1.5).is_err());
        assert!(ModelConfig::new(8, 10, 100, f32::NAN).is_err());
        assert!(ModelConfig::new(1, 1, 1000, 1.0).is_ok());

        let opts = TrainingOptions {
            batch_size: 0,
            ..TrainingOptions::default()
        };
        assert!(opts.validate().is_err());
    }

    #[test]
    fn parses_camel_case_json() {
        let cfg: ModelConfig = serde_json::from_str(
            r#"{"firstLayerUnits":4,"secondLayerUnits":6,"epochs":20,"learningRate":0.1}"#,
        )
        .unwrap();
        assert_eq!(cfg, ModelConfig::new(4, 6, 20, 0.1).unwrap());

        let opts: TrainingOptions = serde_json::from_str(r#"{"seed":9}"#).unwrap();
        assert_eq!(opts.seed, 9);
        assert_eq!(opts.batch_size, 32);
    }
}
