//! Contiguous dataset storage and dataset loading.
//!
//! The training loop operates on slices to avoid per-step allocations. [`Dataset`]
//! provides validated, row-major storage for feature/target matrices.
//! [`IrisData`] reads the raw training and testing rows from JSON.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Error, RawRecord, Result};

/// A supervised dataset: inputs (X) and targets (Y).
///
/// Stored as contiguous buffers with row-major layout:
/// - `inputs.len() == len * input_dim`
/// - `targets.len() == len * target_dim`
#[derive(Debug, Clone)]
pub struct Dataset {
    inputs: Vec<f32>,
    targets: Vec<f32>,
    len: usize,
    input_dim: usize,
    target_dim: usize,
}

impl Dataset {
    /// Build a dataset from flat buffers.
    ///
    /// `inputs` is `(len, input_dim)` and `targets` is `(len, target_dim)`.
    pub fn from_flat(
        inputs: Vec<f32>,
        targets: Vec<f32>,
        input_dim: usize,
        target_dim: usize,
    ) -> Result<Self> {
        if input_dim == 0 {
            return Err(Error::InvalidData("input_dim must be > 0".to_owned()));
        }
        if target_dim == 0 {
            return Err(Error::InvalidData("target_dim must be > 0".to_owned()));
        }
        if !inputs.len().is_multiple_of(input_dim) {
            return Err(Error::InvalidData(format!(
                "inputs length {} is not divisible by input_dim {input_dim}",
                inputs.len()
            )));
        }

        let len = inputs.len() / input_dim;
        if targets.len() != len * target_dim {
            return Err(Error::InvalidData(format!(
                "targets length {} does not match len * target_dim ({len} * {target_dim})",
                targets.len()
            )));
        }

        Ok(Self {
            inputs,
            targets,
            len,
            input_dim,
            target_dim,
        })
    }

    #[inline]
    /// Returns the number of samples.
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn input_dim(&self) -> usize {
        self.input_dim
    }

    #[inline]
    pub fn target_dim(&self) -> usize {
        self.target_dim
    }

    #[inline]
    /// Returns the `idx`-th input row. Panics if `idx >= len`.
    pub fn input(&self, idx: usize) -> &[f32] {
        let start = idx * self.input_dim;
        &self.inputs[start..start + self.input_dim]
    }

    #[inline]
    /// Returns the `idx`-th target row. Panics if `idx >= len`.
    pub fn target(&self, idx: usize) -> &[f32] {
        let start = idx * self.target_dim;
        &self.targets[start..start + self.target_dim]
    }
}

/// Training and testing rows, in the shape the data endpoint served them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IrisData {
    pub training_data: Vec<RawRecord>,
    pub testing_data: Vec<RawRecord>,
}

impl IrisData {
    /// Read a combined `{"trainingData": [...], "testingData": [...]}` document.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let s = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&s)?)
    }

    /// Read two JSON arrays of rows.
    pub fn from_split_files<P: AsRef<Path>, Q: AsRef<Path>>(training: P, testing: Q) -> Result<Self> {
        Ok(Self {
            training_data: read_records(training)?,
            testing_data: read_records(testing)?,
        })
    }
}

/// Read a JSON array of rows. Rows are not validated here.
pub fn read_records<P: AsRef<Path>>(path: P) -> Result<Vec<RawRecord>> {
    let s = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&s)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dataset_from_flat_validates_shapes() {
        let ok = Dataset::from_flat(vec![0.0, 1.0, 2.0, 3.0], vec![0.0, 1.0], 2, 1);
        assert!(ok.is_ok());

        let err = Dataset::from_flat(vec![0.0, 1.0, 2.0], vec![0.0], 2, 1);
        assert!(err.is_err());

        let err = Dataset::from_flat(vec![0.0, 1.0], vec![0.0, 1.0], 2, 1);
        assert!(err.is_err());
    }

    #[test]
    fn rows_are_addressable() {
        let ds = Dataset::from_flat(vec![1.0, 2.0, 3.0, 4.0], vec![1.0, 0.0, 0.0, 1.0], 2, 2)
            .unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.input(1), &[3.0, 4.0]);
        assert_eq!(ds.target(0), &[1.0, 0.0]);
    }

    #[test]
    fn combined_document_parses() {
        let json = r#"{
            "trainingData": [{"sepal_length": 5.1, "sepal_width": 3.5, "petal_length": 1.4, "petal_width": 0.2, "species": "setosa"}],
            "testingData": []
        }"#;
        let data: IrisData = serde_json::from_str(json).unwrap();
        assert_eq!(data.training_data.len(), 1);
        assert!(data.testing_data.is_empty());
    }
}
