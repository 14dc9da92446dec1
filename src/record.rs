//! Feature encoding.
//!
//! Dataset rows arrive as loosely typed [`RawRecord`]s. Validation turns them into
//! [`LabeledRecord`]s, and [`encode`] turns those into parallel feature and
//! one-hot label vectors. Encoding is pure: same records in, bit-identical
//! vectors out, order and length preserved.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::species::NUM_CLASSES;
use crate::{Dataset, Error, Result, Species};

/// Number of input measurements per flower.
pub const NUM_FEATURES: usize = 4;

/// `(sepal_length, sepal_width, petal_length, petal_width)`.
pub type FeatureVector = [f32; NUM_FEATURES];

/// One-hot label in class-index order.
pub type LabelVector = [f32; NUM_CLASSES];

/// A dataset row as delivered by the data source, before validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(default)]
    pub sepal_length: Option<Value>,
    #[serde(default)]
    pub sepal_width: Option<Value>,
    #[serde(default)]
    pub petal_length: Option<Value>,
    #[serde(default)]
    pub petal_width: Option<Value>,
    #[serde(default)]
    pub species: Option<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabeledRecord {
    pub sepal_length: f32,
    pub sepal_width: f32,
    pub petal_length: f32,
    pub petal_width: f32,
    pub species: Species,
}

impl LabeledRecord {
    #[inline]
    pub fn features(&self) -> FeatureVector {
        [
            self.sepal_length,
            self.sepal_width,
            self.petal_length,
            self.petal_width,
        ]
    }

    #[inline]
    pub fn label(&self) -> LabelVector {
        self.species.one_hot()
    }

    /// Validate a raw row; `index` is only used in the error.
    pub fn from_raw(index: usize, raw: &RawRecord) -> Result<Self> {
        let measure = |name: &str, value: &Option<Value>| -> Result<f32> {
            let invalid = |reason: String| Error::InvalidRecord { index, reason };
            match value {
                None | Some(Value::Null) => Err(invalid(format!("missing {name}"))),
                Some(Value::Number(n)) => match n.as_f64() {
                    Some(v) if v.is_finite() && (v as f32).is_finite() => Ok(v as f32),
                    _ => Err(invalid(format!("{name} is not a finite number"))),
                },
                Some(other) => Err(invalid(format!("{name} is not numeric: {other}"))),
            }
        };

        let species = match &raw.species {
            Some(Value::String(s)) => s.parse::<Species>().map_err(|_| Error::InvalidRecord {
                index,
                reason: format!("unknown species {s:?}"),
            })?,
            None | Some(Value::Null) => {
                return Err(Error::InvalidRecord {
                    index,
                    reason: "missing species".to_owned(),
                });
            }
            Some(other) => {
                return Err(Error::InvalidRecord {
                    index,
                    reason: format!("species is not a string: {other}"),
                });
            }
        };

        Ok(Self {
            sepal_length: measure("sepal_length", &raw.sepal_length)?,
            sepal_width: measure("sepal_width", &raw.sepal_width)?,
            petal_length: measure("petal_length", &raw.petal_length)?,
            petal_width: measure("petal_width", &raw.petal_width)?,
            species,
        })
    }
}

impl From<&LabeledRecord> for RawRecord {
    fn from(r: &LabeledRecord) -> Self {
        let num = |v: f32| serde_json::Number::from_f64(f64::from(v)).map(Value::Number);
        Self {
            sepal_length: num(r.sepal_length),
            sepal_width: num(r.sepal_width),
            petal_length: num(r.petal_length),
            petal_width: num(r.petal_width),
            species: Some(Value::String(r.species.name().to_owned())),
        }
    }
}

/// Parallel feature/label vectors produced by the encoder.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EncodedSet {
    pub features: Vec<FeatureVector>,
    pub labels: Vec<LabelVector>,
}

impl EncodedSet {
    #[inline]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Copy into a contiguous row-major training matrix.
    pub fn to_dataset(&self) -> Result<Dataset> {
        let inputs = self.features.iter().flatten().copied().collect();
        let targets = self.labels.iter().flatten().copied().collect();
        Dataset::from_flat(inputs, targets, NUM_FEATURES, NUM_CLASSES)
    }
}

/// Encode validated records into feature and one-hot label vectors.
///
/// Fails with `InvalidRecord` on the first record carrying a non-finite measurement.
pub fn encode(records: &[LabeledRecord]) -> Result<EncodedSet> {
    let mut features = Vec::with_capacity(records.len());
    let mut labels = Vec::with_capacity(records.len());

    for (index, record) in records.iter().enumerate() {
        let x = record.features();
        if x.iter().any(|v| !v.is_finite()) {
            return Err(Error::InvalidRecord {
                index,
                reason: "measurements must be finite".to_owned(),
            });
        }
        features.push(x);
        labels.push(record.label());
    }

    Ok(EncodedSet { features, labels })
}

/// Validate every raw row, then encode. The first bad row aborts.
pub fn validate_records(raw: &[RawRecord]) -> Result<Vec<LabeledRecord>> {
    raw.iter()
        .enumerate()
        .map(|(i, r)| LabeledRecord::from_raw(i, r))
        .collect()
}

pub fn encode_raw(raw: &[RawRecord]) -> Result<EncodedSet> {
    encode(&validate_records(raw)?)
}
