//! Iris species and their fixed class indices.
//!
//! The class order is `setosa = 0`, `virginica = 1`, `versicolor = 2`. It is not
//! alphabetical. One-hot labels, model outputs and saved models all depend on it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Number of output classes.
pub const NUM_CLASSES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Species {
    Setosa,
    Virginica,
    Versicolor,
}

const BY_INDEX: [Species; NUM_CLASSES] = [Species::Setosa, Species::Virginica, Species::Versicolor];

impl Species {
    /// All species in class-index order.
    pub const ALL: [Species; NUM_CLASSES] = BY_INDEX;

    #[inline]
    pub fn index(self) -> usize {
        match self {
            Species::Setosa => 0,
            Species::Virginica => 1,
            Species::Versicolor => 2,
        }
    }

    #[inline]
    pub fn from_index(idx: usize) -> Option<Self> {
        BY_INDEX.get(idx).copied()
    }

    #[inline]
    pub fn name(self) -> &'static str {
        match self {
            Species::Setosa => "setosa",
            Species::Virginica => "virginica",
            Species::Versicolor => "versicolor",
        }
    }

    /// One-hot label in class-index order.
    #[inline]
    pub fn one_hot(self) -> [f32; NUM_CLASSES] {
        let mut out = [0.0; NUM_CLASSES];
        out[self.index()] = 1.0;
        out
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Species {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "setosa" => Ok(Species::Setosa),
            "virginica" => Ok(Species::Virginica),
            "versicolor" => Ok(Species::Versicolor),
            other => Err(Error::InvalidData(format!("unknown species {other:?}"))),
        }
    }
}
