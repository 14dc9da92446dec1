//! Model files.
//!
//! A versioned, stable on-disk JSON format for [`TrainedModel`].
//!
//! - Internal `Mlp`/`Layer` structs are not serialized directly; the file
//!   format has its own types.
//! - Loading validates dimensions, parameter lengths, finiteness, layer
//!   chaining and the `4 -> ... -> 3 (softmax)` classifier contract.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Activation, Error, Layer, Mlp, Result, TrainedModel};

pub const MODEL_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedModel {
    pub format_version: u32,
    pub layers: Vec<SerializedLayer>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedLayer {
    pub in_dim: usize,
    pub out_dim: usize,
    pub activation: SerializedActivation,
    /// Row-major (out_dim, in_dim).
    pub weights: Vec<f32>,
    pub biases: Vec<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SerializedActivation {
    Relu,
    Identity,
    Softmax,
}

impl From<Activation> for SerializedActivation {
    fn from(value: Activation) -> Self {
        match value {
            Activation::ReLU => SerializedActivation::Relu,
            Activation::Identity => SerializedActivation::Identity,
            Activation::Softmax => SerializedActivation::Softmax,
        }
    }
}

impl From<SerializedActivation> for Activation {
    fn from(value: SerializedActivation) -> Self {
        match value {
            SerializedActivation::Relu => Activation::ReLU,
            SerializedActivation::Identity => Activation::Identity,
            SerializedActivation::Softmax => Activation::Softmax,
        }
    }
}

impl SerializedModel {
    pub fn validate(&self) -> Result<()> {
        if self.format_version != MODEL_FORMAT_VERSION {
            return Err(Error::InvalidData(format!(
                "unsupported model format_version {}; expected {MODEL_FORMAT_VERSION}",
                self.format_version
            )));
        }
        if self.layers.is_empty() {
            return Err(Error::InvalidData(
                "serialized model must have at least one layer".to_owned(),
            ));
        }

        for (i, pair) in self.layers.windows(2).enumerate() {
            if pair[1].in_dim != pair[0].out_dim {
                return Err(Error::InvalidData(format!(
                    "layer {} in_dim {} does not match previous out_dim {}",
                    i + 1,
                    pair[1].in_dim,
                    pair[0].out_dim
                )));
            }
        }

        Ok(())
    }
}

impl From<&Layer> for SerializedLayer {
    fn from(layer: &Layer) -> Self {
        Self {
            in_dim: layer.in_dim(),
            out_dim: layer.out_dim(),
            activation: layer.activation().into(),
            weights: layer.weights().to_vec(),
            biases: layer.biases().to_vec(),
        }
    }
}

impl From<&TrainedModel> for SerializedModel {
    fn from(model: &TrainedModel) -> Self {
        Self {
            format_version: MODEL_FORMAT_VERSION,
            layers: model.mlp().layers().iter().map(SerializedLayer::from).collect(),
        }
    }
}

impl TryFrom<SerializedModel> for TrainedModel {
    type Error = Error;

    fn try_from(value: SerializedModel) -> Result<Self> {
        value.validate()?;

        let mut layers = Vec::with_capacity(value.layers.len());
        for (i, layer) in value.layers.into_iter().enumerate() {
            // from_parts checks shapes and finiteness.
            let l = Layer::from_parts(
                layer.in_dim,
                layer.out_dim,
                layer.activation.into(),
                layer.weights,
                layer.biases,
            )
            .map_err(|e| Error::InvalidData(format!("layer {i} invalid: {e}")))?;
            layers.push(l);
        }

        TrainedModel::from_mlp(Mlp::from_layers(layers))
    }
}

impl TrainedModel {
    pub fn to_json_string_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&SerializedModel::from(self))?)
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        let ser: SerializedModel = serde_json::from_str(s)?;
        ser.try_into()
    }

    /// Save to a pretty-printed JSON file.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let s = self.to_json_string_pretty()?;
        std::fs::write(path.as_ref(), s)?;
        log::info!("saved model to {}", path.as_ref().display());
        Ok(())
    }

    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let s = std::fs::read_to_string(path.as_ref())?;
        let model = Self::from_json_str(&s)?;
        log::info!("loaded model from {}", path.as_ref().display());
        Ok(model)
    }
}
