use crate::record::NUM_FEATURES;
use crate::species::NUM_CLASSES;
use crate::{Activation, Error, Mlp, Result};

/// A classifier that finished training.
///
/// Only the trainer (on success) and the model-file loader create one. It is
/// read-only afterwards, so it can be shared across threads for prediction.
#[derive(Debug, Clone)]
pub struct TrainedModel {
    mlp: Mlp,
}

impl TrainedModel {
    /// Wrap a network that maps 4 features to 3 softmax probabilities.
    pub(crate) fn from_mlp(mlp: Mlp) -> Result<Self> {
        if mlp.input_dim() != NUM_FEATURES {
            return Err(Error::InvalidData(format!(
                "classifier input_dim must be {NUM_FEATURES}, got {}",
                mlp.input_dim()
            )));
        }
        if mlp.output_dim() != NUM_CLASSES {
            return Err(Error::InvalidData(format!(
                "classifier output_dim must be {NUM_CLASSES}, got {}",
                mlp.output_dim()
            )));
        }
        let last = mlp.layers()[mlp.num_layers() - 1].activation();
        if last != Activation::Softmax {
            return Err(Error::InvalidData(format!(
                "classifier output activation must be softmax, got {last:?}"
            )));
        }
        Ok(Self { mlp })
    }

    #[inline]
    pub fn mlp(&self) -> &Mlp {
        &self.mlp
    }

    /// `(first_layer_units, second_layer_units)` when the model has the
    /// standard three-layer shape.
    pub fn hidden_units(&self) -> Option<(usize, usize)> {
        match self.mlp.layers() {
            [a, b, _] => Some((a.out_dim(), b.out_dim())),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MlpBuilder, ModelConfig, build_classifier};

    #[test]
    fn accepts_the_classifier_topology() {
        let mlp = build_classifier(&ModelConfig::default(), 0).unwrap();
        let model = TrainedModel::from_mlp(mlp).unwrap();
        assert_eq!(model.hidden_units(), Some((8, 10)));
    }

    #[test]
    fn rejects_other_shapes() {
        let wrong_input = MlpBuilder::new(3)
            .unwrap()
            .add_layer(3, Activation::Softmax)
            .unwrap()
            .build_with_seed(0)
            .unwrap();
        assert!(TrainedModel::from_mlp(wrong_input).is_err());

        let no_softmax = MlpBuilder::new(4)
            .unwrap()
            .add_layer(3, Activation::Identity)
            .unwrap()
            .build_with_seed(0)
            .unwrap();
        assert!(TrainedModel::from_mlp(no_softmax).is_err());
    }
}
