//! Model builder.
//!
//! `MlpBuilder` makes model structure explicit (layer sizes + activations).
//! Every layer defaults to Glorot/Xavier uniform weights and zero biases; a
//! different [`Init`] can be chosen per layer.
//!
//! [`build_classifier`] wires the fixed Iris topology from a [`ModelConfig`]:
//! `4 -> first (relu) -> second (relu) -> 3 (softmax)`.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::record::NUM_FEATURES;
use crate::species::NUM_CLASSES;
use crate::{Activation, Error, Init, Layer, Mlp, ModelConfig, Result};

#[derive(Debug, Clone, Copy)]
struct LayerSpec {
    out_dim: usize,
    activation: Activation,
    init: Init,
}

#[derive(Debug, Clone)]
/// Builder for an `Mlp`.
///
/// ```rust
/// use iris_mlp::{Activation, MlpBuilder};
///
/// # fn main() -> iris_mlp::Result<()> {
/// let mlp = MlpBuilder::new(4)?
///     .add_layer(8, Activation::ReLU)?
///     .add_layer(3, Activation::Softmax)?
///     .build_with_seed(0)?;
/// assert_eq!(mlp.output_dim(), 3);
/// # Ok(())
/// # }
/// ```
pub struct MlpBuilder {
    input_dim: usize,
    layers: Vec<LayerSpec>,
}

impl MlpBuilder {
    /// Start building an MLP that accepts inputs of length `input_dim`.
    pub fn new(input_dim: usize) -> Result<Self> {
        if input_dim == 0 {
            return Err(Error::InvalidConfig("input_dim must be > 0".to_owned()));
        }
        Ok(Self {
            input_dim,
            layers: Vec::new(),
        })
    }

    /// Add a dense layer with Xavier-initialized weights.
    pub fn add_layer(self, out_dim: usize, activation: Activation) -> Result<Self> {
        self.add_layer_with_init(out_dim, activation, Init::Xavier)
    }

    /// Add a dense layer with an explicit initializer.
    pub fn add_layer_with_init(
        mut self,
        out_dim: usize,
        activation: Activation,
        init: Init,
    ) -> Result<Self> {
        if out_dim == 0 {
            return Err(Error::InvalidConfig("layer out_dim must be > 0".to_owned()));
        }
        self.layers.push(LayerSpec {
            out_dim,
            activation,
            init,
        });
        Ok(self)
    }

    /// Build using a deterministic seed.
    pub fn build_with_seed(self, seed: u64) -> Result<Mlp> {
        let mut rng = StdRng::seed_from_u64(seed);
        self.build_with_rng(&mut rng)
    }

    /// Build using the provided RNG.
    pub fn build_with_rng<R: Rng + ?Sized>(self, rng: &mut R) -> Result<Mlp> {
        if self.layers.is_empty() {
            return Err(Error::InvalidConfig(
                "mlp must have at least one layer".to_owned(),
            ));
        }

        let mut layers = Vec::with_capacity(self.layers.len());
        let mut in_dim = self.input_dim;
        for spec in self.layers {
            layers.push(Layer::new_with_rng(
                in_dim,
                spec.out_dim,
                spec.init,
                spec.activation,
                rng,
            )?);
            in_dim = spec.out_dim;
        }

        Ok(Mlp::from_layers(layers))
    }
}

/// Construct the untrained Iris classifier described by `config`.
///
/// The config is validated before any weight buffer is allocated.
pub fn build_classifier(config: &ModelConfig, seed: u64) -> Result<Mlp> {
    config.validate()?;

    MlpBuilder::new(NUM_FEATURES)?
        .add_layer(config.first_layer_units, Activation::ReLU)?
        .add_layer(config.second_layer_units, Activation::ReLU)?
        .add_layer(NUM_CLASSES, Activation::Softmax)?
        .build_with_seed(seed)
}
