use rand::Rng;
use rand::distributions::{Distribution, Uniform};

use crate::{Activation, Error, Result};

/// Weight initialization scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Init {
    /// Glorot/Xavier uniform: `U(-a, a)` with `a = sqrt(6 / (in + out))`.
    #[default]
    Xavier,
    /// He/Kaiming uniform: `U(-a, a)` with `a = sqrt(6 / in)`.
    He,
}

impl Init {
    #[inline]
    fn limit(self, in_dim: usize, out_dim: usize) -> f32 {
        match self {
            Init::Xavier => (6.0 / (in_dim + out_dim) as f32).sqrt(),
            Init::He => (6.0 / in_dim as f32).sqrt(),
        }
    }
}

/// A dense layer: `y = activation(W x + b)`.
#[derive(Debug, Clone)]
pub struct Layer {
    in_dim: usize,
    out_dim: usize,
    activation: Activation,
    /// Row-major matrix with shape (out_dim, in_dim).
    weights: Vec<f32>,
    biases: Vec<f32>,
}

impl Layer {
    /// Randomly initialized weights, zero biases.
    pub fn new_with_rng<R: Rng + ?Sized>(
        in_dim: usize,
        out_dim: usize,
        init: Init,
        activation: Activation,
        rng: &mut R,
    ) -> Result<Self> {
        if in_dim == 0 || out_dim == 0 {
            return Err(Error::InvalidConfig(format!(
                "layer dims must be > 0, got in_dim={in_dim} out_dim={out_dim}"
            )));
        }

        let limit = init.limit(in_dim, out_dim);
        let dist = Uniform::new_inclusive(-limit, limit);
        let weights = (0..in_dim * out_dim).map(|_| dist.sample(rng)).collect();

        Ok(Self {
            in_dim,
            out_dim,
            activation,
            weights,
            biases: vec![0.0; out_dim],
        })
    }

    /// Build a layer from explicit parameters.
    ///
    /// Validates shapes and that every parameter is finite.
    pub fn from_parts(
        in_dim: usize,
        out_dim: usize,
        activation: Activation,
        weights: Vec<f32>,
        biases: Vec<f32>,
    ) -> Result<Self> {
        if in_dim == 0 || out_dim == 0 {
            return Err(Error::InvalidData(format!(
                "layer dims must be > 0, got in_dim={in_dim} out_dim={out_dim}"
            )));
        }
        let expected_w = in_dim
            .checked_mul(out_dim)
            .ok_or_else(|| Error::InvalidData("layer weight shape overflow".to_owned()))?;
        if weights.len() != expected_w {
            return Err(Error::InvalidData(format!(
                "weights length {} does not match out_dim * in_dim ({out_dim} * {in_dim})",
                weights.len()
            )));
        }
        if biases.len() != out_dim {
            return Err(Error::InvalidData(format!(
                "biases length {} does not match out_dim {out_dim}",
                biases.len()
            )));
        }
        if weights.iter().chain(&biases).any(|v| !v.is_finite()) {
            return Err(Error::InvalidData(
                "layer parameters must be finite".to_owned(),
            ));
        }

        Ok(Self {
            in_dim,
            out_dim,
            activation,
            weights,
            biases,
        })
    }

    #[inline]
    pub fn in_dim(&self) -> usize {
        self.in_dim
    }

    #[inline]
    pub fn out_dim(&self) -> usize {
        self.out_dim
    }

    #[inline]
    pub fn activation(&self) -> Activation {
        self.activation
    }

    #[inline]
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    #[inline]
    pub fn biases(&self) -> &[f32] {
        &self.biases
    }

    #[cfg(test)]
    #[inline]
    pub(crate) fn weights_mut(&mut self) -> &mut [f32] {
        &mut self.weights
    }

    #[cfg(test)]
    #[inline]
    pub(crate) fn biases_mut(&mut self) -> &mut [f32] {
        &mut self.biases
    }

    /// Forward pass for a single sample.
    ///
    /// Shape contract:
    /// - `inputs.len() == self.in_dim`
    /// - `outputs.len() == self.out_dim`
    #[inline]
    pub fn forward(&self, inputs: &[f32], outputs: &mut [f32]) {
        debug_assert_eq!(inputs.len(), self.in_dim);
        debug_assert_eq!(outputs.len(), self.out_dim);

        for o in 0..self.out_dim {
            let mut sum = self.biases[o];
            let row = o * self.in_dim;
            for i in 0..self.in_dim {
                sum = self.weights[row + i].mul_add(inputs[i], sum);
            }
            outputs[o] = sum;
        }
        self.activation.forward_in_place(outputs);
    }

    /// Forward pass for a batch stored row-major in `inputs` (`batch * in_dim`).
    ///
    /// Writes `batch * out_dim` activations into `outputs`.
    pub(crate) fn forward_batch(&self, inputs: &[f32], batch: usize, outputs: &mut [f32]) {
        debug_assert_eq!(inputs.len(), batch * self.in_dim);
        debug_assert_eq!(outputs.len(), batch * self.out_dim);

        for row in outputs.chunks_exact_mut(self.out_dim) {
            row.copy_from_slice(&self.biases);
        }

        // outputs(batch, out) += inputs(batch, in) * W^T(in, out)
        crate::matmul::gemm_f32(
            batch,
            self.out_dim,
            self.in_dim,
            1.0,
            inputs,
            self.in_dim,
            1,
            &self.weights,
            1,
            self.in_dim,
            1.0,
            outputs,
            self.out_dim,
            1,
        );

        for row in outputs.chunks_exact_mut(self.out_dim) {
            self.activation.forward_in_place(row);
        }
    }

    /// Backward pass for a single sample.
    ///
    /// Overwrite semantics: `d_inputs`, `d_weights` and `d_biases` are overwritten.
    ///
    /// Inputs:
    /// - `inputs`: the same inputs passed to `forward`
    /// - `outputs`: the outputs previously produced by `forward` (post-activation)
    /// - `d_outputs`: upstream gradient dL/d(outputs)
    #[inline]
    pub fn backward(
        &self,
        inputs: &[f32],
        outputs: &[f32],
        d_outputs: &[f32],
        d_inputs: &mut [f32],
        d_weights: &mut [f32],
        d_biases: &mut [f32],
    ) {
        debug_assert_eq!(inputs.len(), self.in_dim);
        debug_assert_eq!(outputs.len(), self.out_dim);
        debug_assert_eq!(d_outputs.len(), self.out_dim);
        debug_assert_eq!(d_inputs.len(), self.in_dim);
        debug_assert_eq!(d_weights.len(), self.weights.len());
        debug_assert_eq!(d_biases.len(), self.out_dim);

        // For a dense layer dL/db == dL/dz.
        self.activation.backward(outputs, d_outputs, d_biases);

        d_inputs.fill(0.0);
        for o in 0..self.out_dim {
            let d_z = d_biases[o];
            let row = o * self.in_dim;
            for i in 0..self.in_dim {
                let w = self.weights[row + i];
                d_weights[row + i] = d_z * inputs[i];
                d_inputs[i] = w.mul_add(d_z, d_inputs[i]);
            }
        }
    }

    /// `param -= lr * d_param`.
    #[inline]
    pub fn sgd_step(&mut self, d_weights: &[f32], d_biases: &[f32], lr: f32) {
        debug_assert_eq!(d_weights.len(), self.weights.len());
        debug_assert_eq!(d_biases.len(), self.biases.len());

        for (w, &g) in self.weights.iter_mut().zip(d_weights) {
            *w -= lr * g;
        }
        for (b, &g) in self.biases.iter_mut().zip(d_biases) {
            *b -= lr * g;
        }
    }
}
