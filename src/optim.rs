//! Adam optimizer.
//!
//! Optimizer *state* (first/second moments) lives outside the model; the
//! training loop owns it and reuses it across steps. No allocation per step.

use crate::{Error, Gradients, Mlp, Result};

#[derive(Debug, Clone, Copy, PartialEq)]
/// Adam hyperparameters (bias-corrected).
pub struct Adam {
    pub beta1: f32,
    pub beta2: f32,
    pub eps: f32,
}

impl Default for Adam {
    fn default() -> Self {
        Self {
            beta1: 0.9,
            beta2: 0.999,
            eps: 1e-7,
        }
    }
}

impl Adam {
    pub fn validate(self) -> Result<()> {
        let Adam { beta1, beta2, eps } = self;
        if !(beta1.is_finite() && (0.0..1.0).contains(&beta1)) {
            return Err(Error::InvalidConfig(format!(
                "adam beta1 must be finite and in [0,1), got {beta1}"
            )));
        }
        if !(beta2.is_finite() && (0.0..1.0).contains(&beta2)) {
            return Err(Error::InvalidConfig(format!(
                "adam beta2 must be finite and in [0,1), got {beta2}"
            )));
        }
        if !(eps.is_finite() && eps > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "adam eps must be finite and > 0, got {eps}"
            )));
        }
        Ok(())
    }

    /// Allocate zeroed moment buffers for `model`.
    pub fn state(self, model: &Mlp) -> Result<AdamState> {
        self.validate()?;
        let (m_weights, m_biases) = zeros_like_params(model);
        let (v_weights, v_biases) = zeros_like_params(model);
        Ok(AdamState {
            cfg: self,
            t: 0,
            beta1_pow: 1.0,
            beta2_pow: 1.0,
            m_weights,
            m_biases,
            v_weights,
            v_biases,
        })
    }
}

#[derive(Debug, Clone)]
/// Owned Adam state for one model.
pub struct AdamState {
    cfg: Adam,
    t: u64,
    beta1_pow: f32,
    beta2_pow: f32,
    m_weights: Vec<Vec<f32>>,
    m_biases: Vec<Vec<f32>>,
    v_weights: Vec<Vec<f32>>,
    v_biases: Vec<Vec<f32>>,
}

impl AdamState {
    /// Number of steps taken so far.
    #[inline]
    pub fn steps(&self) -> u64 {
        self.t
    }

    /// Apply one optimizer step.
    ///
    /// `grads` is overwritten with the Adam update direction, which is then
    /// applied with `model.sgd_step`.
    pub fn step(&mut self, model: &mut Mlp, grads: &mut Gradients, lr: f32) {
        assert!(lr.is_finite() && lr > 0.0, "lr must be finite and > 0");
        debug_assert_eq!(grads.num_layers(), model.num_layers());

        let Adam { beta1, beta2, eps } = self.cfg;
        self.t += 1;
        self.beta1_pow *= beta1;
        self.beta2_pow *= beta2;

        let corr1 = 1.0 - self.beta1_pow;
        let corr2 = 1.0 - self.beta2_pow;

        let update = |m: &mut [f32], v: &mut [f32], g: &mut [f32]| {
            debug_assert_eq!(m.len(), g.len());
            debug_assert_eq!(v.len(), g.len());
            for i in 0..g.len() {
                let gi = g[i];
                m[i] = beta1 * m[i] + (1.0 - beta1) * gi;
                v[i] = beta2 * v[i] + (1.0 - beta2) * (gi * gi);

                let m_hat = m[i] / corr1;
                let v_hat = v[i] / corr2;
                g[i] = m_hat / (v_hat.sqrt() + eps);
            }
        };

        for layer_idx in 0..model.num_layers() {
            update(
                &mut self.m_weights[layer_idx][..],
                &mut self.v_weights[layer_idx][..],
                grads.d_weights_mut(layer_idx),
            );
            update(
                &mut self.m_biases[layer_idx][..],
                &mut self.v_biases[layer_idx][..],
                grads.d_biases_mut(layer_idx),
            );
        }

        model.sgd_step(grads, lr);
    }
}

fn zeros_like_params(model: &Mlp) -> (Vec<Vec<f32>>, Vec<Vec<f32>>) {
    let ws = model.layers().iter().map(|l| vec![0.0; l.weights().len()]).collect();
    let bs = model.layers().iter().map(|l| vec![0.0; l.out_dim()]).collect();
    (ws, bs)
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::{Activation, MlpBuilder};

    fn unit_model() -> Mlp {
        let mut mlp = MlpBuilder::new(1)
            .unwrap()
            .add_layer(1, Activation::Identity)
            .unwrap()
            .build_with_seed(0)
            .unwrap();
        let layer = mlp.layer_mut(0).unwrap();
        layer.weights_mut()[0] = 1.0;
        layer.biases_mut()[0] = 1.0;
        mlp
    }

    #[test]
    fn validation_rejects_bad_hyperparams() {
        let base = Adam::default();
        assert!(base.validate().is_ok());
        assert!(Adam { beta1: 1.0, ..base }.validate().is_err());
        assert!(Adam { beta2: 1.0, ..base }.validate().is_err());
        assert!(Adam { eps: 0.0, ..base }.validate().is_err());
        assert!(Adam { beta1: f32::NAN, ..base }.validate().is_err());
    }

    #[test]
    fn first_step_matches_expected_direction_for_unit_grad() {
        let mut mlp = unit_model();
        let mut grads = mlp.gradients();
        grads.d_weights_mut(0)[0] = 1.0;
        grads.d_biases_mut(0)[0] = 1.0;

        let mut opt = Adam {
            beta1: 0.9,
            beta2: 0.999,
            eps: 1.0,
        }
        .state(&mlp)
        .unwrap();
        opt.step(&mut mlp, &mut grads, 0.1);
        assert_eq!(opt.steps(), 1);

        // With eps=1.0 and unit grad, the first bias-corrected step is 1/(1+eps) = 0.5.
        let layer = mlp.layer(0).unwrap();
        assert!((layer.weights()[0] - (1.0 - 0.1 * 0.5)).abs() < 1e-6);
        assert!((layer.biases()[0] - (1.0 - 0.1 * 0.5)).abs() < 1e-6);
    }

    #[test]
    fn step_size_is_roughly_lr_regardless_of_grad_scale() {
        for g in [1e-3_f32, 1.0, 1e3] {
            let mut mlp = unit_model();
            let mut grads = mlp.gradients();
            grads.d_weights_mut(0)[0] = g;

            let mut opt = Adam::default().state(&mlp).unwrap();
            opt.step(&mut mlp, &mut grads, 0.01);

            let w = mlp.layer(0).unwrap().weights()[0];
            assert!((w - 0.99).abs() < 1e-4, "g={g} w={w}");
        }
    }
}
