use crate::Layer;

/// A dense feed-forward network: an ordered stack of [`Layer`]s.
///
/// Consecutive layers always chain (`layers[i].out_dim() == layers[i + 1].in_dim()`);
/// the builder and the model-file loader are the only constructors.
#[derive(Debug, Clone)]
pub struct Mlp {
    layers: Vec<Layer>,
}

/// Reusable buffers for `Mlp::forward`.
///
/// The output of the most recent forward pass lives inside `Scratch`.
#[derive(Debug, Clone)]
pub struct Scratch {
    layer_outputs: Vec<Vec<f32>>,
}

/// Reusable buffers for `Mlp::forward_batch`, sized for a fixed batch length.
#[derive(Debug, Clone)]
pub struct BatchScratch {
    batch: usize,
    layer_outputs: Vec<Vec<f32>>,
}

/// Parameter gradients for an `Mlp`.
///
/// `Mlp::backward` overwrites them; `accumulate` sums per-sample gradients into
/// a mini-batch gradient.
#[derive(Debug, Clone)]
pub struct Gradients {
    d_weights: Vec<Vec<f32>>,
    d_biases: Vec<Vec<f32>>,

    // Gradient w.r.t each layer output, including the final one.
    d_layer_outputs: Vec<Vec<f32>>,

    d_input: Vec<f32>,
}

impl Mlp {
    pub(crate) fn from_layers(layers: Vec<Layer>) -> Self {
        debug_assert!(!layers.is_empty());
        debug_assert!(layers.windows(2).all(|w| w[0].out_dim() == w[1].in_dim()));
        Self { layers }
    }

    #[inline]
    pub fn input_dim(&self) -> usize {
        self.layers[0].in_dim()
    }

    #[inline]
    pub fn output_dim(&self) -> usize {
        self.layers[self.layers.len() - 1].out_dim()
    }

    #[inline]
    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    #[inline]
    pub fn layer(&self, idx: usize) -> Option<&Layer> {
        self.layers.get(idx)
    }

    #[cfg(test)]
    #[inline]
    pub(crate) fn layer_mut(&mut self, idx: usize) -> Option<&mut Layer> {
        self.layers.get_mut(idx)
    }

    #[inline]
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn scratch(&self) -> Scratch {
        Scratch::new(self)
    }

    pub fn batch_scratch(&self, batch: usize) -> BatchScratch {
        BatchScratch::new(self, batch)
    }

    pub fn gradients(&self) -> Gradients {
        Gradients::new(self)
    }

    /// Forward pass for a single sample.
    ///
    /// Writes intermediate activations into `scratch` and returns the final output slice.
    ///
    /// Shape contract (panics on violation):
    /// - `input.len() == self.input_dim()`
    /// - `scratch` must be built for this `Mlp`
    pub fn forward<'a>(&self, input: &[f32], scratch: &'a mut Scratch) -> &'a [f32] {
        assert_eq!(
            input.len(),
            self.input_dim(),
            "input len {} does not match model input_dim {}",
            input.len(),
            self.input_dim()
        );
        assert_eq!(
            scratch.layer_outputs.len(),
            self.layers.len(),
            "scratch has {} layer outputs, model has {} layers",
            scratch.layer_outputs.len(),
            self.layers.len()
        );

        for (idx, layer) in self.layers.iter().enumerate() {
            if idx == 0 {
                layer.forward(input, &mut scratch.layer_outputs[0]);
            } else {
                // Borrow the previous output immutably and the current output mutably.
                let (left, right) = scratch.layer_outputs.split_at_mut(idx);
                layer.forward(&left[idx - 1], &mut right[0]);
            }
        }

        scratch.output()
    }

    /// Forward pass for the batch length `scratch` was built with, samples stored row-major in `inputs`.
    ///
    /// Returns the `(batch, output_dim)` outputs as a flat slice.
    pub fn forward_batch<'a>(&self, inputs: &[f32], scratch: &'a mut BatchScratch) -> &'a [f32] {
        let batch = scratch.batch;
        assert_eq!(
            inputs.len(),
            batch * self.input_dim(),
            "inputs len {} does not match batch * input_dim ({batch} * {})",
            inputs.len(),
            self.input_dim()
        );
        assert_eq!(
            scratch.layer_outputs.len(),
            self.layers.len(),
            "batch scratch has {} layer outputs, model has {} layers",
            scratch.layer_outputs.len(),
            self.layers.len()
        );

        for (idx, layer) in self.layers.iter().enumerate() {
            if idx == 0 {
                layer.forward_batch(inputs, batch, &mut scratch.layer_outputs[0]);
            } else {
                let (left, right) = scratch.layer_outputs.split_at_mut(idx);
                layer.forward_batch(&left[idx - 1], batch, &mut right[0]);
            }
        }

        scratch.output()
    }

    /// Backward pass for a single sample.
    ///
    /// Call `forward` first with the same `input` and `scratch`, then write the
    /// upstream gradient `dL/d(output)` into `grads.d_output_mut()`.
    ///
    /// `grads` is overwritten with the gradients for this sample. Returns dL/d(input).
    pub fn backward<'a>(
        &self,
        input: &[f32],
        scratch: &Scratch,
        grads: &'a mut Gradients,
    ) -> &'a [f32] {
        assert_eq!(
            input.len(),
            self.input_dim(),
            "input len {} does not match model input_dim {}",
            input.len(),
            self.input_dim()
        );
        assert_eq!(
            grads.d_weights.len(),
            self.layers.len(),
            "grads has {} layers, model has {} layers",
            grads.d_weights.len(),
            self.layers.len()
        );

        for idx in (0..self.layers.len()).rev() {
            let layer = &self.layers[idx];

            let layer_input: &[f32] = if idx == 0 {
                input
            } else {
                &scratch.layer_outputs[idx - 1]
            };
            let layer_output: &[f32] = &scratch.layer_outputs[idx];

            if idx == 0 {
                layer.backward(
                    layer_input,
                    layer_output,
                    &grads.d_layer_outputs[0],
                    &mut grads.d_input,
                    &mut grads.d_weights[0],
                    &mut grads.d_biases[0],
                );
            } else {
                // `d_inputs` of this layer is `d_outputs` of the previous one.
                let (left, right) = grads.d_layer_outputs.split_at_mut(idx);
                layer.backward(
                    layer_input,
                    layer_output,
                    &right[0],
                    &mut left[idx - 1],
                    &mut grads.d_weights[idx],
                    &mut grads.d_biases[idx],
                );
            }
        }

        &grads.d_input
    }

    /// Applies `param -= lr * step` to all layers.
    #[inline]
    pub fn sgd_step(&mut self, step: &Gradients, lr: f32) {
        debug_assert_eq!(self.layers.len(), step.d_weights.len());
        for (i, layer) in self.layers.iter_mut().enumerate() {
            layer.sgd_step(&step.d_weights[i], &step.d_biases[i], lr);
        }
    }
}

impl Scratch {
    pub fn new(mlp: &Mlp) -> Self {
        let layer_outputs = mlp.layers.iter().map(|l| vec![0.0; l.out_dim()]).collect();
        Self { layer_outputs }
    }

    #[inline]
    pub fn output(&self) -> &[f32] {
        &self.layer_outputs[self.layer_outputs.len() - 1]
    }
}

impl BatchScratch {
    pub fn new(mlp: &Mlp, batch: usize) -> Self {
        assert!(batch > 0, "batch must be > 0");
        let layer_outputs = mlp
            .layers
            .iter()
            .map(|l| vec![0.0; batch * l.out_dim()])
            .collect();
        Self {
            batch,
            layer_outputs,
        }
    }

    #[inline]
    pub fn output(&self) -> &[f32] {
        &self.layer_outputs[self.layer_outputs.len() - 1]
    }
}

impl Gradients {
    pub fn new(mlp: &Mlp) -> Self {
        let n = mlp.layers.len();
        let mut d_weights = Vec::with_capacity(n);
        let mut d_biases = Vec::with_capacity(n);
        let mut d_layer_outputs = Vec::with_capacity(n);

        for layer in &mlp.layers {
            d_weights.push(vec![0.0; layer.in_dim() * layer.out_dim()]);
            d_biases.push(vec![0.0; layer.out_dim()]);
            d_layer_outputs.push(vec![0.0; layer.out_dim()]);
        }

        Self {
            d_weights,
            d_biases,
            d_layer_outputs,
            d_input: vec![0.0; mlp.input_dim()],
        }
    }

    /// Upstream gradient buffer for the final model output.
    #[inline]
    pub fn d_output_mut(&mut self) -> &mut [f32] {
        let last = self.d_layer_outputs.len() - 1;
        &mut self.d_layer_outputs[last]
    }

    #[inline]
    pub fn num_layers(&self) -> usize {
        self.d_weights.len()
    }

    #[inline]
    pub fn d_weights(&self, layer_idx: usize) -> &[f32] {
        &self.d_weights[layer_idx]
    }

    #[inline]
    pub fn d_biases(&self, layer_idx: usize) -> &[f32] {
        &self.d_biases[layer_idx]
    }

    #[inline]
    pub fn d_weights_mut(&mut self, layer_idx: usize) -> &mut [f32] {
        &mut self.d_weights[layer_idx]
    }

    #[inline]
    pub fn d_biases_mut(&mut self, layer_idx: usize) -> &mut [f32] {
        &mut self.d_biases[layer_idx]
    }

    /// Zero all parameter gradients.
    pub fn zero(&mut self) {
        for v in self.d_weights.iter_mut().chain(self.d_biases.iter_mut()) {
            v.fill(0.0);
        }
    }

    /// `self += scale * other` over all parameter gradients.
    pub fn accumulate(&mut self, other: &Gradients, scale: f32) {
        debug_assert_eq!(self.d_weights.len(), other.d_weights.len());
        for (dst, src) in self.d_weights.iter_mut().zip(&other.d_weights) {
            for (d, &s) in dst.iter_mut().zip(src) {
                *d = s.mul_add(scale, *d);
            }
        }
        for (dst, src) in self.d_biases.iter_mut().zip(&other.d_biases) {
            for (d, &s) in dst.iter_mut().zip(src) {
                *d = s.mul_add(scale, *d);
            }
        }
    }
}
