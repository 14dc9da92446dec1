//! Activation functions.
//!
//! A dense layer computes a pre-activation vector `z = W x + b` and then applies an
//! activation: `y = activation(z)`.
//!
//! We cache the *post-activation* outputs `y` in `Scratch`. During backprop `dL/dz`
//! is computed from `dL/dy` using `y` only, so no separate `z` buffer is needed.
//! `ReLU` and `Identity` act element-wise; `Softmax` acts on the whole vector.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Activation applied to a layer's output vector.
pub enum Activation {
    ReLU,
    Identity,
    /// Normalized exponentials; outputs are non-negative and sum to 1.
    Softmax,
}

impl Activation {
    /// Apply the activation in place: `z` becomes `y`.
    #[inline]
    pub(crate) fn forward_in_place(self, z: &mut [f32]) {
        match self {
            Activation::ReLU => {
                // NaN passes through so divergence stays visible.
                for v in z.iter_mut() {
                    if *v < 0.0 {
                        *v = 0.0;
                    }
                }
            }
            Activation::Identity => {}
            Activation::Softmax => softmax_in_place(z),
        }
    }

    /// Turn an upstream gradient `dL/dy` into `dL/dz`, writing into `d_z`.
    ///
    /// `y` is the cached post-activation output.
    #[inline]
    pub(crate) fn backward(self, y: &[f32], d_y: &[f32], d_z: &mut [f32]) {
        debug_assert_eq!(y.len(), d_y.len());
        debug_assert_eq!(y.len(), d_z.len());

        match self {
            Activation::ReLU => {
                for i in 0..y.len() {
                    d_z[i] = if y[i] > 0.0 { d_y[i] } else { 0.0 };
                }
            }
            Activation::Identity => d_z.copy_from_slice(d_y),
            Activation::Softmax => {
                // Jacobian-vector product: dz_i = y_i * (dy_i - sum_j y_j dy_j)
                let mut dot = 0.0_f32;
                for i in 0..y.len() {
                    dot = y[i].mul_add(d_y[i], dot);
                }
                for i in 0..y.len() {
                    d_z[i] = y[i] * (d_y[i] - dot);
                }
            }
        }
    }
}

/// Numerically stable softmax (shifts by the max before exponentiating).
#[inline]
pub fn softmax_in_place(xs: &mut [f32]) {
    if xs.is_empty() {
        return;
    }
    let mut max_x = xs[0];
    for &x in xs.iter().skip(1) {
        if x > max_x {
            max_x = x;
        }
    }
    let mut sum = 0.0_f32;
    for v in xs.iter_mut() {
        *v = (*v - max_x).exp();
        sum += *v;
    }
    let inv_sum = 1.0 / sum;
    for v in xs.iter_mut() {
        *v *= inv_sum;
    }
}
