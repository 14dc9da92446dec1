//! Categorical cross-entropy on softmax probabilities.
//!
//! Used like:
//!
//! - run `model.forward(...)` (final layer is `Softmax`)
//! - compute `d_output` via [`categorical_cross_entropy_backward`]
//! - run `model.backward(...)`
//! - update parameters with an optimizer
//!
//! Probabilities are clamped to `[PROB_EPSILON, 1 - PROB_EPSILON]` before the log.

/// Lower bound applied to probabilities before taking their log.
pub const PROB_EPSILON: f32 = 1e-7;

#[inline]
fn clamp_prob(p: f32) -> f32 {
    p.clamp(PROB_EPSILON, 1.0 - PROB_EPSILON)
}

/// `-sum_i target_i * ln(p_i)` for a single sample.
///
/// Shape contract: `probs.len() == target.len()`.
#[inline]
pub fn categorical_cross_entropy(probs: &[f32], target: &[f32]) -> f32 {
    assert_eq!(
        probs.len(),
        target.len(),
        "pred len {} does not match target len {}",
        probs.len(),
        target.len()
    );

    let mut loss = 0.0_f32;
    for i in 0..probs.len() {
        let t = target[i];
        if t != 0.0 {
            loss -= t * clamp_prob(probs[i]).ln();
        }
    }
    loss
}

/// Cross-entropy loss + gradient w.r.t. the probabilities.
///
/// Writes `d_probs[i] = -target[i] / p_i` (with `p_i` clamped) and returns the loss.
#[inline]
pub fn categorical_cross_entropy_backward(
    probs: &[f32],
    target: &[f32],
    d_probs: &mut [f32],
) -> f32 {
    assert_eq!(
        probs.len(),
        target.len(),
        "pred len {} does not match target len {}",
        probs.len(),
        target.len()
    );
    assert_eq!(
        probs.len(),
        d_probs.len(),
        "pred len {} does not match d_pred len {}",
        probs.len(),
        d_probs.len()
    );

    let mut loss = 0.0_f32;
    for i in 0..probs.len() {
        let t = target[i];
        let p = clamp_prob(probs[i]);
        if t != 0.0 {
            loss -= t * p.ln();
        }
        d_probs[i] = -t / p;
    }
    loss
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_prediction_has_near_zero_loss() {
        let loss = categorical_cross_entropy(&[1.0, 0.0, 0.0], &[1.0, 0.0, 0.0]);
        assert!(loss >= 0.0 && loss < 1e-6);
    }

    #[test]
    fn uniform_prediction_costs_ln_k() {
        let p = [1.0 / 3.0; 3];
        let loss = categorical_cross_entropy(&p, &[0.0, 1.0, 0.0]);
        assert!((loss - 3.0_f32.ln()).abs() < 1e-5);
    }

    #[test]
    fn zero_probability_is_clamped_to_a_finite_loss() {
        let mut d = [0.0_f32; 3];
        let loss = categorical_cross_entropy_backward(&[0.0, 1.0, 0.0], &[1.0, 0.0, 0.0], &mut d);
        assert!(loss.is_finite());
        assert!((loss - (-PROB_EPSILON.ln())).abs() < 1e-3);
        assert!(d.iter().all(|v| v.is_finite()));
        assert_eq!(d[1], 0.0);
    }

    #[test]
    fn backward_matches_forward_loss() {
        let p = [0.2_f32, 0.7, 0.1];
        let t = [0.0_f32, 1.0, 0.0];
        let mut d = [0.0_f32; 3];
        let loss = categorical_cross_entropy_backward(&p, &t, &mut d);
        assert_eq!(loss, categorical_cross_entropy(&p, &t));
        assert!((d[1] - (-1.0 / 0.7)).abs() < 1e-6);
    }

    #[test]
    fn confident_correct_prediction_is_cheaper() {
        let t = [1.0_f32, 0.0, 0.0];
        let good = categorical_cross_entropy(&[0.9, 0.05, 0.05], &t);
        let bad = categorical_cross_entropy(&[0.05, 0.05, 0.9], &t);
        assert!(good < bad);
    }
}
