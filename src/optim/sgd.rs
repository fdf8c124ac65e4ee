use crate::compile::ExecutionModel;

/// Plain gradient descent with optional per-gradient clipping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sgd {
    pub learning_rate: f64,
    /// Gradients are clamped into [-bound, +bound] when this is finite.
    pub max_grad_norm: Option<f64>,
}

impl Sgd {
    pub fn new(learning_rate: f64) -> Sgd {
        Sgd { learning_rate, max_grad_norm: None }
    }

    pub fn with_clipping(learning_rate: f64, max_grad_norm: f64) -> Sgd {
        Sgd { learning_rate, max_grad_norm: Some(max_grad_norm) }
    }

    /// `weight += -(learning_rate / batch_size) · gradient` for every weight.
    /// Does not clear gradients; a batch size of 0 is treated as 1.
    pub fn step(&self, weights: &mut [f64], gradients: &[f64], batch_size: usize) {
        let scale = -self.learning_rate / batch_size.max(1) as f64;
        let bound = self.max_grad_norm.filter(|b| b.is_finite()).map(f64::abs);
        for (w, &g) in weights.iter_mut().zip(gradients.iter()) {
            let g = match bound {
                Some(b) => g.clamp(-b, b),
                None => g,
            };
            *w += scale * g;
        }
    }

    /// Applies one update to the model's weights from its accumulated gradients.
    pub fn apply(&self, model: &mut ExecutionModel, batch_size: usize) {
        self.step(&mut model.weights, &model.weight_gradients, batch_size);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_scales_by_batch_size() {
        let mut weights = vec![1.0, -1.0];
        Sgd::new(0.5).step(&mut weights, &[2.0, -4.0], 2);
        assert_eq!(weights, vec![0.5, 0.0]);
    }

    #[test]
    fn clipping_bounds_each_gradient() {
        let mut weights = vec![0.0, 0.0];
        Sgd::with_clipping(1.0, 0.5).step(&mut weights, &[10.0, -0.25], 1);
        assert_eq!(weights, vec![-0.5, 0.25]);
    }

    #[test]
    fn infinite_bound_disables_clipping() {
        let mut weights = vec![0.0];
        Sgd::with_clipping(1.0, f64::INFINITY).step(&mut weights, &[3.0], 0);
        assert_eq!(weights, vec![-3.0]);
    }
}
