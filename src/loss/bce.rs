pub struct BceLoss;

/// Probabilities are clamped into [EPS, 1 - EPS] before any log or division.
const EPS: f64 = 1e-7;

fn clamp(p: f64) -> f64 {
    p.clamp(EPS, 1.0 - EPS)
}

impl BceLoss {
    /// Scalar BCE: -mean(y·ln p + (1-y)·ln(1-p))
    pub fn compute(predicted: &[f64], expected: &[f64]) -> f64 {
        if predicted.len() != expected.len() || predicted.is_empty() {
            return 0.0;
        }
        let n = predicted.len() as f64;
        predicted.iter().zip(expected.iter())
            .map(|(p, y)| {
                let p = clamp(*p);
                -(y * p.ln() + (1.0 - y) * (1.0 - p).ln())
            })
            .sum::<f64>() / n
    }

    /// Per-output gradient: (p - y) / (p · (1 - p))
    pub fn gradient(predicted: &[f64], expected: &[f64]) -> Vec<f64> {
        if predicted.len() != expected.len() {
            return Vec::new();
        }
        predicted.iter().zip(expected.iter())
            .map(|(p, y)| {
                let p = clamp(*p);
                (p - y) / (p * (1.0 - p))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saturated_predictions_stay_finite() {
        let loss = BceLoss::compute(&[0.0, 1.0], &[1.0, 0.0]);
        assert!(loss.is_finite());
        assert!(loss > 10.0);
        assert!(BceLoss::gradient(&[0.0, 1.0], &[1.0, 0.0]).iter().all(|g| g.is_finite()));
    }

    #[test]
    fn half_probability_loss_is_ln2() {
        let loss = BceLoss::compute(&[0.5], &[1.0]);
        assert!((loss - std::f64::consts::LN_2).abs() < 1e-12);
        assert!((BceLoss::gradient(&[0.5], &[1.0])[0] + 2.0).abs() < 1e-12);
    }
}
