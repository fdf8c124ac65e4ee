pub struct MseLoss;

impl MseLoss {
    /// Scalar MSE: mean((predicted - expected)²). Mismatched or empty inputs give 0.
    pub fn compute(predicted: &[f64], expected: &[f64]) -> f64 {
        if predicted.len() != expected.len() || predicted.is_empty() {
            return 0.0;
        }
        let n = predicted.len() as f64;
        predicted.iter().zip(expected.iter())
            .map(|(a, b)| (a - b).powi(2))
            .sum::<f64>() / n
    }

    /// Per-output gradient: (2/n)·(predicted - expected)
    pub fn gradient(predicted: &[f64], expected: &[f64]) -> Vec<f64> {
        if predicted.len() != expected.len() {
            return Vec::new();
        }
        let scale = 2.0 / predicted.len() as f64;
        predicted.iter().zip(expected.iter())
            .map(|(a, b)| scale * (a - b))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_of_squared_differences() {
        assert_eq!(MseLoss::compute(&[1.0, 3.0], &[0.0, 1.0]), 2.5);
        assert_eq!(MseLoss::gradient(&[1.0, 3.0], &[0.0, 1.0]), vec![1.0, 2.0]);
    }

    #[test]
    fn mismatched_lengths_degrade() {
        assert_eq!(MseLoss::compute(&[1.0], &[1.0, 2.0]), 0.0);
        assert!(MseLoss::gradient(&[1.0], &[]).is_empty());
    }
}
