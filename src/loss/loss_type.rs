use serde::{Serialize, Deserialize};

use crate::loss::{BceLoss, MseLoss};

/// Selects which loss function the training loop uses.
///
/// - `Mse`                — Mean-squared error; pair with Linear or Sigmoid output.
/// - `BinaryCrossEntropy` — Binary cross-entropy; pair with Sigmoid output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LossType {
    #[default]
    Mse,
    BinaryCrossEntropy,
}

impl LossType {
    /// Scalar loss for one sample.
    pub fn compute(&self, predicted: &[f64], expected: &[f64]) -> f64 {
        match self {
            LossType::Mse                => MseLoss::compute(predicted, expected),
            LossType::BinaryCrossEntropy => BceLoss::compute(predicted, expected),
        }
    }

    /// Gradient of the loss w.r.t. each prediction.
    pub fn gradient(&self, predicted: &[f64], expected: &[f64]) -> Vec<f64> {
        match self {
            LossType::Mse                => MseLoss::gradient(predicted, expected),
            LossType::BinaryCrossEntropy => BceLoss::gradient(predicted, expected),
        }
    }
}
