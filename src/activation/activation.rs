use serde::{Serialize, Deserialize};
use std::f64::consts::E;

/// Activation applied by a neuron to the weighted sum of its inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ActivationKind {
    #[default]
    Linear,
    #[serde(rename = "relu")]
    ReLU,
    Sigmoid,
}

impl ActivationKind {
    /// Element-wise activation.
    pub fn function(&self, x: f64) -> f64 {
        match self {
            ActivationKind::Linear => x,
            ActivationKind::ReLU => if x > 0.0 { x } else { 0.0 },
            ActivationKind::Sigmoid => 1.0 / (1.0 + E.powf(-x)),
        }
    }

    /// Derivative expressed in terms of the already-computed forward output
    /// `y = function(x)`, so the backward pass never needs the pre-activation.
    pub fn derivative_from_output(&self, y: f64) -> f64 {
        match self {
            ActivationKind::Linear => 1.0,
            ActivationKind::ReLU => if y > 0.0 { 1.0 } else { 0.0 },
            ActivationKind::Sigmoid => y * (1.0 - y),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relu_clamps_negative_inputs() {
        assert_eq!(ActivationKind::ReLU.function(-3.0), 0.0);
        assert_eq!(ActivationKind::ReLU.function(2.5), 2.5);
        assert_eq!(ActivationKind::ReLU.derivative_from_output(0.0), 0.0);
        assert_eq!(ActivationKind::ReLU.derivative_from_output(2.5), 1.0);
    }

    #[test]
    fn sigmoid_derivative_uses_output() {
        let y = ActivationKind::Sigmoid.function(0.0);
        assert!((y - 0.5).abs() < 1e-12);
        assert!((ActivationKind::Sigmoid.derivative_from_output(y) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn parses_lowercase_names() {
        let kinds: Vec<ActivationKind> =
            serde_json::from_str(r#"["linear", "relu", "sigmoid"]"#).unwrap();
        assert_eq!(kinds, vec![ActivationKind::Linear, ActivationKind::ReLU, ActivationKind::Sigmoid]);
    }
}
