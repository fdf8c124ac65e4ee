use serde::{Serialize, Deserialize};

use crate::compile::ExecutionModel;
use crate::errors::GraphError;

/// One training example: values for the input neurons and targets for the
/// output neurons, both in role order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub input: Vec<f64>,
    pub target: Vec<f64>,
}

impl Sample {
    pub fn new(input: Vec<f64>, target: Vec<f64>) -> Sample {
        Sample { input, target }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub samples: Vec<Sample>,
}

impl Dataset {
    pub fn new(samples: Vec<Sample>) -> Dataset {
        Dataset { samples }
    }

    /// Pairs `inputs[i]` with `targets[i]`; surplus rows on either side are dropped.
    pub fn from_pairs(inputs: &[Vec<f64>], targets: &[Vec<f64>]) -> Dataset {
        let samples = inputs.iter().zip(targets.iter())
            .map(|(i, t)| Sample::new(i.clone(), t.clone()))
            .collect();
        Dataset { samples }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Every sample must match the model's input and output counts exactly.
    pub fn check_dimensions(&self, model: &ExecutionModel) -> Result<(), GraphError> {
        for sample in &self.samples {
            if sample.input.len() != model.input_count() {
                return Err(GraphError::DimensionMismatch {
                    expected: model.input_count(),
                    actual: sample.input.len(),
                });
            }
            if sample.target.len() != model.output_count() {
                return Err(GraphError::DimensionMismatch {
                    expected: model.output_count(),
                    actual: sample.target.len(),
                });
            }
        }
        Ok(())
    }
}
