use std::collections::BTreeMap;

use serde::{Serialize, Deserialize};

use crate::compile::ExecutionModel;
use crate::graph::Labels;

/// Which half of a sample update the snapshot was taken after.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Forward,
    Backward,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParamState {
    pub value: f64,
    pub gradient: f64,
}

/// Training progress projected back onto the caller's node and connection ids.
///
/// Epoch-mode runs send one record per reported epoch through
/// `TrainConfig::progress_tx`; step mode returns one per step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressRecord {
    /// 1-based epoch number (the pass the sample belonged to, in step mode).
    pub epoch: usize,
    /// 1-based step count; only set in step mode.
    pub step: Option<usize>,
    /// Total epochs requested; only set in epoch mode.
    pub total_epochs: Option<usize>,
    /// Mean epoch loss in epoch mode, single-sample loss in step mode.
    pub loss: f64,
    pub phase: Phase,
    /// Keyed by connection id.
    pub weights: BTreeMap<String, ParamState>,
    /// Keyed by node id.
    pub neurons: BTreeMap<String, ParamState>,
    pub elapsed_ms: u64,
}

impl ProgressRecord {
    /// Snapshots the model's current values and gradients. Counters and loss
    /// are left zeroed for the caller to fill in.
    pub fn capture(model: &ExecutionModel, labels: &IndexLabels, phase: Phase) -> ProgressRecord {
        let weights = labels.weights.iter().enumerate()
            .map(|(i, name)| (name.clone(), ParamState { value: model.weights[i], gradient: model.weight_gradients[i] }))
            .collect();
        let neurons = labels.neurons.iter().enumerate()
            .map(|(i, name)| (name.clone(), ParamState { value: model.values[i], gradient: model.gradients[i] }))
            .collect();
        ProgressRecord {
            epoch: 0,
            step: None,
            total_epochs: None,
            loss: 0.0,
            phase,
            weights,
            neurons,
            elapsed_ms: 0,
        }
    }
}

/// Caller ids for every dense index of one compiled model.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexLabels {
    pub neurons: Vec<String>,
    pub weights: Vec<String>,
}

impl IndexLabels {
    pub fn new(model: &ExecutionModel, labels: &Labels) -> IndexLabels {
        IndexLabels {
            neurons: model.neuron_ids.iter().map(|id| labels.neuron(*id)).collect(),
            weights: model.weight_ids.iter().map(|id| labels.weight(*id)).collect(),
        }
    }
}
