//! Structural errors describing a network the engine cannot execute.

use thiserror::Error;

use crate::graph::handle::{NeuronId, WeightId};

/// Errors raised synchronously while building, validating or compiling a graph.
///
/// None of these leave the graph partially mutated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("Graph contains a cycle")]
    CycleDetected,

    #[error("Neuron {neuron} is not reachable from any input or bias neuron")]
    DisconnectedGraph { neuron: NeuronId },

    #[error("Input and output neurons must both be set")]
    InputOutputNotSet,

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Unknown neuron: {0}")]
    UnknownNeuron(NeuronId),

    #[error("Unknown weight: {0}")]
    UnknownWeight(WeightId),

    #[error("Connection references unknown node '{0}'")]
    UnknownNode(String),

    #[error("Duplicate id '{0}'")]
    DuplicateId(String),
}
