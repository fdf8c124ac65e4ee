use crate::activation::ActivationKind;
use crate::graph::{NeuronId, WeightId};

/// Flat, index-addressed form of a validated graph.
///
/// Built once per compile and mutated in place while training. Neuron and
/// edge indices are dense; `neuron_ids` / `weight_ids` map them back to the
/// graph handles they came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionModel {
    pub values: Vec<f64>,
    pub gradients: Vec<f64>,
    pub activations: Vec<ActivationKind>,

    pub weights: Vec<f64>,
    pub weight_gradients: Vec<f64>,

    /// Edge indices entering each neuron.
    pub incoming: Vec<Vec<usize>>,
    /// Edge indices leaving each neuron.
    pub outgoing: Vec<Vec<usize>>,
    /// Source neuron of each edge.
    pub edge_sources: Vec<usize>,

    pub neuron_ids: Vec<NeuronId>,
    pub weight_ids: Vec<WeightId>,

    pub inputs: Vec<usize>,
    pub outputs: Vec<usize>,
    pub biases: Vec<usize>,
    /// Topological order over neuron indices.
    pub order: Vec<usize>,
}

impl ExecutionModel {
    pub fn neuron_count(&self) -> usize {
        self.values.len()
    }

    pub fn weight_count(&self) -> usize {
        self.weights.len()
    }

    pub fn input_count(&self) -> usize {
        self.inputs.len()
    }

    pub fn output_count(&self) -> usize {
        self.outputs.len()
    }

    pub fn neuron_index(&self, id: NeuronId) -> Option<usize> {
        self.neuron_ids.iter().position(|n| *n == id)
    }

    pub fn weight_index(&self, id: WeightId) -> Option<usize> {
        self.weight_ids.iter().position(|w| *w == id)
    }

    /// Clears every accumulated weight and neuron gradient.
    pub fn zero_gradients(&mut self) {
        self.gradients.iter_mut().for_each(|g| *g = 0.0);
        self.weight_gradients.iter_mut().for_each(|g| *g = 0.0);
    }
}
