use std::collections::HashMap;

use tracing::{debug, warn};

use crate::compile::execution_model::ExecutionModel;
use crate::errors::GraphError;
use crate::graph::{Graph, NeuronId};

/// Validates `graph` and flattens it into an [`ExecutionModel`].
///
/// Neurons are indexed in arena order. Edges whose endpoints no longer
/// resolve are skipped; validation makes that unreachable in practice.
pub fn compile(graph: &Graph) -> Result<ExecutionModel, GraphError> {
    graph.validate()?;
    let topo = graph.topological_order()?;

    let neuron_count = graph.neuron_count();
    let mut index_of: HashMap<NeuronId, usize> = HashMap::with_capacity(neuron_count);
    let mut neuron_ids = Vec::with_capacity(neuron_count);
    let mut values = Vec::with_capacity(neuron_count);
    let mut activations = Vec::with_capacity(neuron_count);

    for (id, neuron) in graph.neurons() {
        index_of.insert(id, neuron_ids.len());
        neuron_ids.push(id);
        values.push(neuron.value);
        activations.push(neuron.activation);
    }

    let mut incoming = vec![Vec::new(); neuron_count];
    let mut outgoing = vec![Vec::new(); neuron_count];
    let mut edge_sources = Vec::with_capacity(graph.weight_count());
    let mut weight_ids = Vec::with_capacity(graph.weight_count());
    let mut weights = Vec::with_capacity(graph.weight_count());

    for (id, edge) in graph.weights() {
        let (Some(&source), Some(&target)) = (index_of.get(&edge.source()), index_of.get(&edge.target())) else {
            warn!(edge = %id, "skipping edge with unresolved endpoint");
            continue;
        };
        let e = weight_ids.len();
        weight_ids.push(id);
        weights.push(edge.value);
        edge_sources.push(source);
        incoming[target].push(e);
        outgoing[source].push(e);
    }

    let map = |ids: &[NeuronId]| -> Vec<usize> { ids.iter().filter_map(|id| index_of.get(id).copied()).collect() };
    let inputs = map(graph.inputs());
    let outputs = map(graph.outputs());
    let biases = map(graph.biases());
    let order = map(topo.as_slice());

    for &b in &biases {
        values[b] = 1.0;
    }

    debug!(neurons = neuron_count, edges = weights.len(), "compiled graph");

    Ok(ExecutionModel {
        gradients: vec![0.0; neuron_count],
        values,
        activations,
        weight_gradients: vec![0.0; weights.len()],
        weights,
        incoming,
        outgoing,
        edge_sources,
        neuron_ids,
        weight_ids,
        inputs,
        outputs,
        biases,
        order,
    })
}
